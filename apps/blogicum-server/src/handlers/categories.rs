//! Category page.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::DomainError;
use blogicum_core::ports::PostFilter;
use blogicum_shared::dto::{CategoryPostsView, CategoryView, PageQuery, PageView};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /category/{slug}/
///
/// Unpublished categories are 404, as if they did not exist.
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .filter(|category| category.is_published)
        .ok_or_else(|| DomainError::not_found("Category", &slug))?;

    tracing::debug!(category = %category.label(), page = query.page, "Listing category");

    let page = state
        .posts
        .list_published(
            Utc::now(),
            PostFilter::category(category.id),
            state.page(query.page),
        )
        .await?;

    Ok(HttpResponse::Ok().json(CategoryPostsView {
        category: CategoryView::from(&category),
        posts: PageView::from_page(page),
    }))
}
