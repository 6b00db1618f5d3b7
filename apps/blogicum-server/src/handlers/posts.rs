//! Post handlers: home page, detail page and the create/edit/delete flows.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use blogicum_core::DomainError;
use blogicum_core::domain::PostDetails;
use blogicum_core::ports::PostFilter;
use blogicum_shared::dto::{
    CategoryView, CommentView, LocationView, PageQuery, PageView, PostDeleteView, PostDetailView,
    PostFormView, PostListView, PostView,
};
use blogicum_shared::forms::{self, CommentForm, PostForm};

use super::guard::author_only;
use super::{current_user, parse_form, profile_url, redirect};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list_published(Utc::now(), PostFilter::default(), state.page(query.page))
        .await?;

    Ok(HttpResponse::Ok().json(PostListView {
        posts: PageView::from_page(page),
    }))
}

/// GET /posts/{id}/
///
/// Authors see their own drafts; everyone else gets 404 for a post that is
/// not publicly visible.
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let details = load_details(&state, id).await?;

    if !details.is_visible_to(identity.user_id(), Utc::now()) {
        return Err(DomainError::not_found("Post", id).into());
    }

    let comments = state.comments.list_for_post(id).await?;

    Ok(HttpResponse::Ok().json(PostDetailView {
        post: details.into(),
        comments: comments.into_iter().map(CommentView::from).collect(),
        form: CommentForm::default(),
    }))
}

/// GET /posts/create/
pub async fn create_form(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let form = PostForm {
        pub_date: Some(Utc::now()),
        is_published: true,
        ..PostForm::default()
    };

    Ok(HttpResponse::Ok().json(form_view(&state, form).await?))
}

/// POST /posts/create/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let author = current_user(&state, &identity).await?;
    let form: PostForm = parse_form(body)?;
    validate(&state, &form).await?;

    let post = state.posts.create(form.into_post(author.id)).await?;
    tracing::info!(post = %post.label(), author = %author.username, "Post created");

    Ok(redirect(&profile_url(&author.username)))
}

/// GET /posts/{id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let details = load_details(&state, path.into_inner()).await?;
    if let Err(redirect) = author_only(&details.post, identity, details.post.id) {
        return Ok(redirect);
    }

    let form = PostForm::from_post(&details.post);
    Ok(HttpResponse::Ok().json(form_view(&state, form).await?))
}

/// POST /posts/{id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let details = load_details(&state, path.into_inner()).await?;
    let identity = match author_only(&details.post, identity, details.post.id) {
        Ok(identity) => identity,
        Err(redirect) => return Ok(redirect),
    };

    let form: PostForm = parse_form(body)?;
    validate(&state, &form).await?;

    let mut post = details.post;
    form.apply_to(&mut post);
    let post = state.posts.update(post).await?;
    tracing::info!(post = %post.label(), "Post updated");

    let author = current_user(&state, &identity).await?;
    Ok(redirect(&profile_url(&author.username)))
}

/// GET /posts/{id}/delete/
pub async fn delete_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let details = load_details(&state, path.into_inner()).await?;
    if let Err(redirect) = author_only(&details.post, identity, details.post.id) {
        return Ok(redirect);
    }

    let form = PostForm::from_post(&details.post);
    Ok(HttpResponse::Ok().json(PostDeleteView {
        post: PostView::from(details),
        form,
    }))
}

/// POST /posts/{id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let details = load_details(&state, path.into_inner()).await?;
    let identity = match author_only(&details.post, identity, details.post.id) {
        Ok(identity) => identity,
        Err(redirect) => return Ok(redirect),
    };

    state.posts.delete(details.post.id).await?;
    tracing::info!(post = %details.post.label(), "Post deleted");

    let author = current_user(&state, &identity).await?;
    Ok(redirect(&profile_url(&author.username)))
}

async fn load_details(state: &AppState, id: Uuid) -> AppResult<PostDetails> {
    state
        .posts
        .find_details(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", id).into())
}

async fn form_view(state: &AppState, form: PostForm) -> AppResult<PostFormView> {
    let categories = state.categories.list_all().await?;
    let locations = state.locations.list_all().await?;

    Ok(PostFormView {
        form,
        categories: categories.iter().map(CategoryView::from).collect(),
        locations: locations.iter().map(LocationView::from).collect(),
    })
}

/// Field rules plus the references that need a lookup.
async fn validate(state: &AppState, form: &PostForm) -> AppResult<()> {
    let mut errors = forms::check(form).err().unwrap_or_default();

    if let Some(id) = form.category_id {
        if state.categories.find_by_id(id).await?.is_none() {
            forms::merge(&mut errors, forms::field_error("category_id", INVALID_CHOICE));
        }
    }
    if let Some(id) = form.location_id {
        if state.locations.find_by_id(id).await?.is_none() {
            forms::merge(&mut errors, forms::field_error("location_id", INVALID_CHOICE));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidForm(errors))
    }
}
