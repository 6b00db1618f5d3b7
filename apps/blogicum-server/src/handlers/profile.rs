//! Profile page and profile editing.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::Value;

use blogicum_core::DomainError;
use blogicum_core::domain::User;
use blogicum_core::ports::PostFilter;
use blogicum_shared::dto::{PageQuery, PageView, ProfileFormView, ProfilePostsView, ProfileView};
use blogicum_shared::forms::{self, FieldErrors, UserUpdateForm};

use super::{current_user, parse_form, profile_url, redirect};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /profile/{username}/
///
/// The owner sees every post they wrote; other visitors only the publicly
/// visible ones.
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", &username))?;

    let page = state.page(query.page);
    let posts = if identity.user_id() == Some(user.id) {
        state.posts.list_by_author(user.id, page).await?
    } else {
        state
            .posts
            .list_published(Utc::now(), PostFilter::author(user.id), page)
            .await?
    };

    Ok(HttpResponse::Ok().json(ProfilePostsView {
        profile: ProfileView::from(&user),
        posts: PageView::from_page(posts),
    }))
}

/// GET /profile/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;

    Ok(HttpResponse::Ok().json(ProfileFormView {
        form: UserUpdateForm::from_user(&user),
    }))
}

/// POST /profile/edit/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let mut user = current_user(&state, &identity).await?;
    let form: UserUpdateForm = parse_form(body)?;

    let mut errors = forms::check(&form).err().unwrap_or_default();
    forms::merge(&mut errors, taken_fields(&state, &form, &user).await?);
    if !errors.is_empty() {
        return Err(AppError::InvalidForm(errors));
    }

    form.apply_to(&mut user);
    let user = state.users.update(user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "Profile updated");

    Ok(redirect(&profile_url(&user.username)))
}

/// Username and email must stay unique among the other users.
async fn taken_fields(
    state: &AppState,
    form: &UserUpdateForm,
    user: &User,
) -> AppResult<FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Some(other) = state.users.find_by_username(&form.username).await? {
        if other.id != user.id {
            forms::merge(
                &mut errors,
                forms::field_error("username", "A user with that username already exists."),
            );
        }
    }
    if let Some(other) = state.users.find_by_email(&form.email).await? {
        if other.id != user.id {
            forms::merge(
                &mut errors,
                forms::field_error("email", "A user with that email already exists."),
            );
        }
    }

    Ok(errors)
}
