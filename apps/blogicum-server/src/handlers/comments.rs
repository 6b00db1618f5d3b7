//! Comment handlers. Every route is nested under the post the comment
//! belongs to.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use blogicum_core::DomainError;
use blogicum_core::domain::{Comment, CommentDetails, User};
use blogicum_shared::dto::{CommentFormView, CommentView};
use blogicum_shared::forms::{self, CommentForm};

use super::guard::author_only;
use super::{current_user, parse_form, post_url, redirect};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /posts/{id}/comment/
///
/// The comment is bound to the requester and the post in the URL; any
/// author or post field in the body is ignored.
pub async fn create(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let details = state
        .posts
        .find_details(post_id)
        .await?
        .filter(|details| details.is_visible_to(Some(identity.user_id), Utc::now()))
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    let form: CommentForm = parse_form(body)?;
    forms::check(&form).map_err(AppError::InvalidForm)?;

    let author = current_user(&state, &identity).await?;
    let comment = state
        .comments
        .create(form.into_comment(details.post.id, author.id))
        .await?;
    tracing::info!(comment = %comment.label(), post_id = %post_id, "Comment added");

    Ok(redirect(&post_url(post_id)))
}

/// GET /posts/{id}/comments/{comment_id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = load_comment(&state, post_id, comment_id).await?;
    let identity = match author_only(&comment, identity, post_id) {
        Ok(identity) => identity,
        Err(redirect) => return Ok(redirect),
    };

    let author = current_user(&state, &identity).await?;
    Ok(HttpResponse::Ok().json(form_view(comment, author)))
}

/// POST /posts/{id}/comments/{comment_id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: OptionalIdentity,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut comment = load_comment(&state, post_id, comment_id).await?;
    if let Err(redirect) = author_only(&comment, identity, post_id) {
        return Ok(redirect);
    }

    let form: CommentForm = parse_form(body)?;
    forms::check(&form).map_err(AppError::InvalidForm)?;

    comment.text = form.text.trim().to_string();
    let comment = state.comments.update(comment).await?;
    tracing::info!(comment = %comment.label(), "Comment updated");

    Ok(redirect(&post_url(post_id)))
}

/// GET /posts/{id}/comments/{comment_id}/delete/
pub async fn delete_form(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    edit_form(state, path, identity).await
}

/// POST /posts/{id}/comments/{comment_id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = load_comment(&state, post_id, comment_id).await?;
    if let Err(redirect) = author_only(&comment, identity, post_id) {
        return Ok(redirect);
    }

    state.comments.delete(comment.id).await?;
    tracing::info!(comment = %comment.label(), "Comment deleted");

    Ok(redirect(&post_url(post_id)))
}

/// The comment, provided it belongs to `post_id`.
async fn load_comment(state: &AppState, post_id: Uuid, comment_id: Uuid) -> AppResult<Comment> {
    state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|comment| comment.post_id == post_id)
        .ok_or_else(|| DomainError::not_found("Comment", comment_id).into())
}

fn form_view(comment: Comment, author: User) -> CommentFormView {
    let form = CommentForm::from_comment(&comment);
    CommentFormView {
        comment: CommentView::from(CommentDetails { comment, author }),
        form,
    }
}
