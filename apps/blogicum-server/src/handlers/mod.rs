//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod guard;
mod health;
mod posts;
mod profile;

use actix_web::{HttpResponse, error::JsonPayloadError, http::header, web};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use blogicum_core::domain::User;
use blogicum_shared::{ErrorResponse, forms};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult, extractor_error};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| {
        // Cross-site HTML forms cannot send JSON.
        let body = match &err {
            JsonPayloadError::ContentType => ErrorResponse::forbidden()
                .with_detail("CSRF verification failed: forms must be submitted as JSON."),
            other => ErrorResponse::bad_request(other.to_string()),
        };
        extractor_error(err, req, body)
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        let body = ErrorResponse::not_found(format!("No route matches {}", req.path()));
        extractor_error(err, req, body)
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, req| {
        extractor_error(err, req, ErrorResponse::not_found("Page not found"))
    }))
    .route("/", web::get().to(posts::index))
    .route("/health", web::get().to(health::health_check))
    .route("/category/{slug}/", web::get().to(categories::category_posts))
    // `/profile/edit/` must win over `/profile/{username}/`
    .service(
        web::resource("/profile/edit/")
            .route(web::get().to(profile::edit_form))
            .route(web::post().to(profile::edit)),
    )
    .route("/profile/{username}/", web::get().to(profile::profile))
    .service(
        web::scope("/posts")
            .service(
                web::resource("/create/")
                    .route(web::get().to(posts::create_form))
                    .route(web::post().to(posts::create)),
            )
            .route("/{id}/", web::get().to(posts::detail))
            .service(
                web::resource("/{id}/edit/")
                    .route(web::get().to(posts::edit_form))
                    .route(web::post().to(posts::edit)),
            )
            .service(
                web::resource("/{id}/delete/")
                    .route(web::get().to(posts::delete_form))
                    .route(web::post().to(posts::delete)),
            )
            .route("/{id}/comment/", web::post().to(comments::create))
            .service(
                web::resource("/{id}/comments/{comment_id}/edit/")
                    .route(web::get().to(comments::edit_form))
                    .route(web::post().to(comments::edit)),
            )
            .service(
                web::resource("/{id}/comments/{comment_id}/delete/")
                    .route(web::get().to(comments::delete_form))
                    .route(web::post().to(comments::delete)),
            ),
    )
    .service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/me", web::get().to(auth::me)),
    );
}

/// `302 Found` to `location`.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn post_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

/// Deserialize a submitted body into a form. Fields of the wrong type are
/// reported as form errors, the same as failed validation.
pub(crate) fn parse_form<F: DeserializeOwned>(body: web::Json<Value>) -> AppResult<F> {
    forms::parse(body.into_inner()).map_err(AppError::InvalidForm)
}

/// The stored user behind `identity`; a token for a deleted user is rejected.
pub(crate) async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))
}
