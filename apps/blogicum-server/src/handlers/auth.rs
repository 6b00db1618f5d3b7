//! Registration, login and the current account.

use actix_web::{HttpResponse, web};
use serde_json::Value;

use blogicum_core::domain::User;
use blogicum_shared::dto::{AuthResponse, UserResponse};
use blogicum_shared::forms::{self, LoginRequest, RegisterUserRequest};

use super::{current_user, parse_form};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let req: RegisterUserRequest = parse_form(body)?;
    forms::check(&req).map_err(AppError::InvalidForm)?;

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user =
        User::new(req.username, req.email, password_hash).with_name(req.first_name, req.last_name);
    let user = state.users.create(user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(token_response(&state, &user)?))
}

/// POST /auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or_else(invalid)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(username = %req.username, "Rejected login");
        return Err(invalid());
    }

    Ok(HttpResponse::Ok().json(token_response(&state, &user)?))
}

/// GET /auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id.to_string(),
        username: user.username,
        email: user.email,
        created_at: user.created_at.to_rfc3339(),
    }))
}

fn token_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access_token = state
        .tokens
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    })
}
