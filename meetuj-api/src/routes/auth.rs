/// Authentication endpoints
///
/// - `POST /v1/auth/register` - create an account
/// - `POST /v1/auth/login` - exchange email and password for a bearer token

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Json};
use meetuj_shared::models::account::AccountSummary;
use meetuj_shared::services::accounts::{self, IssuedToken};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {"email": "user@example.com", "password": "correct horse"}
/// ```
///
/// # Response
///
/// `201 Created` with the public account projection.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: malformed email or short password
/// - `409 Conflict`: email already registered (case-insensitive)
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AccountSummary>)> {
    // Surrounding whitespace is not part of the address
    let req = RegisterRequest {
        email: req.email.trim().to_string(),
        ..req
    };
    req.validate()?;

    let account = accounts::register(&state.db, &state.credentials, &req.email, &req.password).await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Log in
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {"email": "user@example.com", "password": "correct horse"}
/// ```
///
/// # Response
///
/// ```json
/// {"access_token": "eyJ...", "token_type": "bearer", "expires_in": 1800}
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password, indistinguishable
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<IssuedToken>> {
    let req = LoginRequest {
        email: req.email.trim().to_string(),
        ..req
    };
    req.validate()?;

    let token = accounts::login(&state.db, &state.credentials, &req.email, &req.password).await?;

    Ok(Json(token))
}
