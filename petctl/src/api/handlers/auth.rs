use axum::{Json, extract::State};
use tracing::info;

use crate::{
    AppState,
    api::{
        json::ApiJson,
        models::{
            auth::{LoginRequest, RegisterRequest, TokenResponse},
            users::{CurrentUser, UserResponse},
        },
    },
    auth::{
        current_user::INVALID_TOKEN,
        password::{self, Argon2Params},
    },
    db::{errors::DbError, models::users::UserCreateDBRequest},
    errors::Error,
    types::abbrev_uuid,
};

fn user_exists() -> Error {
    Error::Conflict {
        message: "User already exists".to_string(),
    }
}

/// Register a new user and return a session token for it
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    tag = "auth",
    responses(
        (status = 200, description = "User registered, token issued", body = TokenResponse),
        (status = 400, description = "Invalid input or user already exists"),
        (status = 500, description = "Server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, ApiJson(request): ApiJson<RegisterRequest>) -> Result<Json<TokenResponse>, Error> {
    let password_config = &state.config.auth.password;
    request.validate(password_config)?;

    if state.users.get_user_by_email(&request.email).await?.is_some() {
        return Err(user_exists());
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password_hash = password::hash_password(request.password, Argon2Params::from(password_config)).await?;

    let create_request = UserCreateDBRequest {
        name: request.name,
        email: request.email,
        password_hash,
    };
    // A concurrent registration can win between the lookup and the insert
    let user = match state.users.create(&create_request).await {
        Ok(user) => user,
        Err(DbError::UniqueViolation { .. }) => return Err(user_exists()),
        Err(e) => return Err(e.into()),
    };

    info!("Registered user {}", abbrev_uuid(&user.id));
    let token = state.tokens.issue(user.id)?;
    Ok(Json(TokenResponse { token }))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid input or invalid email or password"),
        (status = 500, description = "Server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> Result<Json<TokenResponse>, Error> {
    request.validate()?;

    // Unknown email and wrong password must be indistinguishable to the caller
    let user = state
        .users
        .get_user_by_email(&request.email)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let is_valid = password::verify_password(request.password, user.password_hash).await?;
    if !is_valid {
        return Err(Error::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id)?;
    Ok(Json(TokenResponse { token }))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/auth",
    tag = "auth",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("SessionToken" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_current_user(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>, Error> {
    // A validly signed token for an identity the store no longer has is treated as invalid
    let user = state
        .users
        .get_by_id(current_user.id)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some(INVALID_TOKEN.to_string()),
        })?;

    Ok(Json(UserResponse::from(user)))
}
