use axum::{extract::State, Json};
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::records::NewUser;

use super::dto::{AuthResponse, LoginRequest, SignupRequest};
use super::services::{hash_password, is_valid_email, verify_password};

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::bad_request("Invalid email"));
    }
    if payload.name.trim().len() < 2 {
        return Err(ApiError::bad_request("Name too short"));
    }
    if payload.password.len() < 6 {
        warn!("password too short");
        return Err(ApiError::bad_request("Password too short"));
    }

    if state.store.user_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("Email already registered"));
    }

    let hash = hash_password(&payload.password).map_err(crate::error::StoreError::Other)?;
    let user = state
        .store
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email: Some(payload.email.clone()),
            password_hash: Some(hash),
            telegram_id: payload.telegram_id,
        })
        .await?;

    info!(user_id = %user.id, email = %payload.email, "user registered");
    Ok(Json(AuthResponse {
        message: "User registered successfully".into(),
        user_id: user.id,
        name: user.name,
        email: payload.email,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let Some(user) = state.store.user_by_email(&payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let Some(hash) = user.password_hash.as_deref() else {
        warn!(user_id = %user.id, "login against passwordless account");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let ok = verify_password(&payload.password, hash).map_err(crate::error::StoreError::Other)?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    info!(user_id = %user.id, email = %payload.email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        user_id: user.id,
        name: user.name,
        email: payload.email,
    }))
}
