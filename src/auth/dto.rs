use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub telegram_id: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned after signup or login. No token layer: the route layer passes the
/// user id explicitly on each request.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}
