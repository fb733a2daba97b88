mod dto;
pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/meals/log", post(handlers::log_meal))
        .route("/api/meals/:id", get(handlers::list_meals))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB photo uploads
}
