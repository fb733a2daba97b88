mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/daily-score", post(handlers::log_daily_score))
        .route("/api/daily-scores/:id", get(handlers::list_daily_scores))
}
