mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/symptoms/log", post(handlers::log_symptom))
        .route("/api/symptoms/:id", get(handlers::list_symptoms))
        .route("/api/symptoms/:id/analysis", get(handlers::analyze_symptoms))
}
