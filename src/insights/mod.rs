pub mod dto;
pub mod handlers;
pub mod summary;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/insights/:id", get(handlers::get_insights))
        .route("/api/report/:id", get(handlers::get_report))
}
