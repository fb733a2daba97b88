mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/medications/add", post(handlers::add_medication))
        .route("/api/medications/:id", get(handlers::list_medications))
        .route("/api/medications/:id/take", post(handlers::take_medication))
        .route(
            "/api/medications/:id/deactivate",
            post(handlers::deactivate_medication),
        )
        .route("/api/medications/:id/adherence", get(handlers::adherence))
}
