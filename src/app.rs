use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::StoreKind;
use crate::state::AppState;
use crate::{auth, chat, insights, meals, medications, scores, symptoms};

pub fn build_app(state: AppState) -> Router {
    let database = match state.config.store_kind {
        StoreKind::Local => "local",
        StoreKind::Remote => "remote",
    };

    Router::new()
        .merge(auth::router())
        .merge(meals::router())
        .merge(symptoms::router())
        .merge(medications::router())
        .merge(scores::router())
        .merge(insights::router())
        .merge(chat::router())
        .route(
            "/health-check",
            get(move || async move {
                Json(json!({
                    "status": "healthy",
                    "timestamp": OffsetDateTime::now_utc()
                        .format(&Rfc3339)
                        .unwrap_or_default(),
                    "database": database,
                }))
            }),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8000".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
