use axum::{http::StatusCode, response::IntoResponse, routing::get, Extension, Json, Router};
use serde::Serialize;
use tracing::{event, Level};

use crate::shared_state::State;

#[derive(Serialize)]
struct HealthResponse {
    /// If the database connection is ok
    database: bool,
    /// If all the other fields indicate healthy status.
    healthy: bool,
}

async fn health(Extension(ref state): Extension<State>) -> impl IntoResponse {
    let db_result = state.store.ping().await;
    if let Err(e) = &db_result {
        event!(Level::ERROR, error = %e, "Health check failed to reach the database");
    }

    (
        StatusCode::OK,
        Json(HealthResponse {
            healthy: db_result.is_ok(),
            database: db_result.is_ok(),
        }),
    )
}

pub fn configure() -> Router {
    Router::new().route("/health", get(health))
}
