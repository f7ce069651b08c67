use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{event, Level};

pub fn handle_panic(production: bool, err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    event!(Level::ERROR, %details, "Request handler panicked");

    let body = if production {
        json!({ "error": "Server error", "kind": "panic" })
    } else {
        json!({ "error": details, "kind": "panic" })
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
