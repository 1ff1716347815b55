use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
    }))
}

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: &'static str,
    pub status: &'static str,
}

/// GET /api/hello/
pub async fn hello_handler() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from the portfolio API!",
        status: "success",
    })
}
