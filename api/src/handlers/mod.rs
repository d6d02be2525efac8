pub mod auth;
pub mod notes;

use serde_json::json;

use crate::{error::AppError, response::ApiResponse};

pub async fn index() -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(
        "Welcome to Secure Notes API",
        json!({ "version": env!("CARGO_PKG_VERSION") }),
    )
}

pub async fn health() -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(
        "Secure Notes API is running",
        json!({ "timestamp": chrono::Utc::now().to_rfc3339() }),
    )
}

pub async fn fallback() -> AppError {
    AppError::RouteNotFound
}
