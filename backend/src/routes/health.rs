use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::core;

pub async fn health_check(State(context): State<core::ArcContext>) -> Result<impl IntoResponse, axum::response::Response> {
    sqlx::query("SELECT 1").execute(&context.db).await.map_err(|e| {
        tracing::error!("Health check failed to reach the database: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    })?;

    Ok((StatusCode::OK, "OK").into_response())
}
