/// Health check endpoint
///
/// ```text
/// GET /health
///
/// {"status": "healthy", "version": "0.1.0", "database": "connected"}
/// ```
///
/// A failing database degrades the status instead of failing the request.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use meetuj_shared::db::pool;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let (status, database) = match pool::health_check(&state.db).await {
        Ok(()) => ("healthy", "connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            ("degraded", "disconnected")
        }
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: meetuj_shared::VERSION.to_string(),
        database: database.to_string(),
    }))
}
