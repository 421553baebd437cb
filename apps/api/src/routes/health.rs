use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::error;

use crate::state::AppState;

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "LMS Backend API is running!" }))
}

/// GET /api-health
pub async fn api_health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "API is healthy and running."
    }))
}

/// GET /db-health
/// Runs `SELECT 1` against the pool; reports status without failing the request.
pub async fn db_health_handler(State(state): State<AppState>) -> Json<Value> {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => Json(json!({
            "status": "ok",
            "message": "Database connection successful."
        })),
        Err(e) => {
            error!("Database health check failed: {e}");
            Json(json!({
                "status": "error",
                "message": "Database connection failed."
            }))
        }
    }
}
