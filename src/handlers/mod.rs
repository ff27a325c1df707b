// handlers/mod.rs - Two-tier handler layout
//
// Public (no session required) → Protected (session required via CurrentSession)
pub mod public;    // Tier 1: sign-up, sign-in, session inspection (/api/auth/*)
pub mod protected; // Tier 2: dashboard, credits, workspaces (/api/*)

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service identity
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": ["/api/auth/register", "/api/auth/login", "/api/auth/logout", "/api/auth/session"],
            "protected": ["/api/dashboard/overview", "/api/credits/transactions", "/api/workspaces"],
        }
    }))
}

/// GET /health - Store connectivity check
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok", "database": "ok"}))),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "degraded", "database": "unavailable"})),
            )
        }
    }
}
