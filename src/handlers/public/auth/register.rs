// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::database::models::{UserSummary, WorkspaceSummary};
use crate::error::ApiError;
use crate::services::RegisterRequest;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserSummary,
    pub workspace: WorkspaceSummary,
}

/// POST /api/auth/register - Register new user account
///
/// Creates the user with their welcome credits and a default workspace they
/// own, all in one transaction.
///
/// Expected Input:
/// ```json
/// {
///   "name": "string",       // Required: non-empty
///   "email": "string",      // Required: valid address, unique
///   "password": "string"    // Required: at least 8 characters
/// }
/// ```
///
/// Expected Output (201):
/// ```json
/// {
///   "message": "User registered successfully",
///   "user": { "id": "uuid", "name": "Ada", "email": "ada@example.com" },
///   "workspace": { "id": "uuid", "name": "Ada's Workspace" }
/// }
/// ```
///
/// Errors: 400 validation or duplicate email, 403 registration disabled,
/// 500 anything else (details only in server logs).
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected registration payload: {}", rejection);
        ApiError::invalid_json("Request body must be a JSON object with name, email and password")
    })?;

    let account = state.registration.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user: account.user,
            workspace: account.workspace,
        }),
    ))
}
