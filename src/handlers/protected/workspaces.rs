// handlers/protected/workspaces.rs - GET /api/workspaces handler

use axum::extract::State;

use crate::database::models::WorkspaceMembership;
use crate::middleware::{ApiResult, ApiResponse, CurrentSession};
use crate::state::AppState;

/// GET /api/workspaces - Workspaces the caller belongs to, with their role
pub async fn list_workspaces(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Vec<WorkspaceMembership>> {
    let workspaces = state.store.list_workspaces(session.user.id).await?;
    Ok(ApiResponse::success(workspaces))
}
