// handlers/protected/mod.rs - Session-gated handlers
//
// Every handler here takes `CurrentSession`, which rejects with 401 before
// the handler body runs when the caller is not signed in.
pub mod credits;    // GET /api/credits/transactions
pub mod dashboard;  // GET /api/dashboard/overview
pub mod workspaces; // GET /api/workspaces

pub use credits::credit_transactions;
pub use dashboard::overview;
pub use workspaces::list_workspaces;

use crate::database::models::UserRecord;
use crate::error::ApiError;
use crate::middleware::CurrentSession;
use crate::state::AppState;

/// Reload the session's user; a token for a deleted account is treated as signed out
async fn load_user(state: &AppState, session: &CurrentSession) -> Result<UserRecord, ApiError> {
    state
        .store
        .find_user_by_id(session.0.user.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}
