// handlers/protected/credits.rs - GET /api/credits/transactions handler

use axum::extract::State;
use serde::Serialize;

use crate::database::models::CreditTransaction;
use crate::middleware::{ApiResult, ApiResponse, CurrentSession};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    pub balance: i32,
    pub transactions: Vec<CreditTransaction>,
}

/// GET /api/credits/transactions - Current balance and ledger, newest first
pub async fn credit_transactions(
    State(state): State<AppState>,
    session: CurrentSession,
) -> ApiResult<CreditsResponse> {
    let user = super::load_user(&state, &session).await?;
    let transactions = state.store.list_credit_transactions(user.id).await?;

    Ok(ApiResponse::success(CreditsResponse {
        balance: user.credits,
        transactions,
    }))
}
