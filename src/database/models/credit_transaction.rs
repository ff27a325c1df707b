use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "credit_transaction_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditTransactionType {
    Reward,
    Purchase,
    Usage,
    Refund,
}

/// One immutable row of a user's credit ledger. `balance_after` is the
/// user's balance once `amount` has been applied.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub transaction_type: CreditTransactionType,
    pub description: String,
    pub balance_after: i32,
    pub created_at: DateTime<Utc>,
}
