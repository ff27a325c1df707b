use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::{
    CreditTransaction, CreditTransactionType, UserRecord, Workspace, WorkspaceMembership, WorkspaceRole,
};

/// Errors surfaced by an [`AccountStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Workspace slug already taken: {0}")]
    DuplicateSlug(String),

    #[error("Rejected write: {0}")]
    InvalidCommand(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Everything a registration writes, applied as one unit.
///
/// A store either persists the user, the welcome ledger entry, the workspace
/// and the owner membership together, or none of them.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub starting_credits: i32,
    pub credit_transaction_id: Uuid,
    pub credit_description: String,
    pub workspace_id: Uuid,
    pub workspace_name: String,
    pub workspace_slug: String,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    pub const WELCOME_CREDIT_TYPE: CreditTransactionType = CreditTransactionType::Reward;
    pub const OWNER_ROLE: WorkspaceRole = WorkspaceRole::Owner;

    /// Checks the row-level invariants shared by every store implementation
    pub fn check(&self) -> Result<(), StoreError> {
        if self.starting_credits < 0 {
            return Err(StoreError::InvalidCommand(format!(
                "starting credits must not be negative, got {}",
                self.starting_credits
            )));
        }
        if self.email.is_empty() || self.email != self.email.to_lowercase() {
            return Err(StoreError::InvalidCommand("email must be normalized".to_string()));
        }
        if self.workspace_slug.is_empty() {
            return Err(StoreError::InvalidCommand("workspace slug is empty".to_string()));
        }
        Ok(())
    }

    /// The user row this command creates
    pub fn user_record(&self) -> UserRecord {
        UserRecord {
            id: self.user_id,
            name: self.name.clone(),
            email: self.email.clone(),
            password_hash: self.password_hash.clone(),
            credits: self.starting_credits,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }

    /// The welcome grant: amount and resulting balance both equal the starting credits
    pub fn welcome_transaction(&self) -> CreditTransaction {
        CreditTransaction {
            id: self.credit_transaction_id,
            user_id: self.user_id,
            amount: self.starting_credits,
            transaction_type: Self::WELCOME_CREDIT_TYPE,
            description: self.credit_description.clone(),
            balance_after: self.starting_credits,
            created_at: self.created_at,
        }
    }

    pub fn workspace(&self) -> Workspace {
        Workspace {
            id: self.workspace_id,
            name: self.workspace_name.clone(),
            slug: self.workspace_slug.clone(),
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Rows produced by a successful [`AccountStore::create_account`]
#[derive(Debug, Clone)]
pub struct CreatedAccount {
    pub user: UserRecord,
    pub credit_transaction: CreditTransaction,
    pub workspace: Workspace,
}

/// Persistence for users, their credit ledger and their workspaces
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up a user by normalized (lower-cased) email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Apply a registration atomically. Uniqueness conflicts surface as
    /// [`StoreError::DuplicateEmail`] or [`StoreError::DuplicateSlug`].
    async fn create_account(&self, account: NewAccount) -> Result<CreatedAccount, StoreError>;

    /// Ledger entries for a user, newest first
    async fn list_credit_transactions(&self, user_id: Uuid) -> Result<Vec<CreditTransaction>, StoreError>;

    async fn list_workspaces(&self, user_id: Uuid) -> Result<Vec<WorkspaceMembership>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
