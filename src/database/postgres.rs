use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{CreditTransaction, UserRecord, Workspace, WorkspaceMembership};
use super::store::{AccountStore, CreatedAccount, NewAccount, StoreError};

const USERS_EMAIL_KEY: &str = "users_email_key";
const WORKSPACES_SLUG_KEY: &str = "workspaces_slug_key";

/// Postgres-backed [`AccountStore`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate driver errors into store errors, recognising the uniqueness
/// constraints that registration relies on.
fn map_sqlx(err: sqlx::Error, slug: Option<&str>) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => match db_err.constraint() {
            Some(USERS_EMAIL_KEY) => StoreError::DuplicateEmail,
            Some(WORKSPACES_SLUG_KEY) => StoreError::DuplicateSlug(slug.unwrap_or_default().to_string()),
            _ => StoreError::Sqlx(err),
        },
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, credits, created_at, updated_at
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx(e, None))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, credits, created_at, updated_at
             FROM users
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx(e, None))
    }

    async fn create_account(&self, account: NewAccount) -> Result<CreatedAccount, StoreError> {
        account.check()?;
        let slug = account.workspace_slug.as_str();

        // Dropping the transaction without commit rolls every insert back
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx(e, None))?;

        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, name, email, password_hash, credits, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, name, email, password_hash, credits, created_at, updated_at
            "#,
        )
        .bind(account.user_id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.starting_credits)
        .bind(account.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx(e, Some(slug)))?;

        let credit_transaction = sqlx::query_as::<_, CreditTransaction>(
            r#"
            INSERT INTO credit_transactions (id, user_id, amount, type, description, balance_after, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, amount, type, description, balance_after, created_at
            "#,
        )
        .bind(account.credit_transaction_id)
        .bind(user.id)
        .bind(account.starting_credits)
        .bind(NewAccount::WELCOME_CREDIT_TYPE)
        .bind(&account.credit_description)
        .bind(account.starting_credits)
        .bind(account.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx(e, Some(slug)))?;

        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (id, name, slug, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, name, slug, created_at, updated_at
            "#,
        )
        .bind(account.workspace_id)
        .bind(&account.workspace_name)
        .bind(slug)
        .bind(account.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx(e, Some(slug)))?;

        sqlx::query(
            "INSERT INTO workspace_members (workspace_id, user_id, role, created_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(workspace.id)
        .bind(user.id)
        .bind(NewAccount::OWNER_ROLE)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx(e, Some(slug)))?;

        tx.commit().await.map_err(|e| map_sqlx(e, Some(slug)))?;

        Ok(CreatedAccount {
            user,
            credit_transaction,
            workspace,
        })
    }

    async fn list_credit_transactions(&self, user_id: Uuid) -> Result<Vec<CreditTransaction>, StoreError> {
        sqlx::query_as::<_, CreditTransaction>(
            "SELECT id, user_id, amount, type, description, balance_after, created_at
             FROM credit_transactions
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx(e, None))
    }

    async fn list_workspaces(&self, user_id: Uuid) -> Result<Vec<WorkspaceMembership>, StoreError> {
        sqlx::query_as::<_, WorkspaceMembership>(
            "SELECT w.id, w.name, w.slug, m.role, w.created_at
             FROM workspace_members m
             JOIN workspaces w ON w.id = m.workspace_id
             WHERE m.user_id = $1
             ORDER BY w.created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx(e, None))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx(e, None))?;
        Ok(())
    }
}
