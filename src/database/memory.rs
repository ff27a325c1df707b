use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{CreditTransaction, UserRecord, Workspace, WorkspaceMember, WorkspaceMembership};
use super::store::{AccountStore, CreatedAccount, NewAccount, StoreError};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    emails: HashMap<String, Uuid>,
    credit_transactions: Vec<CreditTransaction>,
    workspaces: HashMap<Uuid, Workspace>,
    slugs: HashSet<String>,
    members: Vec<WorkspaceMember>,
}

/// Row counts per table, for inspection in tests and local runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub users: usize,
    pub credit_transactions: usize,
    pub workspaces: usize,
    pub workspace_members: usize,
}

/// In-process [`AccountStore`] used for local development and tests.
///
/// All tables sit behind one lock; `create_account` checks every constraint
/// before touching any table, so a rejected command leaves no rows behind.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn row_counts(&self) -> RowCounts {
        let tables = self.tables.read().await;
        RowCounts {
            users: tables.users.len(),
            credit_transactions: tables.credit_transactions.len(),
            workspaces: tables.workspaces.len(),
            workspace_members: tables.members.len(),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .emails
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_account(&self, account: NewAccount) -> Result<CreatedAccount, StoreError> {
        account.check()?;

        let mut tables = self.tables.write().await;

        if tables.emails.contains_key(&account.email) {
            return Err(StoreError::DuplicateEmail);
        }
        if tables.slugs.contains(&account.workspace_slug) {
            return Err(StoreError::DuplicateSlug(account.workspace_slug.clone()));
        }
        if tables.users.contains_key(&account.user_id)
            || tables.workspaces.contains_key(&account.workspace_id)
            || tables
                .credit_transactions
                .iter()
                .any(|t| t.id == account.credit_transaction_id)
        {
            return Err(StoreError::InvalidCommand("primary key already in use".to_string()));
        }

        let user = account.user_record();
        let credit_transaction = account.welcome_transaction();
        let workspace = account.workspace();

        tables.emails.insert(user.email.clone(), user.id);
        tables.users.insert(user.id, user.clone());
        tables.credit_transactions.push(credit_transaction.clone());
        tables.slugs.insert(workspace.slug.clone());
        tables.workspaces.insert(workspace.id, workspace.clone());
        tables.members.push(WorkspaceMember {
            workspace_id: workspace.id,
            user_id: user.id,
            role: NewAccount::OWNER_ROLE,
            created_at: account.created_at,
        });

        Ok(CreatedAccount {
            user,
            credit_transaction,
            workspace,
        })
    }

    async fn list_credit_transactions(&self, user_id: Uuid) -> Result<Vec<CreditTransaction>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<CreditTransaction> = tables
            .credit_transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_workspaces(&self, user_id: Uuid) -> Result<Vec<WorkspaceMembership>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<WorkspaceMembership> = tables
            .members
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                tables.workspaces.get(&m.workspace_id).map(|w| WorkspaceMembership {
                    id: w.id,
                    name: w.name.clone(),
                    slug: w.slug.clone(),
                    role: m.role,
                    created_at: w.created_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CreditTransactionType, WorkspaceRole};
    use chrono::Utc;

    fn account(email: &str, slug: &str) -> NewAccount {
        NewAccount {
            user_id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            starting_credits: 50,
            credit_transaction_id: Uuid::new_v4(),
            credit_description: "Welcome bonus".to_string(),
            workspace_id: Uuid::new_v4(),
            workspace_name: "Ada's Workspace".to_string(),
            workspace_slug: slug.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn creates_all_rows_together() {
        let store = MemoryStore::new();
        let created = store.create_account(account("ada@example.com", "ada-1")).await.unwrap();

        assert_eq!(created.user.credits, 50);
        assert_eq!(created.credit_transaction.amount, 50);
        assert_eq!(created.credit_transaction.balance_after, 50);
        assert_eq!(created.credit_transaction.transaction_type, CreditTransactionType::Reward);
        assert_eq!(
            store.row_counts().await,
            RowCounts {
                users: 1,
                credit_transactions: 1,
                workspaces: 1,
                workspace_members: 1,
            }
        );

        let workspaces = store.list_workspaces(created.user.id).await.unwrap();
        assert_eq!(workspaces.len(), 1);
        assert_eq!(workspaces[0].role, WorkspaceRole::Owner);
    }

    #[tokio::test]
    async fn slug_conflict_leaves_no_partial_rows() {
        let store = MemoryStore::new();
        store.create_account(account("ada@example.com", "shared")).await.unwrap();

        let err = store
            .create_account(account("grace@example.com", "shared"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSlug(ref s) if s == "shared"));

        assert_eq!(store.row_counts().await.users, 1);
        assert_eq!(store.row_counts().await.credit_transactions, 1);
        assert!(store.find_user_by_email("grace@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.create_account(account("ada@example.com", "a")).await.unwrap();

        let err = store.create_account(account("ada@example.com", "b")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.row_counts().await.workspaces, 1);
    }

    #[tokio::test]
    async fn rejects_inconsistent_commands() {
        let store = MemoryStore::new();
        let mut negative = account("ada@example.com", "a");
        negative.starting_credits = -1;

        let err = store.create_account(negative).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCommand(_)));
        assert_eq!(store.row_counts().await, RowCounts::default());
    }
}
