pub mod credit_transaction;
pub mod user;
pub mod workspace;

pub use credit_transaction::{CreditTransaction, CreditTransactionType};
pub use user::{UserRecord, UserSummary};
pub use workspace::{Workspace, WorkspaceMember, WorkspaceMembership, WorkspaceRole, WorkspaceSummary};
