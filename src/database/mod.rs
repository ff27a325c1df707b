pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::{MemoryStore, RowCounts};
pub use postgres::PgStore;
pub use store::{AccountStore, CreatedAccount, NewAccount, StoreError};
