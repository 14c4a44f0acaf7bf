//! Append-only persistence for chat exchanges.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryChatStore;
pub use sqlite::SqliteChatStore;

/// One persisted user/bot exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub id: i64,
    pub user: String,
    pub bot: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Insert and list only. Records are never updated or removed.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Append a pair and return it with its assigned id.
    async fn insert(&self, user: &str, bot: &str) -> Result<ChatRecord, StoreError>;

    /// All records in ascending id order.
    async fn list_all(&self) -> Result<Vec<ChatRecord>, StoreError>;
}
