use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatRecord, ChatStore, StoreError};

/// In-process store with the same contract as the SQLite one. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryChatStore {
    records: Mutex<Vec<ChatRecord>>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn insert(&self, user: &str, bot: &str) -> Result<ChatRecord, StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;

        let id = records.last().map(|r| r.id + 1).unwrap_or(1);
        let record = ChatRecord {
            id,
            user: user.to_string(),
            bot: bot.to_string(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<ChatRecord>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(records.clone())
    }
}
