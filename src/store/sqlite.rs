use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection};

use super::{ChatRecord, ChatStore, StoreError};

/// SQLite-backed chat history. One connection, serialised by a mutex.
#[derive(Clone)]
pub struct SqliteChatStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteChatStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chat_history (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT,
                bot  TEXT
            );
            "#,
        )?;
        debug!("chat_history table ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // rusqlite is blocking, so every statement runs on the blocking pool.
    async fn call<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("DB task join error: {e}")))?
    }
}

#[async_trait]
impl ChatStore for SqliteChatStore {
    async fn insert(&self, user: &str, bot: &str) -> Result<ChatRecord, StoreError> {
        let user = user.to_string();
        let bot = bot.to_string();

        self.call(move |conn| {
            conn.execute(
                "INSERT INTO chat_history (user, bot) VALUES (?1, ?2)",
                params![user, bot],
            )?;
            let id = conn.last_insert_rowid();
            Ok(ChatRecord { id, user, bot })
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<ChatRecord>, StoreError> {
        self.call(|conn| {
            let mut stmt = conn.prepare("SELECT id, user, bot FROM chat_history ORDER BY id ASC")?;
            let rows = stmt.query_map([], |row| {
                Ok(ChatRecord {
                    id: row.get(0)?,
                    user: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    bot: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?;

            let records = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = SqliteChatStore::in_memory().unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_come_back_in_insertion_order() {
        let store = SqliteChatStore::in_memory().unwrap();
        let first = store.insert("hi", "hello").await.unwrap();
        let second = store.insert("how are you?", "fine").await.unwrap();
        assert!(second.id > first.id);

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");

        {
            let store = SqliteChatStore::open(&path).unwrap();
            store.insert("remember me", "noted").await.unwrap();
        }

        let reopened = SqliteChatStore::open(&path).unwrap();
        reopened.insert("still there?", "yes").await.unwrap();
        let all = reopened.list_all().await.unwrap();
        let pairs: Vec<(&str, &str)> = all.iter().map(|r| (r.user.as_str(), r.bot.as_str())).collect();
        assert_eq!(pairs, vec![("remember me", "noted"), ("still there?", "yes")]);
    }

    #[tokio::test]
    async fn concurrent_inserts_get_unique_increasing_ids() {
        let store = SqliteChatStore::in_memory().unwrap();

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(&format!("q{i}"), &format!("a{i}")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 20);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    }
}
