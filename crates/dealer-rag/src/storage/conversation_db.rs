//! SQLite conversation log
//!
//! Local alternative to the Supabase `conversations` table.

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::{ConversationEntry, ConversationLog};

/// SQLite-backed conversation log
pub struct SqliteConversationLog {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteConversationLog {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P, table: &str) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Internal(format!("Failed to open database: {}", e)))?;

        Self::with_connection(conn, table)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory(table: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Internal(format!("Failed to open in-memory database: {}", e)))?;

        Self::with_connection(conn, table)
    }

    fn with_connection(conn: Connection, table: &str) -> Result<Self> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::Config(format!("Invalid conversation table name: {:?}", table)));
        }

        let log = Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.to_string(),
        };

        log.migrate()?;
        Ok(log)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_timestamp ON {table}(timestamp);
            "#,
            table = self.table
        ))?;

        Ok(())
    }

    /// Insert one entry, returning its row id
    pub fn insert(&self, entry: &ConversationEntry) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let conn = self.conn.lock();

        conn.execute(
            &format!(
                "INSERT INTO {} (id, question, answer, timestamp) VALUES (?1, ?2, ?3, ?4)",
                self.table
            ),
            params![
                id.to_string(),
                entry.question,
                entry.answer,
                entry.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(id)
    }

    /// Number of recorded entries (for testing)
    #[cfg(test)]
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl ConversationLog for SqliteConversationLog {
    async fn record(&self, entry: &ConversationEntry) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let table = self.table.clone();
        let entry = entry.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let log = SqliteConversationLog { conn, table };
            log.insert(&entry).map(|_| ())
        })
        .await
        .map_err(|e| Error::Internal(format!("Conversation log task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
