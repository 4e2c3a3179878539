//! Storage module for persistent data storage
//!
//! Provides SQLite-based persistence for the conversation log.

mod conversation_db;

pub use conversation_db::SqliteConversationLog;
