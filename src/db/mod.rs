//! Database module
//!
//! Handles SQLite connection, migrations and ledger persistence.

pub mod connection;
pub mod migrations;
pub mod store;

pub use connection::{Database, DbError, DbResult};
pub use store::{LedgerStore, MemoryStore, SqliteStore, LEDGER_KEY};
