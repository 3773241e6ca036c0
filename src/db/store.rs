//! Ledger persistence
//!
//! The ledger is stored as one JSON document under a single key. Loading an
//! absent key yields an empty ledger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rusqlite::{params, OptionalExtension};

use super::connection::{Database, DbError, DbResult};
use crate::models::PurchaseRecord;

/// Key the ledger document is stored under
pub const LEDGER_KEY: &str = "foodExpenses";

/// Durable storage for the purchase ledger
pub trait LedgerStore {
    /// Load all records, or an empty list if nothing was saved yet
    fn load(&self) -> DbResult<Vec<PurchaseRecord>>;

    /// Replace the stored records
    fn save(&self, records: &[PurchaseRecord]) -> DbResult<()>;
}

/// SQLite-backed key-value store
#[derive(Clone)]
pub struct SqliteStore {
    database: Database,
    key: String,
}

impl SqliteStore {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            key: LEDGER_KEY.to_string(),
        }
    }

    pub fn with_key(database: Database, key: impl Into<String>) -> Self {
        Self {
            database,
            key: key.into(),
        }
    }
}

impl LedgerStore for SqliteStore {
    fn load(&self) -> DbResult<Vec<PurchaseRecord>> {
        let blob: Option<String> = self.database.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    [&self.key],
                    |row| row.get(0),
                )
                .optional()?)
        })?;

        match blob {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[PurchaseRecord]) -> DbResult<()> {
        let json = serde_json::to_string(records)?;
        self.database.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = datetime('now')
                "#,
                params![self.key, json],
            )?;
            Ok(())
        })
    }
}

/// In-memory store. Clones share the same document.
#[derive(Clone, Default)]
pub struct MemoryStore {
    blob: Arc<Mutex<Option<String>>>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a serialized document
    pub fn with_document(json: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut blob) = store.blob.lock() {
            *blob = Some(json.into());
        }
        store
    }

    /// Make subsequent saves fail, simulating an unavailable backend
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The currently stored document, if any
    pub fn document(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|blob| blob.clone())
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> DbResult<Vec<PurchaseRecord>> {
        match self.document() {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[PurchaseRecord]) -> DbResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("memory store is read-only".to_string()));
        }
        let json = serde_json::to_string(records)?;
        let mut blob = self
            .blob
            .lock()
            .map_err(|_| DbError::Unavailable("memory store lock poisoned".to_string()))?;
        *blob = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::DEFAULT_CATEGORY;

    fn record(id: u64, cost: f64) -> PurchaseRecord {
        PurchaseRecord {
            id,
            food_name: "Gala Apples".into(),
            brand: "Organic Valley".into(),
            category: DEFAULT_CATEGORY.into(),
            unit_label: "lb".into(),
            quantity: 3.0,
            cost,
            unit_price: cost / 3.0,
            total_calories: 708,
            total_protein: 3,
            total_fat: 3,
            total_carbs: 189,
            timestamp: "2026-10-18T09:00:00.000Z".into(),
        }
    }

    fn sqlite_store() -> SqliteStore {
        let database = Database::open_in_memory().unwrap();
        database.with_conn(run_migrations).unwrap();
        SqliteStore::new(database)
    }

    #[test]
    fn test_sqlite_load_empty() {
        let store = sqlite_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_save_then_load() {
        let store = sqlite_store();
        store.save(&[record(2, 4.5), record(1, 3.0)]).unwrap();
        store.save(&[record(2, 4.5)]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 2);
    }

    #[test]
    fn test_sqlite_keys_are_independent() {
        let database = Database::open_in_memory().unwrap();
        database.with_conn(run_migrations).unwrap();
        let a = SqliteStore::new(database.clone());
        let b = SqliteStore::with_key(database, "otherLedger");

        a.save(&[record(1, 1.0)]).unwrap();
        assert!(b.load().unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_corrupt_document() {
        let store = sqlite_store();
        store
            .database
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO kv_store (key, value) VALUES (?1, 'not json')",
                    [LEDGER_KEY],
                )?;
                Ok(())
            })
            .unwrap();
        assert!(matches!(store.load(), Err(DbError::Serialization(_))));
    }

    #[test]
    fn test_memory_store_shared_between_clones() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.save(&[record(7, 2.0)]).unwrap();
        assert_eq!(handle.load().unwrap()[0].id, 7);
    }

    #[test]
    fn test_memory_store_failing_saves() {
        let store = MemoryStore::new();
        store.set_fail_saves(true);
        assert!(matches!(store.save(&[]), Err(DbError::Unavailable(_))));
        assert!(store.document().is_none());
    }
}
