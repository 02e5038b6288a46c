//! # SQLite Store
//!
//! Durable backing for every actor. Each actor still serves reads from memory; the tables here
//! are written through [`Persistence`](actor_framework::Persistence) before a change is
//! committed in memory, and read back once at startup.
//!
//! One [`Database`] holds a single connection shared by all stores. Writes are short and made
//! one at a time from each actor's task, so a mutex is enough.
//!
//! ## Tables
//!
//! | Table | Written by |
//! |-------|------------|
//! | `users`, `categories`, `products`, `payment_methods`, `delivery_failures` | [`Table`] |
//! | `keys` (identity columns) | [`KeyStore`] |
//! | `actions`, `line_items`, `keys` (availability columns) | [`LedgerStore`] |
//!
//! A key's `available` and `consumed_by` columns are only ever written by the ledger, in the
//! same transaction that inserts the purchase consuming it. The claim and the action therefore
//! reach the disk together or not at all.

pub mod keys;
pub mod ledger;
pub mod records;

pub use keys::KeyStore;
pub use ledger::LedgerStore;
pub use records::{Record, Table};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::info;

/// Path that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

const BUSY_TIMEOUT_MS: u32 = 5_000;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY,
    email         TEXT NOT NULL,
    full_name     TEXT NOT NULL,
    role          TEXT NOT NULL,
    account_type  TEXT NOT NULL,
    phone         TEXT NOT NULL,
    address       TEXT NOT NULL,
    nif           TEXT,
    stat          TEXT,
    rcs           TEXT,
    code          TEXT NOT NULL,
    active        INTEGER NOT NULL,
    password_hash TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS categories (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS products (
    id          INTEGER PRIMARY KEY,
    category    INTEGER NOT NULL,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    validity    TEXT NOT NULL,
    price_min   TEXT NOT NULL,
    price       TEXT NOT NULL,
    price_max   TEXT NOT NULL,
    code        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS payment_methods (
    id    INTEGER PRIMARY KEY,
    label TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS keys (
    id          INTEGER PRIMARY KEY,
    product     INTEGER NOT NULL,
    secret      TEXT NOT NULL,
    code        TEXT NOT NULL,
    available   INTEGER NOT NULL,
    consumed_by INTEGER
);
CREATE INDEX IF NOT EXISTS keys_by_product ON keys (product, available);
CREATE TABLE IF NOT EXISTS actions (
    id             INTEGER PRIMARY KEY,
    kind           TEXT NOT NULL,
    code           TEXT NOT NULL,
    total_price    TEXT NOT NULL,
    agreed_price   TEXT,
    created_at     TEXT NOT NULL,
    client         INTEGER NOT NULL,
    seller         INTEGER,
    payment_method INTEGER NOT NULL,
    delivered      INTEGER NOT NULL,
    paid           INTEGER NOT NULL,
    allocation     TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS line_items (
    action       INTEGER NOT NULL,
    position     INTEGER NOT NULL,
    product      INTEGER NOT NULL,
    product_name TEXT NOT NULL,
    quantity     INTEGER NOT NULL,
    unit_price   TEXT NOT NULL,
    sub_total    TEXT NOT NULL,
    validity     TEXT NOT NULL,
    PRIMARY KEY (action, position)
);
CREATE TABLE IF NOT EXISTS delivery_failures (
    id        INTEGER PRIMARY KEY,
    client    INTEGER NOT NULL,
    action    INTEGER NOT NULL,
    failed_at TEXT NOT NULL,
    error     TEXT NOT NULL,
    attempts  INTEGER NOT NULL,
    payload   TEXT NOT NULL,
    resolved  INTEGER NOT NULL
);
";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Corrupt value in {table}: {detail}")]
    Corrupt { table: &'static str, detail: String },

    /// The ledger tried to consume a key that is missing or already consumed on disk.
    #[error("Key {0} is not available in the store")]
    KeyUnavailable(u32),
}

impl From<StoreError> for String {
    fn from(err: StoreError) -> Self {
        err.to_string()
    }
}

/// Shared handle on the shop's SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at `path` and makes sure every table exists.
    /// [`IN_MEMORY`] opens a fresh database that disappears with the process.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = if path == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.pragma_update(None, "journal_mode", "wal")?;
        conn.pragma_update(None, "synchronous", "full")?;
        conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS)?;
        conn.execute_batch(SCHEMA)?;
        info!(path, "Database ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(IN_MEMORY)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// --- Column codecs ---

/// Serde name of a unit enum variant (`"vendeur"`, `"1 year"`, `"ACHAT"`).
fn label<T: Serialize>(table: &'static str, value: &T) -> Result<String, StoreError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(label)) => Ok(label),
        Ok(other) => Err(corrupt(table, format!("{other} is not a label"))),
        Err(e) => Err(corrupt(table, e)),
    }
}

fn parse_label<T: DeserializeOwned>(table: &'static str, raw: String) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::String(raw)).map_err(|e| corrupt(table, e))
}

fn decimal(table: &'static str, raw: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(raw).map_err(|e| corrupt(table, format!("{raw:?}: {e}")))
}

fn timestamp(table: &'static str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| corrupt(table, format!("{raw:?}: {e}")))
}

fn raw_id(table: &'static str, raw: i64) -> Result<u32, StoreError> {
    u32::try_from(raw).map_err(|_| corrupt(table, format!("id {raw} out of range")))
}

fn corrupt(table: &'static str, detail: impl ToString) -> StoreError {
    StoreError::Corrupt {
        table,
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, Validity};

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");
        let path = path.to_str().unwrap();
        Database::open(path).unwrap();
        Database::open(path).expect("Reopening must not fail on existing tables");
    }

    #[test]
    fn test_labels_follow_serde_names() {
        assert_eq!(label("users", &Role::Vendeur).unwrap(), "vendeur");
        assert_eq!(label("products", &Validity::TwoYears).unwrap(), "2 years");
        let role: Role = parse_label("users", "admin".into()).unwrap();
        assert_eq!(role, Role::Admin);
        assert!(matches!(
            parse_label::<Role>("users", "owner".into()),
            Err(StoreError::Corrupt { table: "users", .. })
        ));
    }

    #[test]
    fn test_bad_numbers_are_corrupt() {
        assert!(decimal("actions", "12.50").is_ok());
        assert!(decimal("actions", "twelve").is_err());
        assert!(timestamp("actions", "yesterday").is_err());
        assert!(raw_id("keys", -1).is_err());
    }
}
