//! The `keys` table, as written by the Key actor.
//!
//! The actor writes a key's identity (product, secret, code) and inserts it available. It never
//! writes `available` or `consumed_by`: a claim only reaches the disk through the purchase that
//! made it (see [`LedgerStore`](super::LedgerStore)).

use super::{raw_id, Database, StoreError};
use crate::model::{Key, KeyId};
use actor_framework::Persistence;
use rusqlite::params;

#[derive(Clone)]
pub struct KeyStore {
    db: Database,
}

impl KeyStore {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    fn load_rows(&self) -> Result<Vec<(u32, Key)>, StoreError> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, product, secret, code, available, consumed_by FROM keys ORDER BY id",
        )?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            let id = raw_id("keys", row.get(0)?)?;
            let consumed_by: Option<i64> = row.get(5)?;
            let key = Key {
                id: KeyId(id),
                product: raw_id("keys", row.get(1)?)?.into(),
                secret: row.get(2)?,
                code: row.get(3)?,
                available: row.get(4)?,
                consumed_by: consumed_by
                    .map(|action| raw_id("keys", action).map(Into::into))
                    .transpose()?,
            };
            keys.push((id, key));
        }
        Ok(keys)
    }

    fn insert_row(&self, key: &Key) -> Result<(), StoreError> {
        self.db
            .lock()
            .prepare_cached(
                "INSERT INTO keys (id, product, secret, code, available, consumed_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?
            .execute(params![
                key.id.0,
                key.product.0,
                key.secret,
                key.code,
                key.available,
                key.consumed_by.map(|action| action.0),
            ])?;
        Ok(())
    }

    fn update_rows(&self, keys: &[&Key]) -> Result<(), StoreError> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "UPDATE keys SET product = ?2, secret = ?3, code = ?4 WHERE id = ?1",
            )?;
            for key in keys {
                stmt.execute(params![key.id.0, key.product.0, key.secret, key.code])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl Persistence<Key> for KeyStore {
    fn load(&self) -> Result<Vec<(u32, Key)>, String> {
        Ok(self.load_rows()?)
    }

    fn insert(&self, _id: &KeyId, key: &Key) -> Result<(), String> {
        Ok(self.insert_row(key)?)
    }

    fn update(&self, _id: &KeyId, key: &Key) -> Result<(), String> {
        Ok(self.update_rows(&[key])?)
    }

    fn update_all(&self, keys: &[(KeyId, Key)]) -> Result<(), String> {
        let keys: Vec<&Key> = keys.iter().map(|(_, key)| key).collect();
        Ok(self.update_rows(&keys)?)
    }

    fn remove(&self, id: &KeyId) -> Result<(), String> {
        self.db
            .lock()
            .execute("DELETE FROM keys WHERE id = ?1", [id.0])
            .map_err(|e| StoreError::from(e).to_string())?;
        Ok(())
    }
}
