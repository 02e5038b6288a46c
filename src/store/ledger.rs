//! The `actions` and `line_items` tables, plus the key consumption they imply.

use super::{corrupt, decimal, label, parse_label, raw_id, timestamp, Database, StoreError};
use crate::model::{Action, ActionId, Allocation, LineItem};
use actor_framework::Persistence;
use rusqlite::{params, Transaction};
use std::collections::BTreeMap;
use tracing::debug;

const TABLE: &str = "actions";

#[derive(Clone)]
pub struct LedgerStore {
    db: Database,
}

impl LedgerStore {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    fn load_rows(&self) -> Result<Vec<(u32, Action)>, StoreError> {
        let conn = self.db.lock();

        let mut lines: BTreeMap<u32, Vec<LineItem>> = BTreeMap::new();
        let mut stmt = conn.prepare_cached(
            "SELECT action, product, product_name, quantity, unit_price, sub_total, validity
             FROM line_items ORDER BY action, position",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let action = raw_id("line_items", row.get(0)?)?;
            let unit_price: String = row.get(4)?;
            let sub_total: String = row.get(5)?;
            lines.entry(action).or_default().push(LineItem {
                product: raw_id("line_items", row.get(1)?)?.into(),
                product_name: row.get(2)?,
                quantity: raw_id("line_items", row.get(3)?)?,
                unit_price: decimal("line_items", &unit_price)?,
                sub_total: decimal("line_items", &sub_total)?,
                validity: parse_label("line_items", row.get(6)?)?,
            });
        }

        let mut stmt = conn.prepare_cached(
            "SELECT id, kind, code, total_price, agreed_price, created_at, client, seller,
                    payment_method, delivered, paid, allocation
             FROM actions ORDER BY id",
        )?;
        let mut rows = stmt.query([])?;
        let mut actions = Vec::new();
        while let Some(row) = rows.next()? {
            let id = raw_id(TABLE, row.get(0)?)?;
            let total_price: String = row.get(3)?;
            let agreed_price: Option<String> = row.get(4)?;
            let created_at: String = row.get(5)?;
            let seller: Option<i64> = row.get(7)?;
            let allocation: String = row.get(11)?;
            let allocation: Allocation =
                serde_json::from_str(&allocation).map_err(|e| corrupt(TABLE, e))?;
            let action = Action {
                id: ActionId(id),
                kind: parse_label(TABLE, row.get(1)?)?,
                code: row.get(2)?,
                total_price: decimal(TABLE, &total_price)?,
                agreed_price: agreed_price
                    .map(|price| decimal(TABLE, &price))
                    .transpose()?,
                created_at: timestamp(TABLE, &created_at)?,
                client: raw_id(TABLE, row.get(6)?)?.into(),
                seller: seller
                    .map(|seller| raw_id(TABLE, seller).map(Into::into))
                    .transpose()?,
                payment_method: raw_id(TABLE, row.get(8)?)?.into(),
                delivered: row.get(9)?,
                paid: row.get(10)?,
                lines: lines.remove(&id).unwrap_or_default(),
                allocation,
            };
            actions.push((id, action));
        }
        Ok(actions)
    }

    /// Writes the action, its line items and the consumption of every key it allocated, in one
    /// transaction. Each key must still be available on disk, or nothing is written.
    fn insert_action(&self, action: &Action) -> Result<(), StoreError> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;
        insert_rows(&tx, action)?;
        for key in action.key_ids() {
            let consumed = tx
                .prepare_cached(
                    "UPDATE keys SET available = 0, consumed_by = ?1
                     WHERE id = ?2 AND available = 1",
                )?
                .execute(params![action.id.0, key.0])?;
            if consumed != 1 {
                return Err(StoreError::KeyUnavailable(key.0));
            }
        }
        tx.commit()?;
        debug!(action_id = %action.id, keys = action.key_ids().len(), "Action written");
        Ok(())
    }

    /// Only the staff-editable columns change after insertion.
    fn update_action(&self, action: &Action) -> Result<(), StoreError> {
        self.db
            .lock()
            .prepare_cached(
                "UPDATE actions SET delivered = ?2, paid = ?3, agreed_price = ?4 WHERE id = ?1",
            )?
            .execute(params![
                action.id.0,
                action.delivered,
                action.paid,
                action.agreed_price.map(|price| price.to_string()),
            ])?;
        Ok(())
    }

    /// Keys stay consumed: a deleted action never returns its keys to the pool.
    fn remove_action(&self, id: ActionId) -> Result<(), StoreError> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM line_items WHERE action = ?1", [id.0])?;
        tx.execute("DELETE FROM actions WHERE id = ?1", [id.0])?;
        tx.commit()?;
        Ok(())
    }
}

fn insert_rows(tx: &Transaction<'_>, action: &Action) -> Result<(), StoreError> {
    let allocation = serde_json::to_string(&action.allocation).map_err(|e| corrupt(TABLE, e))?;
    tx.prepare_cached(
        "INSERT INTO actions (id, kind, code, total_price, agreed_price, created_at, client,
                              seller, payment_method, delivered, paid, allocation)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )?
    .execute(params![
        action.id.0,
        label(TABLE, &action.kind)?,
        action.code,
        action.total_price.to_string(),
        action.agreed_price.map(|price| price.to_string()),
        action.created_at.to_rfc3339(),
        action.client.0,
        action.seller.map(|seller| seller.0),
        action.payment_method.0,
        action.delivered,
        action.paid,
        allocation,
    ])?;

    let mut stmt = tx.prepare_cached(
        "INSERT INTO line_items (action, position, product, product_name, quantity, unit_price,
                                 sub_total, validity)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for (position, line) in action.lines.iter().enumerate() {
        stmt.execute(params![
            action.id.0,
            position as i64,
            line.product.0,
            line.product_name,
            line.quantity,
            line.unit_price.to_string(),
            line.sub_total.to_string(),
            label("line_items", &line.validity)?,
        ])?;
    }
    Ok(())
}

impl Persistence<Action> for LedgerStore {
    fn load(&self) -> Result<Vec<(u32, Action)>, String> {
        Ok(self.load_rows()?)
    }

    fn insert(&self, _id: &ActionId, action: &Action) -> Result<(), String> {
        Ok(self.insert_action(action)?)
    }

    fn update(&self, _id: &ActionId, action: &Action) -> Result<(), String> {
        Ok(self.update_action(action)?)
    }

    fn remove(&self, id: &ActionId) -> Result<(), String> {
        Ok(self.remove_action(*id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::store::KeyStore;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn key(id: u32) -> Key {
        Key {
            id: KeyId(id),
            product: ProductId(3),
            secret: format!("SECRET-{id}"),
            code: format!("Office-{id}"),
            available: true,
            consumed_by: None,
        }
    }

    fn purchase(id: u32, keys: &[u32]) -> Action {
        let entries = keys
            .iter()
            .map(|key| AllocationEntry {
                key_id: Some(KeyId(*key)),
                secret_payload: format!("SECRET-{key}"),
                display_code: format!("Office-{key}"),
                validity_label: Validity::OneYear,
            })
            .collect();
        let mut allocation = Allocation::new();
        allocation.insert("Office".into(), entries);
        Action {
            id: ActionId(id),
            kind: ActionKind::Purchase,
            code: format!("ACHAT-{id}"),
            total_price: Decimal::new(25_050, 2),
            agreed_price: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            client: UserId(1),
            seller: Some(UserId(2)),
            payment_method: PaymentMethodId(1),
            delivered: false,
            paid: false,
            lines: vec![LineItem {
                product: ProductId(3),
                product_name: "Office".into(),
                quantity: keys.len() as u32,
                unit_price: Decimal::new(12_525, 2),
                sub_total: Decimal::new(25_050, 2),
                validity: Validity::OneYear,
            }],
            allocation,
        }
    }

    fn stocked(count: u32) -> (Database, KeyStore, LedgerStore) {
        let db = Database::in_memory().unwrap();
        let keys = KeyStore::new(&db);
        for id in 1..=count {
            keys.insert(&KeyId(id), &key(id)).unwrap();
        }
        let ledger = LedgerStore::new(&db);
        (db, keys, ledger)
    }

    #[test]
    fn test_purchase_and_key_flags_are_written_together() {
        let (_db, keys, ledger) = stocked(3);
        let action = purchase(1, &[1, 2]);
        ledger.insert(&action.id, &action).unwrap();

        let loaded = ledger.load().unwrap();
        assert_eq!(loaded, vec![(1, action)]);

        let flags: Vec<(bool, Option<ActionId>)> = keys
            .load()
            .unwrap()
            .into_iter()
            .map(|(_, key)| (key.available, key.consumed_by))
            .collect();
        assert_eq!(
            flags,
            vec![
                (false, Some(ActionId(1))),
                (false, Some(ActionId(1))),
                (true, None)
            ]
        );
    }

    /// A key already consumed on disk aborts the whole write: no action, no line item, and the
    /// other key of the claim stays available.
    #[test]
    fn test_claim_of_a_consumed_key_writes_nothing() {
        let (db, keys, ledger) = stocked(3);
        let first = purchase(1, &[2]);
        ledger.insert(&first.id, &first).unwrap();

        let err = ledger
            .insert(&ActionId(2), &purchase(2, &[1, 2]))
            .unwrap_err();
        assert!(err.contains("Key 2"), "{err}");

        assert_eq!(ledger.load().unwrap().len(), 1);
        let line_items: i64 = db
            .lock()
            .query_row("SELECT COUNT(*) FROM line_items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(line_items, 1);
        let key_one = keys.load().unwrap().remove(0).1;
        assert!(key_one.available);
    }

    #[test]
    fn test_updates_touch_flags_and_agreed_price_only() {
        let (_db, keys, ledger) = stocked(1);
        let mut action = purchase(1, &[1]);
        ledger.insert(&action.id, &action).unwrap();

        action.delivered = true;
        action.agreed_price = Some(Decimal::from(200));
        ledger.update(&action.id, &action).unwrap();
        assert_eq!(ledger.load().unwrap()[0].1, action);

        ledger.remove(&action.id).unwrap();
        assert!(ledger.load().unwrap().is_empty());
        assert!(!keys.load().unwrap()[0].1.available);
    }

    #[test]
    fn test_quotes_touch_no_key() {
        let (_db, keys, ledger) = stocked(1);
        let mut quote = purchase(1, &[]);
        quote.kind = ActionKind::Quote;
        quote.code = "DEVIS-1".into();
        quote.allocation.insert(
            "Office".into(),
            vec![AllocationEntry::placeholder(Validity::OneYear)],
        );
        ledger.insert(&quote.id, &quote).unwrap();
        assert_eq!(ledger.load().unwrap()[0].1, quote);
        assert!(keys.load().unwrap()[0].1.available);
    }
}
