//! Plain one-row-per-entity tables.

use super::{corrupt, decimal, label, parse_label, raw_id, timestamp, Database, StoreError};
use crate::model::{Category, CompanyNumbers, DeliveryFailure, PaymentMethod, Product, User};
use actor_framework::{ActorEntity, Persistence};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row};
use std::marker::PhantomData;

/// An entity stored as one row of `TABLE`: `id` followed by `COLUMNS`.
pub trait Record: ActorEntity {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// One value per entry of `COLUMNS`, in order.
    fn values(&self) -> Result<Vec<Value>, StoreError>;

    /// Reads a row selected as `id, COLUMNS...`.
    fn from_row(row: &Row<'_>) -> Result<(u32, Self), StoreError>;
}

/// Generic [`Persistence`] over a [`Record`] table.
pub struct Table<T> {
    db: Database,
    select: String,
    insert: String,
    update: String,
    delete: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Table<T>
where
    T: Record,
    T::Id: Copy + Into<u32>,
{
    pub fn new(db: &Database) -> Self {
        let columns = T::COLUMNS.join(", ");
        let placeholders: Vec<String> = (1..=T::COLUMNS.len() + 1)
            .map(|n| format!("?{n}"))
            .collect();
        let assignments: Vec<String> = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(n, column)| format!("{column} = ?{}", n + 2))
            .collect();
        Self {
            db: db.clone(),
            select: format!("SELECT id, {columns} FROM {} ORDER BY id", T::TABLE),
            insert: format!(
                "INSERT INTO {} (id, {columns}) VALUES ({})",
                T::TABLE,
                placeholders.join(", ")
            ),
            update: format!(
                "UPDATE {} SET {} WHERE id = ?1",
                T::TABLE,
                assignments.join(", ")
            ),
            delete: format!("DELETE FROM {} WHERE id = ?1", T::TABLE),
            _record: PhantomData,
        }
    }

    fn row(id: &T::Id, item: &T) -> Result<Vec<Value>, StoreError> {
        let raw: u32 = (*id).into();
        let mut row = vec![Value::from(raw)];
        row.extend(item.values()?);
        Ok(row)
    }

    fn load_rows(&self) -> Result<Vec<(u32, T)>, StoreError> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare_cached(&self.select)?;
        let mut rows = stmt.query([])?;
        let mut loaded = Vec::new();
        while let Some(row) = rows.next()? {
            loaded.push(T::from_row(row)?);
        }
        Ok(loaded)
    }

    fn write(&self, sql: &str, id: &T::Id, item: &T) -> Result<(), StoreError> {
        let row = Self::row(id, item)?;
        self.db.lock().prepare_cached(sql)?.execute(params_from_iter(row))?;
        Ok(())
    }

    fn write_all(&self, items: &[(T::Id, T)]) -> Result<(), StoreError> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&self.update)?;
            for (id, item) in items {
                stmt.execute(params_from_iter(Self::row(id, item)?))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl<T> Persistence<T> for Table<T>
where
    T: Record,
    T::Id: Copy + Into<u32>,
{
    fn load(&self) -> Result<Vec<(u32, T)>, String> {
        Ok(self.load_rows()?)
    }

    fn insert(&self, id: &T::Id, item: &T) -> Result<(), String> {
        Ok(self.write(&self.insert, id, item)?)
    }

    fn update(&self, id: &T::Id, item: &T) -> Result<(), String> {
        Ok(self.write(&self.update, id, item)?)
    }

    fn update_all(&self, items: &[(T::Id, T)]) -> Result<(), String> {
        Ok(self.write_all(items)?)
    }

    fn remove(&self, id: &T::Id) -> Result<(), String> {
        let raw: u32 = (*id).into();
        self.db
            .lock()
            .prepare_cached(&self.delete)
            .and_then(|mut stmt| stmt.execute([raw]))
            .map_err(|e| StoreError::from(e).to_string())?;
        Ok(())
    }
}

// --- Records ---

impl Record for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "email",
        "full_name",
        "role",
        "account_type",
        "phone",
        "address",
        "nif",
        "stat",
        "rcs",
        "code",
        "active",
        "password_hash",
    ];

    fn values(&self) -> Result<Vec<Value>, StoreError> {
        Ok(vec![
            self.email.clone().into(),
            self.full_name.clone().into(),
            label(Self::TABLE, &self.role)?.into(),
            label(Self::TABLE, &self.account_type)?.into(),
            self.phone.clone().into(),
            self.address.clone().into(),
            self.company.nif.clone().into(),
            self.company.stat.clone().into(),
            self.company.rcs.clone().into(),
            self.code.clone().into(),
            self.active.into(),
            self.password_hash.clone().into(),
        ])
    }

    fn from_row(row: &Row<'_>) -> Result<(u32, Self), StoreError> {
        let id = raw_id(Self::TABLE, row.get(0)?)?;
        let user = User {
            id: id.into(),
            email: row.get(1)?,
            full_name: row.get(2)?,
            role: parse_label(Self::TABLE, row.get(3)?)?,
            account_type: parse_label(Self::TABLE, row.get(4)?)?,
            phone: row.get(5)?,
            address: row.get(6)?,
            company: CompanyNumbers {
                nif: row.get(7)?,
                stat: row.get(8)?,
                rcs: row.get(9)?,
            },
            code: row.get(10)?,
            active: row.get(11)?,
            password_hash: row.get(12)?,
        };
        Ok((id, user))
    }
}

impl Record for Category {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    fn values(&self) -> Result<Vec<Value>, StoreError> {
        Ok(vec![self.name.clone().into(), self.description.clone().into()])
    }

    fn from_row(row: &Row<'_>) -> Result<(u32, Self), StoreError> {
        let id = raw_id(Self::TABLE, row.get(0)?)?;
        Ok((
            id,
            Category {
                id: id.into(),
                name: row.get(1)?,
                description: row.get(2)?,
            },
        ))
    }
}

impl Record for PaymentMethod {
    const TABLE: &'static str = "payment_methods";
    const COLUMNS: &'static [&'static str] = &["label"];

    fn values(&self) -> Result<Vec<Value>, StoreError> {
        Ok(vec![self.label.clone().into()])
    }

    fn from_row(row: &Row<'_>) -> Result<(u32, Self), StoreError> {
        let id = raw_id(Self::TABLE, row.get(0)?)?;
        Ok((
            id,
            PaymentMethod {
                id: id.into(),
                label: row.get(1)?,
            },
        ))
    }
}

impl Record for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "category",
        "name",
        "description",
        "validity",
        "price_min",
        "price",
        "price_max",
        "code",
    ];

    fn values(&self) -> Result<Vec<Value>, StoreError> {
        Ok(vec![
            self.category.0.into(),
            self.name.clone().into(),
            self.description.clone().into(),
            label(Self::TABLE, &self.validity)?.into(),
            self.price_min.to_string().into(),
            self.price.to_string().into(),
            self.price_max.to_string().into(),
            self.code.clone().into(),
        ])
    }

    fn from_row(row: &Row<'_>) -> Result<(u32, Self), StoreError> {
        let id = raw_id(Self::TABLE, row.get(0)?)?;
        let category = raw_id(Self::TABLE, row.get(1)?)?;
        let price_min: String = row.get(5)?;
        let price: String = row.get(6)?;
        let price_max: String = row.get(7)?;
        Ok((
            id,
            Product {
                id: id.into(),
                category: category.into(),
                name: row.get(2)?,
                description: row.get(3)?,
                validity: parse_label(Self::TABLE, row.get(4)?)?,
                price_min: decimal(Self::TABLE, &price_min)?,
                price: decimal(Self::TABLE, &price)?,
                price_max: decimal(Self::TABLE, &price_max)?,
                code: row.get(8)?,
            },
        ))
    }
}

impl Record for DeliveryFailure {
    const TABLE: &'static str = "delivery_failures";
    const COLUMNS: &'static [&'static str] = &[
        "client",
        "action",
        "failed_at",
        "error",
        "attempts",
        "payload",
        "resolved",
    ];

    fn values(&self) -> Result<Vec<Value>, StoreError> {
        Ok(vec![
            self.client.0.into(),
            self.action.0.into(),
            self.failed_at.to_rfc3339().into(),
            self.error.clone().into(),
            self.attempts.into(),
            self.payload.clone().into(),
            self.resolved.into(),
        ])
    }

    fn from_row(row: &Row<'_>) -> Result<(u32, Self), StoreError> {
        let id = raw_id(Self::TABLE, row.get(0)?)?;
        let failed_at: String = row.get(3)?;
        let attempts: i64 = row.get(5)?;
        Ok((
            id,
            DeliveryFailure {
                id: id.into(),
                client: raw_id(Self::TABLE, row.get(1)?)?.into(),
                action: raw_id(Self::TABLE, row.get(2)?)?.into(),
                failed_at: timestamp(Self::TABLE, &failed_at)?,
                error: row.get(4)?,
                attempts: u32::try_from(attempts)
                    .map_err(|_| corrupt(Self::TABLE, format!("attempts {attempts}")))?,
                payload: row.get(6)?,
                resolved: row.get(7)?,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountType, CategoryId, Role, UserId, Validity};
    use rust_decimal::Decimal;

    fn user(id: u32, email: &str) -> User {
        User {
            id: UserId(id),
            email: email.into(),
            full_name: "Hery Rabe".into(),
            role: Role::Vendeur,
            account_type: AccountType::Company,
            phone: "034 00 000 00".into(),
            address: "Antananarivo".into(),
            company: CompanyNumbers {
                nif: Some("NIF-1".into()),
                stat: None,
                rcs: Some("RCS-9".into()),
            },
            code: format!("vendeur-{id}"),
            active: true,
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[test]
    fn test_users_survive_a_reload() {
        let db = Database::in_memory().unwrap();
        let table = Table::<User>::new(&db);
        table.insert(&UserId(1), &user(1, "a@shop.mg")).unwrap();
        table.insert(&UserId(4), &user(4, "b@shop.mg")).unwrap();

        let mut changed = user(4, "c@shop.mg");
        changed.active = false;
        table.update(&UserId(4), &changed).unwrap();
        table.remove(&UserId(1)).unwrap();

        let loaded = Table::<User>::new(&db).load().unwrap();
        assert_eq!(loaded, vec![(4, changed)]);
    }

    #[test]
    fn test_duplicate_insert_is_refused() {
        let db = Database::in_memory().unwrap();
        let table = Table::<User>::new(&db);
        table.insert(&UserId(1), &user(1, "a@shop.mg")).unwrap();
        assert!(table.insert(&UserId(1), &user(1, "a@shop.mg")).is_err());
    }

    #[test]
    fn test_product_prices_keep_their_scale() {
        let db = Database::in_memory().unwrap();
        let table = Table::<Product>::new(&db);
        let product = Product {
            id: 2.into(),
            category: CategoryId(1),
            name: "Office".into(),
            description: String::new(),
            validity: Validity::Lifetime,
            price_min: Decimal::new(9_950, 2),
            price: Decimal::new(10_000, 2),
            price_max: Decimal::new(12_000, 2),
            code: "Suites-Office-2".into(),
        };
        table.insert(&product.id, &product).unwrap();
        let loaded = table.load().unwrap();
        assert_eq!(loaded[0].1, product);
        assert_eq!(loaded[0].1.price.to_string(), "100.00");
    }

    #[test]
    fn test_corrupt_label_fails_the_load() {
        let db = Database::in_memory().unwrap();
        let table = Table::<User>::new(&db);
        table.insert(&UserId(1), &user(1, "a@shop.mg")).unwrap();
        db.lock()
            .execute("UPDATE users SET role = 'owner' WHERE id = 1", [])
            .unwrap();
        let err = table.load().unwrap_err();
        assert!(err.contains("users"), "{err}");
    }
}
