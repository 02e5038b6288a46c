//! License keys: the Key Pool's records.
use crate::model::{ActionId, ProductId};
use serde::{Deserialize, Serialize};

entity_id!(Key, "key");

/// A redeemable license credential tied to one product.
///
/// A key moves from available to consumed exactly once, through
/// [`KeyAction::Consume`](crate::key_actor::KeyAction::Consume), and records the action that
/// consumed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Key {
    pub id: KeyId,
    pub product: ProductId,
    /// The secret handed to the buyer.
    pub secret: String,
    /// `"{product name}-{id}"`.
    pub code: String,
    pub available: bool,
    pub consumed_by: Option<ActionId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyCreate {
    pub product: ProductId,
    pub secret: String,
}

/// Only the secret of a still-available key can be corrected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyUpdate {
    pub secret: Option<String>,
}

/// Selects keys by product and availability.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyFilter {
    pub product: Option<ProductId>,
    pub available: Option<bool>,
    pub consumed_by: Option<ActionId>,
}

impl KeyFilter {
    /// The keys a claim for `product` may take.
    pub fn available_for(product: ProductId) -> Self {
        Self {
            product: Some(product),
            available: Some(true),
            consumed_by: None,
        }
    }

    pub fn of_product(product: ProductId) -> Self {
        Self {
            product: Some(product),
            ..Self::default()
        }
    }

    pub fn held_by(action: ActionId) -> Self {
        Self {
            consumed_by: Some(action),
            ..Self::default()
        }
    }
}
