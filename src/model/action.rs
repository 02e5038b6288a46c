//! Purchase and quote records held by the Action Ledger.
use crate::model::{KeyId, PaymentMethodId, ProductId, UserId, Validity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

entity_id!(Action, "action");

/// Secret placeholder recorded for every unit of a quote.
pub const QUOTE_PLACEHOLDER: &str = "to be assigned at purchase";

/// Display code of a quote placeholder.
pub const QUOTE_PLACEHOLDER_CODE: &str = "N/A";

/// Largest quantity a single line may request.
pub const MAX_LINE_QUANTITY: u32 = 1_000;

/// Largest number of lines in one action.
pub const MAX_LINES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "ACHAT")]
    Purchase,
    #[serde(rename = "DEVIS")]
    Quote,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Purchase => "ACHAT",
            ActionKind::Quote => "DEVIS",
        }
    }

    /// Case-insensitive; accepts the wire labels and their English names.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "ACHAT" | "PURCHASE" => Some(ActionKind::Purchase),
            "DEVIS" | "QUOTE" => Some(ActionKind::Quote),
            _ => None,
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One product-quantity entry of an action. Written with its parent and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub product: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub sub_total: Decimal,
    pub validity: Validity,
}

/// One allocated key, or one quote placeholder when `key_id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub key_id: Option<KeyId>,
    pub secret_payload: String,
    pub display_code: String,
    pub validity_label: Validity,
}

impl AllocationEntry {
    pub fn placeholder(validity: Validity) -> Self {
        Self {
            key_id: None,
            secret_payload: QUOTE_PLACEHOLDER.to_string(),
            display_code: QUOTE_PLACEHOLDER_CODE.to_string(),
            validity_label: validity,
        }
    }
}

/// Product name to the entries allocated for it, in claim order.
pub type Allocation = BTreeMap<String, Vec<AllocationEntry>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub id: ActionId,
    pub kind: ActionKind,
    /// `"{KIND}-{id}"`.
    pub code: String,
    /// Always the sum of the line sub-totals.
    pub total_price: Decimal,
    /// Price agreed by staff after the fact, if any. Never replaces `total_price`.
    pub agreed_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub client: UserId,
    pub seller: Option<UserId>,
    pub payment_method: PaymentMethodId,
    pub delivered: bool,
    pub paid: bool,
    pub lines: Vec<LineItem>,
    pub allocation: Allocation,
}

impl Action {
    /// Total quantity requested per product, in first-seen order.
    pub fn demand(&self) -> Vec<(ProductId, u32)> {
        let mut demand: Vec<(ProductId, u32)> = Vec::new();
        for line in &self.lines {
            match demand.iter_mut().find(|(product, _)| *product == line.product) {
                Some((_, quantity)) => *quantity += line.quantity,
                None => demand.push((line.product, line.quantity)),
            }
        }
        demand
    }

    /// Ids of every key this action consumed.
    pub fn key_ids(&self) -> Vec<KeyId> {
        self.allocation
            .values()
            .flatten()
            .filter_map(|entry| entry.key_id)
            .collect()
    }
}

/// A line request whose product has already been resolved against the catalog.
#[derive(Debug, Clone)]
pub struct LineDraft {
    pub product: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub validity: Validity,
    pub quantity: u32,
}

/// Payload for recording an action. Prices come from the catalog, never from the caller.
#[derive(Debug, Clone)]
pub struct ActionCreate {
    pub kind: ActionKind,
    pub client: UserId,
    pub seller: Option<UserId>,
    pub payment_method: PaymentMethodId,
    pub lines: Vec<LineDraft>,
}

/// Staff-editable fields. Nothing here touches keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionUpdate {
    pub delivered: Option<bool>,
    pub paid: Option<bool>,
    pub agreed_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionFilter {
    pub kind: Option<ActionKind>,
    pub client: Option<UserId>,
    pub seller: Option<UserId>,
}
