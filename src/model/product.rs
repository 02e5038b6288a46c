//! Products in the catalog.
//!
//! The allocator only reads products. It needs the name (allocations are grouped by it), the
//! unit price and the validity label copied into every allocation entry.
use crate::model::CategoryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

entity_id!(Product, "product");

/// How long a key for this product stays valid once redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Validity {
    #[default]
    #[serde(rename = "1 year")]
    OneYear,
    #[serde(rename = "2 years")]
    TwoYears,
    #[serde(rename = "3 years")]
    ThreeYears,
    #[serde(rename = "lifetime")]
    Lifetime,
}

impl Validity {
    pub fn label(&self) -> &'static str {
        match self {
            Validity::OneYear => "1 year",
            Validity::TwoYears => "2 years",
            Validity::ThreeYears => "3 years",
            Validity::Lifetime => "lifetime",
        }
    }
}

impl Display for Validity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub category: CategoryId,
    pub name: String,
    pub description: String,
    pub validity: Validity,
    pub price_min: Decimal,
    pub price: Decimal,
    pub price_max: Decimal,
    /// `"{category name}-{name}-{id}"`, filled in once the category is resolved.
    pub code: String,
}

impl Product {
    /// Price bounds must bracket the list price.
    pub fn price_in_range(&self) -> bool {
        self.price_min <= self.price && self.price <= self.price_max
    }
}

/// DTO for Product creation.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub category: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub validity: Validity,
    pub price_min: Decimal,
    pub price: Decimal,
    pub price_max: Decimal,
}

/// DTO for Product updates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub category: Option<CategoryId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub validity: Option<Validity>,
    pub price_min: Option<Decimal>,
    pub price: Option<Decimal>,
    pub price_max: Option<Decimal>,
}

/// Selects products for listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
}
