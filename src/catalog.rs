//! # Catalog Store
//!
//! Read access to products for the allocator, plus the delete rules that span actors: a category
//! is removable only while no product uses it, a product only while it owns no key.
//!
//! The checks live here rather than in the entities' `on_delete` hooks so that no two actors hold
//! each other's clients (Product already depends on Category, Key on Product).

use crate::category_actor::CategoryError;
use crate::clients::{CategoryClient, KeyPoolClient, ProductClient};
use crate::model::{CategoryId, KeyFilter, Product, ProductFilter, ProductId};
use crate::product_actor::ProductError;
use actor_framework::ActorClient;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// Every requested id that matched no product.
    #[error("Unknown products: {}", join_ids(.0))]
    ProductNotFound(Vec<ProductId>),

    #[error("Catalog store error: {0}")]
    Store(String),
}

impl From<String> for CatalogError {
    fn from(msg: String) -> Self {
        CatalogError::Store(msg)
    }
}

impl From<ProductError> for CatalogError {
    fn from(err: ProductError) -> Self {
        CatalogError::Store(err.to_string())
    }
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(|id| id.0.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone)]
pub struct Catalog {
    pub categories: CategoryClient,
    pub products: ProductClient,
    keys: KeyPoolClient,
}

impl Catalog {
    pub fn new(categories: CategoryClient, products: ProductClient, keys: KeyPoolClient) -> Self {
        Self {
            categories,
            products,
            keys,
        }
    }

    /// Resolves every id or fails naming all the absent ones.
    #[instrument(skip(self))]
    pub async fn get_many(
        &self,
        ids: &[ProductId],
    ) -> Result<BTreeMap<ProductId, Product>, CatalogError> {
        let (found, missing) = self.products.find_many(ids).await?;
        if !missing.is_empty() {
            return Err(CatalogError::ProductNotFound(missing));
        }
        Ok(found)
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), CategoryError> {
        let filter = ProductFilter { category: Some(id) };
        let in_use = !self
            .products
            .list(filter)
            .await
            .map_err(|e| CategoryError::ActorCommunicationError(e.to_string()))?
            .is_empty();
        if in_use {
            return Err(CategoryError::InUse(id.to_string()));
        }
        self.categories.delete(id).await?;
        info!(category_id = %id, "Category deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ProductError> {
        let filter = KeyFilter::of_product(id);
        let in_use = !self
            .keys
            .list(filter)
            .await
            .map_err(|e| ProductError::ActorCommunicationError(e.to_string()))?
            .is_empty();
        if in_use {
            return Err(ProductError::InUse(id.to_string()));
        }
        self.products.delete(id).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
