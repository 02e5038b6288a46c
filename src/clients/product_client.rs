use crate::model::{Product, ProductCreate, ProductFilter, ProductId, ProductUpdate};
use crate::product_actor::ProductError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Resolves `ids` from one snapshot of the catalog.
    ///
    /// Returns the products found and, separately, every id that matched nothing.
    #[instrument(skip(self))]
    pub async fn find_many(
        &self,
        ids: &[ProductId],
    ) -> Result<(BTreeMap<ProductId, Product>, Vec<ProductId>), ProductError> {
        let mut catalog: BTreeMap<ProductId, Product> = self
            .list(ProductFilter::default())
            .await?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let mut found = BTreeMap::new();
        let mut missing = Vec::new();
        for id in ids {
            if found.contains_key(id) {
                continue;
            }
            match catalog.remove(id) {
                Some(product) => {
                    found.insert(*id, product);
                }
                None if !missing.contains(id) => missing.push(*id),
                None => {}
            }
        }
        Ok((found, missing))
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            other => other
                .into_entity_error::<ProductError>()
                .unwrap_or_else(|e| ProductError::ActorCommunicationError(e.to_string())),
        }
    }
}
