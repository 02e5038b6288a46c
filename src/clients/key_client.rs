use crate::key_actor::{KeyAction, KeyError};
use crate::model::{ActionId, Key, KeyCreate, KeyFilter, KeyId, KeyUpdate, ProductId};
use actor_framework::{ActorClient, BatchStep, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

/// Client for the Key Pool.
#[derive(Clone)]
pub struct KeyPoolClient {
    inner: ResourceClient<Key>,
}

impl KeyPoolClient {
    pub fn new(inner: ResourceClient<Key>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params), fields(product = %params.product))]
    pub async fn create_key(&self, params: KeyCreate) -> Result<Key, KeyError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self, update))]
    pub async fn update_key(&self, id: KeyId, update: KeyUpdate) -> Result<Key, KeyError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Number of keys of `product` that a claim could take right now.
    ///
    /// Advisory only: another claim may take them before yours runs.
    pub async fn count_available(&self, product: ProductId) -> Result<usize, KeyError> {
        Ok(self.list(KeyFilter::available_for(product)).await?.len())
    }

    /// Consumes `quantity` keys of each product on behalf of `action`, all or nothing.
    ///
    /// `demand` must hold each product once. Keys are taken in ascending id order. The result
    /// holds one batch of consumed keys per `demand` entry, in the same order. A product with
    /// too few available keys fails the whole claim with [`KeyError::InsufficientStock`] and no
    /// key changes.
    #[instrument(skip(self, demand), fields(products = demand.len()))]
    pub async fn claim_many(
        &self,
        demand: &[(ProductId, u32)],
        action: ActionId,
    ) -> Result<Vec<Vec<Key>>, KeyError> {
        let steps = demand
            .iter()
            .map(|(product, quantity)| BatchStep {
                filter: KeyFilter::available_for(*product),
                limit: *quantity as usize,
                action: KeyAction::Consume { action },
            })
            .collect();

        match self.inner.batch(steps).await {
            Ok(batches) => {
                info!(%action, "Keys claimed");
                Ok(batches
                    .into_iter()
                    .map(|batch| batch.into_iter().map(|(_, key)| key).collect())
                    .collect())
            }
            Err(FrameworkError::Shortfall {
                step,
                requested,
                found,
            }) => match demand.get(step) {
                Some((product, _)) => {
                    warn!(%action, %product, requested, found, "Claim came up short");
                    Err(KeyError::InsufficientStock {
                        product: *product,
                        requested,
                        available: found,
                    })
                }
                None => Err(KeyError::ActorCommunicationError(format!(
                    "claim step {step} out of range"
                ))),
            },
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Returns the `count` keys consumed by `action` to the pool, all or nothing.
    #[instrument(skip(self))]
    pub async fn release(&self, action: ActionId, count: usize) -> Result<Vec<Key>, KeyError> {
        let steps = vec![BatchStep {
            filter: KeyFilter::held_by(action),
            limit: count,
            action: KeyAction::Release { action },
        }];
        let released: Vec<Key> = self
            .inner
            .batch(steps)
            .await
            .map_err(Self::map_error)?
            .into_iter()
            .flatten()
            .map(|(_, key)| key)
            .collect();
        warn!(%action, released = released.len(), "Claimed keys released");
        Ok(released)
    }

    /// Single-product form of [`claim_many`](Self::claim_many).
    pub async fn claim(
        &self,
        product: ProductId,
        quantity: u32,
        action: ActionId,
    ) -> Result<Vec<Key>, KeyError> {
        Ok(self
            .claim_many(&[(product, quantity)], action)
            .await?
            .into_iter()
            .flatten()
            .collect())
    }
}

#[async_trait]
impl ActorClient<Key> for KeyPoolClient {
    type Error = KeyError;

    fn inner(&self) -> &ResourceClient<Key> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => KeyError::NotFound(id),
            other => other
                .into_entity_error::<KeyError>()
                .unwrap_or_else(|e| KeyError::ActorCommunicationError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_framework::mock::MockClient;

    fn key(id: u32, product: u32) -> Key {
        Key {
            id: KeyId(id),
            product: ProductId(product),
            secret: format!("SECRET-{id}"),
            code: format!("P{product}-{id}"),
            available: false,
            consumed_by: Some(ActionId(1)),
        }
    }

    #[tokio::test]
    async fn test_claim_many_groups_keys_per_product() {
        let mut mock = MockClient::<Key>::new();
        mock.expect_batch().return_ok(vec![
            vec![(KeyId(1), key(1, 7)), (KeyId(2), key(2, 7))],
            vec![(KeyId(5), key(5, 8))],
        ]);
        let client = KeyPoolClient::new(mock.client());

        let claimed = client
            .claim_many(&[(ProductId(7), 2), (ProductId(8), 1)], ActionId(1))
            .await
            .unwrap();
        assert_eq!(claimed.len(), 2);
        assert_eq!(claimed[0].iter().map(|k| k.id.0).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(claimed[1][0].id, KeyId(5));
        mock.verify();
    }

    #[tokio::test]
    async fn test_shortfall_names_the_product() {
        let mut mock = MockClient::<Key>::new();
        mock.expect_batch().return_err(FrameworkError::Shortfall {
            step: 1,
            requested: 3,
            found: 2,
        });
        let client = KeyPoolClient::new(mock.client());

        let err = client
            .claim_many(&[(ProductId(7), 1), (ProductId(8), 3)], ActionId(1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            KeyError::InsufficientStock {
                product: ProductId(8),
                requested: 3,
                available: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_release_hands_back_the_keys() {
        let mut mock = MockClient::<Key>::new();
        let mut released = key(3, 7);
        released.available = true;
        released.consumed_by = None;
        mock.expect_batch()
            .return_ok(vec![vec![(KeyId(3), released.clone())]]);
        let client = KeyPoolClient::new(mock.client());

        assert_eq!(client.release(ActionId(1), 1).await.unwrap(), vec![released]);
        mock.verify();
    }
}
