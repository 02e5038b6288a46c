//! [`ActorEntity`] implementation for [`Key`].

use super::{KeyAction, KeyError};
use crate::clients::ProductClient;
use crate::model::{Key, KeyCreate, KeyFilter, KeyId, KeyUpdate};
use actor_framework::{ActorClient, ActorEntity};
use async_trait::async_trait;

fn check_secret(secret: &str) -> Result<String, KeyError> {
    let secret = secret.trim();
    if secret.is_empty() {
        return Err(KeyError::ValidationError("secret is required".into()));
    }
    Ok(secret.to_string())
}

#[async_trait]
impl ActorEntity for Key {
    type Id = KeyId;
    type Create = KeyCreate;
    type Update = KeyUpdate;
    type Action = KeyAction;
    type ActionResult = Key;
    type Filter = KeyFilter;
    type Context = ProductClient;
    type Error = KeyError;

    fn from_create_params(id: KeyId, params: KeyCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            product: params.product,
            secret: check_secret(&params.secret)?,
            code: String::new(),
            available: true,
            consumed_by: None,
        })
    }

    fn matches(&self, filter: &KeyFilter) -> bool {
        filter.product.map_or(true, |product| product == self.product)
            && filter.available.map_or(true, |available| available == self.available)
            && filter
                .consumed_by
                .map_or(true, |action| Some(action) == self.consumed_by)
    }

    /// Checks the product exists and derives the code from its name.
    async fn on_create(&mut self, products: &ProductClient) -> Result<(), Self::Error> {
        let product = products
            .get(self.product)
            .await
            .map_err(|e| KeyError::ActorCommunicationError(e.to_string()))?
            .ok_or_else(|| KeyError::UnknownProduct(self.product.to_string()))?;
        self.code = format!("{}-{}", product.name, self.id.0);
        Ok(())
    }

    async fn on_update(
        &mut self,
        update: KeyUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if !self.available {
            return Err(KeyError::AlreadyConsumed(self.id.to_string()));
        }
        if let Some(secret) = update.secret {
            self.secret = check_secret(&secret)?;
        }
        Ok(())
    }

    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        if !self.available {
            return Err(KeyError::AlreadyConsumed(self.id.to_string()));
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: KeyAction,
        _ctx: &Self::Context,
    ) -> Result<Key, Self::Error> {
        match action {
            KeyAction::Consume { action } => {
                if !self.available {
                    return Err(KeyError::AlreadyConsumed(self.id.to_string()));
                }
                self.available = false;
                self.consumed_by = Some(action);
                Ok(self.clone())
            }
            KeyAction::Release { action } => {
                if self.consumed_by != Some(action) {
                    return Err(KeyError::NotHeldBy {
                        key: self.id.to_string(),
                        action: action.to_string(),
                    });
                }
                self.available = true;
                self.consumed_by = None;
                Ok(self.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActionId, ProductId};
    use actor_framework::mock::MockClient;

    fn key() -> Key {
        Key::from_create_params(
            KeyId(4),
            KeyCreate {
                product: ProductId(1),
                secret: " AAAA-BBBB ".into(),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_consume_is_one_way() {
        let products = ProductClient::new(MockClient::new().client());
        let mut key = key();
        assert_eq!(key.secret, "AAAA-BBBB");

        let consumed = key
            .handle_action(KeyAction::Consume { action: ActionId(9) }, &products)
            .await
            .unwrap();
        assert!(!consumed.available);
        assert_eq!(consumed.consumed_by, Some(ActionId(9)));

        let again = key
            .handle_action(KeyAction::Consume { action: ActionId(10) }, &products)
            .await;
        assert_eq!(again, Err(KeyError::AlreadyConsumed("key_4".into())));
        assert_eq!(key.consumed_by, Some(ActionId(9)));
    }

    #[tokio::test]
    async fn test_release_only_by_the_holding_action() {
        let products = ProductClient::new(MockClient::new().client());
        let mut key = key();
        key.handle_action(KeyAction::Consume { action: ActionId(9) }, &products)
            .await
            .unwrap();

        let err = key
            .handle_action(KeyAction::Release { action: ActionId(8) }, &products)
            .await
            .unwrap_err();
        assert!(matches!(err, KeyError::NotHeldBy { .. }));
        assert!(!key.available);

        let released = key
            .handle_action(KeyAction::Release { action: ActionId(9) }, &products)
            .await
            .unwrap();
        assert!(released.available);
        assert_eq!(released.consumed_by, None);
    }

    #[tokio::test]
    async fn test_consumed_key_is_frozen() {
        let products = ProductClient::new(MockClient::new().client());
        let mut key = key();
        key.available = false;

        let update = KeyUpdate {
            secret: Some("CCCC".into()),
        };
        assert!(key.on_update(update, &products).await.is_err());
        assert!(key.on_delete(&products).await.is_err());
    }

    #[test]
    fn test_filter_by_product_and_availability() {
        let key = key();
        assert!(key.matches(&KeyFilter::available_for(ProductId(1))));
        assert!(!key.matches(&KeyFilter::available_for(ProductId(2))));
        assert!(!key.matches(&KeyFilter {
            available: Some(false),
            ..KeyFilter::default()
        }));
        assert!(!key.matches(&KeyFilter::held_by(ActionId(3))));
        assert!(key.matches(&KeyFilter::default()));
    }
}
