use crate::model::{PaymentMethod, PaymentMethodCreate, PaymentMethodId, PaymentMethodUpdate};
use crate::payment_actor::PaymentMethodError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the PaymentMethod actor.
#[derive(Clone)]
pub struct PaymentMethodClient {
    inner: ResourceClient<PaymentMethod>,
}

impl PaymentMethodClient {
    pub fn new(inner: ResourceClient<PaymentMethod>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_method(
        &self,
        params: PaymentMethodCreate,
    ) -> Result<PaymentMethod, PaymentMethodError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_method(
        &self,
        id: PaymentMethodId,
        update: PaymentMethodUpdate,
    ) -> Result<PaymentMethod, PaymentMethodError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<PaymentMethod> for PaymentMethodClient {
    type Error = PaymentMethodError;

    fn inner(&self) -> &ResourceClient<PaymentMethod> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => PaymentMethodError::NotFound(id),
            FrameworkError::Conflict(label) => PaymentMethodError::AlreadyExists(label),
            other => other
                .into_entity_error::<PaymentMethodError>()
                .unwrap_or_else(|e| PaymentMethodError::ActorCommunicationError(e.to_string())),
        }
    }
}
