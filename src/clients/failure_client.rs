use crate::failure_actor::{FailureAction, FailureLogError};
use crate::model::{DeliveryFailure, DeliveryFailureCreate, DeliveryFailureId};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::instrument;

/// Client for the delivery failure log.
#[derive(Clone)]
pub struct FailureLogClient {
    inner: ResourceClient<DeliveryFailure>,
}

impl FailureLogClient {
    pub fn new(inner: ResourceClient<DeliveryFailure>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, failure), fields(action = %failure.action))]
    pub async fn record(
        &self,
        failure: DeliveryFailureCreate,
    ) -> Result<DeliveryFailure, FailureLogError> {
        self.inner.create(failure).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, id: DeliveryFailureId) -> Result<DeliveryFailure, FailureLogError> {
        self.inner
            .perform_action(id, FailureAction::Resolve)
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<DeliveryFailure> for FailureLogClient {
    type Error = FailureLogError;

    fn inner(&self) -> &ResourceClient<DeliveryFailure> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => FailureLogError::NotFound(id),
            other => other
                .into_entity_error::<FailureLogError>()
                .unwrap_or_else(|e| FailureLogError::ActorCommunicationError(e.to_string())),
        }
    }
}
