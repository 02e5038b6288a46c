use crate::ledger_actor::ActionError;
use crate::model::{Action, ActionCreate, ActionId, ActionUpdate};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the Action Ledger.
///
/// Recording a purchase claims its keys inside the ledger actor (see
/// [`ledger_actor`](crate::ledger_actor)); this client only carries the request.
#[derive(Clone)]
pub struct LedgerClient {
    inner: ResourceClient<Action>,
}

impl LedgerClient {
    pub fn new(inner: ResourceClient<Action>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, action), fields(kind = %action.kind, client = %action.client))]
    pub async fn record(&self, action: ActionCreate) -> Result<Action, ActionError> {
        debug!("Sending request");
        self.inner.create(action).await.map_err(Self::map_error)
    }

    #[instrument(skip(self, update))]
    pub async fn update_action(
        &self,
        id: ActionId,
        update: ActionUpdate,
    ) -> Result<Action, ActionError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Action> for LedgerClient {
    type Error = ActionError;

    fn inner(&self) -> &ResourceClient<Action> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => ActionError::NotFound(id),
            other => other
                .into_entity_error::<ActionError>()
                .unwrap_or_else(|e| ActionError::ActorCommunicationError(e.to_string())),
        }
    }
}
