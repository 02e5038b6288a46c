//! [`ActorEntity`] implementation for [`DeliveryFailure`].

use super::{FailureAction, FailureLogError};
use crate::model::{DeliveryFailure, DeliveryFailureCreate, DeliveryFailureFilter, DeliveryFailureId};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl ActorEntity for DeliveryFailure {
    type Id = DeliveryFailureId;
    type Create = DeliveryFailureCreate;
    type Update = ();
    type Action = FailureAction;
    type ActionResult = DeliveryFailure;
    type Filter = DeliveryFailureFilter;
    type Context = ();
    type Error = FailureLogError;

    fn from_create_params(
        id: DeliveryFailureId,
        params: DeliveryFailureCreate,
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            client: params.client,
            action: params.action,
            failed_at: Utc::now(),
            error: params.error,
            attempts: params.attempts,
            payload: params.payload,
            resolved: false,
        })
    }

    fn matches(&self, filter: &DeliveryFailureFilter) -> bool {
        filter.resolved.map_or(true, |resolved| resolved == self.resolved)
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: FailureAction,
        _ctx: &(),
    ) -> Result<DeliveryFailure, Self::Error> {
        match action {
            FailureAction::Resolve => {
                self.resolved = true;
                Ok(self.clone())
            }
        }
    }
}
