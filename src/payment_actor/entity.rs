use super::{PaymentMethodAction, PaymentMethodError};
use crate::model::{PaymentMethod, PaymentMethodCreate, PaymentMethodId, PaymentMethodUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;

fn check_label(label: &str) -> Result<String, PaymentMethodError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(PaymentMethodError::ValidationError("label is required".into()));
    }
    Ok(label.to_string())
}

#[async_trait]
impl ActorEntity for PaymentMethod {
    type Id = PaymentMethodId;
    type Create = PaymentMethodCreate;
    type Update = PaymentMethodUpdate;
    type Action = PaymentMethodAction;
    type ActionResult = ();
    type Filter = ();
    type Context = ();
    type Error = PaymentMethodError;

    fn from_create_params(
        id: PaymentMethodId,
        params: PaymentMethodCreate,
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            label: check_label(&params.label)?,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.label.to_lowercase())
    }

    async fn on_update(
        &mut self,
        update: PaymentMethodUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(label) = update.label {
            self.label = check_label(&label)?;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: PaymentMethodAction,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        match action {}
    }
}
