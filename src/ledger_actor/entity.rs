//! [`ActorEntity`] implementation for [`Action`].

use super::{ActionError, LedgerAction};
use crate::clients::KeyPoolClient;
use crate::model::{
    Action, ActionCreate, ActionFilter, ActionId, ActionKind, ActionUpdate, Allocation,
    AllocationEntry, LineItem, MAX_LINE_QUANTITY,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::iter;
use tracing::{debug, warn};

impl Action {
    /// Claims the purchase's keys and records them per product name.
    async fn allocate_keys(&mut self, keys: &KeyPoolClient) -> Result<(), ActionError> {
        let demand = self.demand();
        let claimed = keys.claim_many(&demand, self.id).await?;

        let mut allocation = Allocation::new();
        for ((product, _), batch) in demand.iter().zip(claimed) {
            let Some(line) = self.lines.iter().find(|line| line.product == *product) else {
                continue;
            };
            let validity = line.validity;
            allocation
                .entry(line.product_name.clone())
                .or_default()
                .extend(batch.into_iter().map(|key| AllocationEntry {
                    key_id: Some(key.id),
                    secret_payload: key.secret,
                    display_code: key.code,
                    validity_label: validity,
                }));
        }
        self.allocation = allocation;
        Ok(())
    }

    /// Reserves one placeholder per requested unit. Touches no key.
    fn allocate_placeholders(&mut self) {
        let mut allocation = Allocation::new();
        for line in &self.lines {
            allocation
                .entry(line.product_name.clone())
                .or_default()
                .extend(
                    iter::repeat(AllocationEntry::placeholder(line.validity))
                        .take(line.quantity as usize),
                );
        }
        self.allocation = allocation;
    }
}

#[async_trait]
impl ActorEntity for Action {
    type Id = ActionId;
    type Create = ActionCreate;
    type Update = ActionUpdate;
    type Action = LedgerAction;
    type ActionResult = ();
    type Filter = ActionFilter;
    type Context = KeyPoolClient;
    type Error = ActionError;

    /// Builds the line items and derives every price from the catalog unit prices.
    fn from_create_params(id: ActionId, params: ActionCreate) -> Result<Self, Self::Error> {
        if params.lines.is_empty() {
            return Err(ActionError::ValidationError(
                "at least one product is required".into(),
            ));
        }
        if let Some(line) = params
            .lines
            .iter()
            .find(|line| line.quantity == 0 || line.quantity > MAX_LINE_QUANTITY)
        {
            return Err(ActionError::ValidationError(format!(
                "quantity for {} must be between 1 and {MAX_LINE_QUANTITY}",
                line.product_name
            )));
        }

        let lines = params
            .lines
            .into_iter()
            .map(|draft| {
                let sub_total = draft
                    .unit_price
                    .checked_mul(Decimal::from(draft.quantity))
                    .ok_or_else(|| {
                        ActionError::ValidationError(format!(
                            "price of {} overflows",
                            draft.product_name
                        ))
                    })?;
                Ok(LineItem {
                    sub_total,
                    product: draft.product,
                    product_name: draft.product_name,
                    quantity: draft.quantity,
                    unit_price: draft.unit_price,
                    validity: draft.validity,
                })
            })
            .collect::<Result<Vec<LineItem>, ActionError>>()?;
        let total_price = lines
            .iter()
            .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.sub_total))
            .ok_or_else(|| ActionError::ValidationError("total price overflows".into()))?;

        Ok(Self {
            id,
            kind: params.kind,
            code: format!("{}-{}", params.kind.label(), id.0),
            total_price,
            agreed_price: None,
            created_at: Utc::now(),
            client: params.client,
            seller: params.seller,
            payment_method: params.payment_method,
            delivered: false,
            paid: false,
            lines,
            allocation: Allocation::new(),
        })
    }

    fn matches(&self, filter: &ActionFilter) -> bool {
        filter.kind.map_or(true, |kind| kind == self.kind)
            && filter.client.map_or(true, |client| client == self.client)
            && filter.seller.map_or(true, |seller| Some(seller) == self.seller)
    }

    async fn on_create(&mut self, keys: &KeyPoolClient) -> Result<(), Self::Error> {
        match self.kind {
            ActionKind::Purchase => self.allocate_keys(keys).await,
            ActionKind::Quote => {
                debug!(action_id = %self.id, "Quote: no keys claimed");
                self.allocate_placeholders();
                Ok(())
            }
        }
    }

    /// The action could not be written, so its claim must not stand either.
    async fn on_create_aborted(&self, keys: &KeyPoolClient) -> Result<(), Self::Error> {
        let claimed = self.key_ids().len();
        if claimed == 0 {
            return Ok(());
        }
        warn!(action_id = %self.id, claimed, "Releasing keys of an unstored action");
        keys.release(self.id, claimed).await?;
        Ok(())
    }

    async fn on_update(
        &mut self,
        update: ActionUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(delivered) = update.delivered {
            self.delivered = delivered;
        }
        if let Some(paid) = update.paid {
            self.paid = paid;
        }
        if let Some(price) = update.agreed_price {
            if price < Decimal::ZERO {
                return Err(ActionError::ValidationError(
                    "agreed price must not be negative".into(),
                ));
            }
            self.agreed_price = Some(price);
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: LedgerAction,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        match action {}
    }
}
