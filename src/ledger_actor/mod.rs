//! # Ledger Actor (Action Ledger)
//!
//! Records purchases and quotes. An [`Action`] and its line items are one entity, so they are
//! stored together or not at all. For a purchase, [`Action::on_create`] claims the keys through
//! the injected [`KeyPoolClient`] before the actor stores the action:
//!
//! ```text
//! ActionCreate ──> from_create_params   line sub-totals, derived total, code
//!              ──> on_create            PURCHASE: one claim batch on the Key actor
//!                                       QUOTE: placeholders, no Key actor traffic
//!              ──> persist              action, line items and key flags in one transaction
//!              ──> store.insert         only reached if the claim and the write committed
//! ```
//!
//! A claim that comes up short fails `on_create`, so neither the action nor any key flag
//! changes. If the write fails after the claim, `on_create_aborted` hands the keys back to the
//! pool, so a committed claim always ends in a stored action.
//!
//! Updates are limited to [`ActionUpdate`](crate::model::ActionUpdate) and never reach the Key
//! actor; deleting an action does not release its keys.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::LedgerClient;
use crate::model::Action;
use crate::store::{Database, LedgerStore};
use actor_framework::{FrameworkError, ResourceActor};

#[derive(Debug, Clone)]
pub enum LedgerAction {}

/// Creates a new ledger actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Action>, LedgerClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, LedgerClient::new(generic_client))
}

/// Creates the actor over `db`, loading the records already stored there.
pub fn open(
    buffer_size: usize,
    db: &Database,
) -> Result<(ResourceActor<Action>, LedgerClient), FrameworkError> {
    let (actor, generic_client) =
        ResourceActor::with_persistence(buffer_size, LedgerStore::new(db))?;
    Ok((actor, LedgerClient::new(generic_client)))
}
