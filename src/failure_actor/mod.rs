//! # Failure Actor (Delivery Failure Log)
//!
//! Durable record of notifications that exhausted their retries. The dispatcher writes one
//! [`DeliveryFailure`] per abandoned notification; staff list them and mark them resolved once
//! the keys have been re-sent by hand.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::FailureLogClient;
use crate::model::DeliveryFailure;
use crate::store::{Database, Table};
use actor_framework::{FrameworkError, ResourceActor};

#[derive(Debug, Clone)]
pub enum FailureAction {
    /// Marks the failure handled. Idempotent.
    Resolve,
}

/// Creates the actor over `db`, loading the records already stored there.
pub fn open(
    buffer_size: usize,
    db: &Database,
) -> Result<(ResourceActor<DeliveryFailure>, FailureLogClient), FrameworkError> {
    let (actor, generic_client) =
        ResourceActor::with_persistence(buffer_size, Table::<DeliveryFailure>::new(db))?;
    Ok((actor, FailureLogClient::new(generic_client)))
}
