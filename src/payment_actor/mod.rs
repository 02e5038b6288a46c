//! # Payment Method Actor
//!
//! Payment-method labels referenced by actions. Labels are unique regardless of case.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::PaymentMethodClient;
use crate::model::PaymentMethod;
use crate::store::{Database, Table};
use actor_framework::{FrameworkError, ResourceActor};

#[derive(Debug, Clone)]
pub enum PaymentMethodAction {}

/// Creates the actor over `db`, loading the records already stored there.
pub fn open(
    buffer_size: usize,
    db: &Database,
) -> Result<(ResourceActor<PaymentMethod>, PaymentMethodClient), FrameworkError> {
    let (actor, generic_client) =
        ResourceActor::with_persistence(buffer_size, Table::<PaymentMethod>::new(db))?;
    Ok((actor, PaymentMethodClient::new(generic_client)))
}
