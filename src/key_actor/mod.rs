//! # Key Actor (Key Pool)
//!
//! Owns every license key. A key is created available and is consumed once, by
//! [`KeyAction::Consume`], inside a claim batch sent by the ledger while it records a purchase.
//!
//! ## Claims
//!
//! [`KeyPoolClient::claim_many`](crate::clients::KeyPoolClient::claim_many) turns a purchase's
//! demand into one [`BatchStep`](actor_framework::BatchStep) per product: "the first `n`
//! available keys of product `p`, consume them". The actor runs the whole batch as one message,
//! which is the per-product lock: two claims can never select the same key, and a claim that
//! comes up short for any product leaves every key as it was.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Key`]
//! - [`error`] - [`KeyError`]
//! - [`actions`] - [`KeyAction`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::KeyPoolClient;
use crate::model::Key;
use crate::store::{Database, KeyStore};
use actor_framework::{FrameworkError, ResourceActor};

/// Creates the actor over `db`, loading the records already stored there.
pub fn open(
    buffer_size: usize,
    db: &Database,
) -> Result<(ResourceActor<Key>, KeyPoolClient), FrameworkError> {
    let (actor, generic_client) =
        ResourceActor::with_persistence(buffer_size, KeyStore::new(db))?;
    Ok((actor, KeyPoolClient::new(generic_client)))
}
