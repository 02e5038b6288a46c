//! # Category Actor
//!
//! Product categories. Names are unique regardless of case.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::CategoryClient;
use crate::model::Category;
use crate::store::{Database, Table};
use actor_framework::{FrameworkError, ResourceActor};

#[derive(Debug, Clone)]
pub enum CategoryAction {}

/// Creates a new Category actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Category>, CategoryClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, CategoryClient::new(generic_client))
}

/// Creates the actor over `db`, loading the records already stored there.
pub fn open(
    buffer_size: usize,
    db: &Database,
) -> Result<(ResourceActor<Category>, CategoryClient), FrameworkError> {
    let (actor, generic_client) =
        ResourceActor::with_persistence(buffer_size, Table::<Category>::new(db))?;
    Ok((actor, CategoryClient::new(generic_client)))
}
