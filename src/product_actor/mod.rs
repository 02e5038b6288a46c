//! # Product Actor
//!
//! The catalog's products. Creation and renames resolve the category through the injected
//! [`CategoryClient`] to build the product code; an unknown category rejects the write.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Product`]
//! - [`error`] - [`ProductError`]
//! - [`new()`] - Factory function that creates the actor and client
//!
//! ```rust
//! use keyshop::{category_actor, product_actor};
//! use keyshop::model::{CategoryCreate, ProductCreate, Validity};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (category_actor, categories) = category_actor::new(8);
//!     let (product_actor, products) = product_actor::new(8);
//!     tokio::spawn(category_actor.run(()));
//!     tokio::spawn(product_actor.run(categories.clone()));
//!
//!     let office = categories
//!         .create_category(CategoryCreate { name: "Office".into(), description: String::new() })
//!         .await?;
//!     let product = products
//!         .create_product(ProductCreate {
//!             category: office.id,
//!             name: "Suite".into(),
//!             description: String::new(),
//!             validity: Validity::Lifetime,
//!             price_min: Decimal::from(900),
//!             price: Decimal::from(1000),
//!             price_max: Decimal::from(1200),
//!         })
//!         .await?;
//!     assert_eq!(product.code, "Office-Suite-1");
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::ProductClient;
use crate::model::Product;
use crate::store::{Database, Table};
use actor_framework::{FrameworkError, ResourceActor};

#[derive(Debug, Clone)]
pub enum ProductAction {}

/// Creates a new Product actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Product>, ProductClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, ProductClient::new(generic_client))
}

/// Creates the actor over `db`, loading the records already stored there.
pub fn open(
    buffer_size: usize,
    db: &Database,
) -> Result<(ResourceActor<Product>, ProductClient), FrameworkError> {
    let (actor, generic_client) =
        ResourceActor::with_persistence(buffer_size, Table::<Product>::new(db))?;
    Ok((actor, ProductClient::new(generic_client)))
}
