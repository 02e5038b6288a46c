//! # User Actor
//!
//! Manages registered accounts. No dependencies and no custom actions; emails are unique
//! (enforced by the actor through [`ActorEntity::unique_key`](actor_framework::ActorEntity::unique_key)).
//!
//! ## Usage
//!
//! ```rust
//! use keyshop::user_actor;
//! use keyshop::model::{AccountType, CompanyNumbers, Role, UserCreate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = user_actor::new(8);
//!     tokio::spawn(actor.run(()));
//!
//!     let user = client
//!         .create_user(UserCreate {
//!             email: "hery@shop.mg".into(),
//!             full_name: "Hery".into(),
//!             role: Role::Client,
//!             account_type: AccountType::Individual,
//!             phone: String::new(),
//!             address: String::new(),
//!             company: CompanyNumbers::default(),
//!             password_hash: String::new(),
//!         })
//!         .await?;
//!     assert_eq!(user.code, "client-1");
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::UserClient;
use crate::model::User;
use crate::store::{Database, Table};
use actor_framework::{FrameworkError, ResourceActor};

/// Users have no custom actions.
#[derive(Debug, Clone)]
pub enum UserAction {}

/// Creates a new User actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<User>, UserClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, UserClient::new(generic_client))
}

/// Creates the actor over `db`, loading the records already stored there.
pub fn open(
    buffer_size: usize,
    db: &Database,
) -> Result<(ResourceActor<User>, UserClient), FrameworkError> {
    let (actor, generic_client) =
        ResourceActor::with_persistence(buffer_size, Table::<User>::new(db))?;
    Ok((actor, UserClient::new(generic_client)))
}
