//! Pure data structures (DTOs) implementing the [`ActorEntity`](actor_framework::ActorEntity) trait.
//!
//! Every stored record is identified by a `u32` newtype generated with `entity_id!`, serialized
//! as a bare number and displayed with a prefix in logs (`key_12`, `action_4`).

/// Declares `<Entity>Id`, the type-safe identifier of a stored record.
macro_rules! entity_id {
    ($entity:ident, $prefix:literal) => {
        paste::paste! {
            #[doc = concat!("Type-safe identifier for [`", stringify!($entity), "`] records.")]
            #[derive(
                Debug,
                Clone,
                Copy,
                PartialEq,
                Eq,
                PartialOrd,
                Ord,
                Hash,
                ::serde::Serialize,
                ::serde::Deserialize,
            )]
            #[serde(transparent)]
            pub struct [<$entity Id>](pub u32);

            impl From<u32> for [<$entity Id>] {
                fn from(id: u32) -> Self {
                    Self(id)
                }
            }

            impl From<[<$entity Id>]> for u32 {
                fn from(id: [<$entity Id>]) -> Self {
                    id.0
                }
            }

            impl std::fmt::Display for [<$entity Id>] {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, concat!($prefix, "_{}"), self.0)
                }
            }
        }
    };
}

pub mod action;
pub mod category;
pub mod failure;
pub mod key;
pub mod payment_method;
pub mod product;
pub mod user;

pub use action::*;
pub use category::*;
pub use failure::*;
pub use key::*;
pub use payment_method::*;
pub use product::*;
pub use user::*;
