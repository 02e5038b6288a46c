//! Type-safe wrappers around [`ResourceClient`](actor_framework::ResourceClient).
//!
//! Each wrapper translates [`FrameworkError`](actor_framework::FrameworkError) into its actor's
//! own error enum and adds the domain-specific calls (`claim_many`, `find_by_email`, ...).

pub mod category_client;
pub mod failure_client;
pub mod key_client;
pub mod ledger_client;
pub mod payment_client;
pub mod product_client;
pub mod user_client;

pub use category_client::*;
pub use failure_client::*;
pub use key_client::*;
pub use ledger_client::*;
pub use payment_client::*;
pub use product_client::*;
pub use user_client::*;
