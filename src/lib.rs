//! # Keyshop
//!
//! > **A license-key shop built from resource-oriented actors.**
//!
//! Staff record purchases and quotes for clients. A purchase hands out one redeemable key per
//! unit sold, drawn from a pool that never gives the same key twice. The invoice then goes out
//! by mail in the background.
//!
//! ## Architecture
//!
//! Every store is a [`ResourceActor`](actor_framework::ResourceActor) from the
//! `actor-framework` crate: one Tokio task owning its records, processing messages one at a
//! time. Services compose the actors:
//!
//! ```text
//!  HTTP (axum) ──> Allocator ──> Catalog ──> Product actor ──> Category actor
//!       │              │
//!       │              └──> Ledger actor ──claim──> Key actor
//!       │              └──> Notifier ──> workers ──> Mailer
//!       │                                   └──> Delivery failure actor
//!       └──> TokenService ──> User actor
//! ```
//!
//! ### Key allocation
//! Recording a purchase and consuming its keys is one step: the ledger actor claims the keys
//! while creating the action, and the Key actor applies a claim all-or-nothing. Either every
//! line gets its keys and the action exists, or nothing changed. On disk the action row and the
//! consumed key flags are written in one SQLite transaction. See [`ledger_actor`],
//! [`allocator`] and [`store`].
//!
//! ### Roles
//! [`Role`](model::Role) is a closed enum. Clients read their own actions; staff (`vendeur`,
//! `admin`) record actions and manage the catalog; only admins manage accounts and read the
//! dashboard.
//!
//! ## Module Tour
//!
//! - [`model`]: records, payloads and filters.
//! - [`user_actor`], [`category_actor`], [`product_actor`], [`payment_actor`], [`key_actor`],
//!   [`ledger_actor`], [`failure_actor`]: the `ActorEntity` implementations.
//! - [`clients`]: typed wrappers over `ResourceClient`.
//! - [`catalog`], [`allocator`], [`notify`], [`auth`], [`stats`]: services.
//! - [`lifecycle`]: starts, wires and stops everything ([`ShopSystem`](lifecycle::ShopSystem)).
//! - [`http`]: the REST surface.
//! - [`store`]: the SQLite tables every actor writes through to.
//! - [`config`]: `KEYSHOP_*` environment settings.
//!
//! ## Running
//!
//! ```bash
//! KEYSHOP_DATABASE=shop.db KEYSHOP_ADMIN_EMAIL=root@shop.mg KEYSHOP_ADMIN_PASSWORD=secret \
//!     RUST_LOG=info cargo run
//! ```

pub mod allocator;
pub mod auth;
pub mod catalog;
pub mod category_actor;
pub mod clients;
pub mod config;
pub mod failure_actor;
pub mod http;
pub mod key_actor;
pub mod ledger_actor;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod payment_actor;
pub mod product_actor;
pub mod stats;
pub mod store;
pub mod user_actor;
