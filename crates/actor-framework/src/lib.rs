//! # Actor Framework
//!
//! Building blocks for type-safe, concurrent actor systems. It implements a
//! **Resource-Oriented Architecture (ROA)** on top of the **Actor Model**: each resource type
//! gets one actor that owns its store and serves a uniform CRUD + Action API.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - business logic and domain models
//! 2. **Runtime Layer** ([`ResourceActor`]) - message processing and concurrency
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - type-safe communication
//!
//! ## Requests
//!
//! | Request | Effect |
//! |---------|--------|
//! | `Create` | id from the actor's counter, `from_create_params`, `on_create`, persist, insert |
//! | `Get` / `List` | clone by id, or every entity for which [`ActorEntity::matches`] holds |
//! | `Update` | `on_update` on a copy, persisted, swapped in only on success |
//! | `Delete` | `on_delete`, persisted removal, then removal |
//! | `Action` | `handle_action` on a copy of one entity, persisted, swapped in |
//! | `Batch` | ordered [`BatchStep`]s, all-or-nothing, persisted in one write |
//!
//! Every write goes through the actor's [`Persistence`] before memory changes. Actors built
//! with [`ResourceActor::new`] use [`Volatile`], which keeps nothing.
//!
//! `Batch` is the framework's transaction. Because an actor handles one message at a time,
//! "select the first `n` matching entities and apply an action to each" runs without any
//! other request observing or changing the store in between, the same guarantee a
//! `SELECT … FOR UPDATE` gives on the selected rows. If a step finds fewer than `limit`
//! entities, or an action fails, every entity the batch touched is restored.
//!
//! ```rust
//! use actor_framework::{ActorEntity, BatchStep, FrameworkError, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Code { id: u32, batch: u8, used: bool }
//! #[derive(Debug)] struct CodeCreate { batch: u8 }
//! #[derive(Debug)] struct CodeUpdate;
//! #[derive(Debug, Clone)] enum CodeAction { Use }
//! #[derive(Debug)] struct Unused(u8);
//! #[derive(Debug, thiserror::Error)] #[error("code error")] struct CodeError;
//!
//! #[async_trait]
//! impl ActorEntity for Code {
//!     type Id = u32; type Create = CodeCreate; type Update = CodeUpdate;
//!     type Action = CodeAction; type ActionResult = (); type Filter = Unused;
//!     type Context = (); type Error = CodeError;
//!
//!     fn from_create_params(id: u32, p: CodeCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, batch: p.batch, used: false })
//!     }
//!     fn matches(&self, filter: &Unused) -> bool { !self.used && self.batch == filter.0 }
//!     async fn on_update(&mut self, _: CodeUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, _: CodeAction, _: &()) -> Result<(), Self::Error> {
//!         self.used = true;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Code>::new(10);
//!     tokio::spawn(actor.run(()));
//!     for batch in [1, 1, 2] {
//!         client.create(CodeCreate { batch }).await.unwrap();
//!     }
//!
//!     // Two from batch 1 and two from batch 2: the second step falls short,
//!     // so the first step is undone as well.
//!     let steps = vec![
//!         BatchStep { filter: Unused(1), limit: 2, action: CodeAction::Use },
//!         BatchStep { filter: Unused(2), limit: 2, action: CodeAction::Use },
//!     ];
//!     let err = client.batch(steps).await.unwrap_err();
//!     assert!(matches!(err, FrameworkError::Shortfall { step: 1, requested: 2, found: 1 }));
//!     assert_eq!(client.list(Unused(1)).await.unwrap().len(), 2);
//! }
//! ```
//!
//! ## Context Injection Pattern
//!
//! Dependencies are injected at **runtime** via `run(context)`, not at construction time.
//! Create every actor first, then start each one with the clients it needs. An entity whose
//! `on_create` calls another actor (a ledger entry claiming keys, say)
//! declares those clients as its `Context`.
//!
//! ## Concurrency Model
//!
//! - Each actor runs in its own Tokio task
//! - Messages are processed **sequentially** within an actor
//! - Multiple actors run in **parallel**
//! - No shared mutable state (message passing only)
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a real `ResourceClient<T>` from queued expectations, so an actor
//! can be tested with its dependencies mocked. See the [`mock`] module.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod persistence;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{BatchResult, BatchStep, ResourceRequest, Response};
pub use persistence::{Persistence, Volatile};
