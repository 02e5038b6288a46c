//! # ActorEntity Trait
//!
//! The `ActorEntity` trait defines the contract that every resource (User, Product, Key, Action, …)
//! must implement to be managed by the generic `ResourceActor`. It specifies associated types for
//! IDs, DTOs, actions, list filters, context, and errors, and provides lifecycle hooks
//! (`on_create`, `on_update`, `on_delete`, `handle_action`).
//!
//! # Provided Methods (Hooks)
//! This trait includes **Provided Methods** (methods with default implementations):
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_create_aborted`]
//! - [`ActorEntity::on_delete`]
//! - [`ActorEntity::matches`] (every entity matches every filter)
//! - [`ActorEntity::unique_key`] (no uniqueness constraint)
//!
//! You do **not** need to implement these methods unless you want to customize behavior.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// This trait is `#[async_trait]` to allow asynchronous operations in hooks (e.g., calling other
/// actors). It also defines a `Context` type, which is injected into every hook. This allows
/// "Late Binding" of dependencies (passing clients to `run()` instead of `new()`).
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    /// Must be convertible from u32 for automatic ID generation, and ordered so that
    /// listing and batch selection walk the store in ascending id order.
    type Id: Ord + Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance (DTO - Data Transfer Object).
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g., `Consume`).
    /// Cloned once per entity when applied through a batch.
    type Action: Send + Sync + Debug + Clone;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// Predicate used by `List` and `Batch` requests to select entities.
    type Filter: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One enum per actor rather than one per message. Clients recover it from
    /// [`FrameworkError::EntityError`](crate::FrameworkError::EntityError) with
    /// [`FrameworkError::into_entity_error`](crate::FrameworkError::into_entity_error).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Returns true when this entity is selected by `filter`.
    fn matches(&self, _filter: &Self::Filter) -> bool {
        true
    }

    /// A value that must be unique across the store (an email, a label).
    /// Creates and updates that would collide are rejected with `FrameworkError::Conflict`.
    fn unique_key(&self) -> Option<String> {
        None
    }

    // --- Lifecycle Hooks (Async) ---

    /// Called after `from_create_params` and before the entity is inserted.
    /// An error here means the entity is never stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an entity that passed `on_create` could not be persisted and so was never
    /// stored. Undo here whatever `on_create` did in other actors.
    async fn on_create_aborted(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the system.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
