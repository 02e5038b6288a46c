//! # Persistence
//!
//! A [`ResourceActor`](crate::ResourceActor) serves every read from its in-memory store. Given a
//! [`Persistence`] it also writes each mutation through it, and only commits the mutation to
//! memory once the write succeeded. A failed write leaves memory untouched and answers
//! [`FrameworkError::Storage`](crate::FrameworkError::Storage).
//!
//! The store is read back once, in
//! [`ResourceActor::with_persistence`](crate::ResourceActor::with_persistence).

use crate::entity::ActorEntity;

/// Durable backing for one entity type.
///
/// Calls are synchronous and made from the actor's task, one at a time. Errors are plain
/// messages; the actor wraps them in `FrameworkError::Storage`.
pub trait Persistence<T: ActorEntity>: Send + Sync + 'static {
    /// Every stored entity with its raw id.
    fn load(&self) -> Result<Vec<(u32, T)>, String>;

    /// Writes an entity that passed `on_create`.
    fn insert(&self, id: &T::Id, item: &T) -> Result<(), String>;

    /// Writes the new state of an updated entity, or of one changed by an action.
    fn update(&self, id: &T::Id, item: &T) -> Result<(), String>;

    /// Writes every entity a batch changed. Either all writes land or none does.
    ///
    /// The default writes one at a time and is only all-or-nothing for backends that cannot
    /// fail half way.
    fn update_all(&self, items: &[(T::Id, T)]) -> Result<(), String> {
        items.iter().try_for_each(|(id, item)| self.update(id, item))
    }

    fn remove(&self, id: &T::Id) -> Result<(), String>;
}

/// No backing at all: the store lives and dies with the actor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Volatile;

impl<T: ActorEntity> Persistence<T> for Volatile {
    fn load(&self) -> Result<Vec<(u32, T)>, String> {
        Ok(Vec::new())
    }

    fn insert(&self, _id: &T::Id, _item: &T) -> Result<(), String> {
        Ok(())
    }

    fn update(&self, _id: &T::Id, _item: &T) -> Result<(), String> {
        Ok(())
    }

    fn remove(&self, _id: &T::Id) -> Result<(), String> {
        Ok(())
    }
}
