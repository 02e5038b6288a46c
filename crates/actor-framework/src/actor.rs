//! # Generic Actor Server
//!
//! This module defines the `ResourceActor`, the core component that manages the lifecycle
//! and state of entities. It implements the "Server" side of the Actor Model, processing
//! messages sequentially and ensuring exclusive access to the entity store.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{BatchResult, BatchStep, ResourceRequest};
use crate::persistence::{Persistence, Volatile};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// The generic actor that manages a collection of entities.
///
/// `ResourceActor<T>` owns the in-memory store for one entity type and processes every
/// `ResourceRequest<T>` sequentially in its own Tokio task. Because only this task touches
/// `store`, no `Mutex` is needed, and a message that reads then writes (a `Batch`, an
/// `on_create` that calls another actor) cannot be interleaved with another message
/// for the same actor.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `ResourceActor::new()` to get the `actor` (server) and `client` (interface).
/// 2.  **Wire**: Pass dependencies (other clients) into `actor.run(context)`.
/// 3.  **Run**: Spawn the actor's run loop in a background task.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Voucher { id: u32, used: bool }
/// #[derive(Debug)] struct VoucherCreate;
/// #[derive(Debug)] struct VoucherUpdate;
/// #[derive(Debug, Clone)] enum VoucherAction { Redeem }
/// #[derive(Debug, thiserror::Error)] #[error("already redeemed")] struct VoucherError;
///
/// #[async_trait]
/// impl ActorEntity for Voucher {
///     type Id = u32;
///     type Create = VoucherCreate;
///     type Update = VoucherUpdate;
///     type Action = VoucherAction;
///     type ActionResult = ();
///     type Filter = ();
///     type Context = ();
///     type Error = VoucherError;
///
///     fn from_create_params(id: u32, _: VoucherCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id, used: false })
///     }
///     async fn on_update(&mut self, _: VoucherUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: VoucherAction, _: &()) -> Result<(), Self::Error> {
///         if self.used { return Err(VoucherError); }
///         self.used = true;
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Voucher>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let voucher = client.create(VoucherCreate).await.unwrap();
///     client.perform_action(voucher.id, VoucherAction::Redeem).await.unwrap();
///     assert!(client.perform_action(voucher.id, VoucherAction::Redeem).await.is_err());
/// }
/// ```
///
/// # Operations
///
/// * **Create**: next id from the counter, `from_create_params`, uniqueness check,
///   `on_create`, persist, insert. The counter advances even when creation fails. If the
///   write fails, `on_create_aborted` runs and nothing is stored.
/// * **Get / List**: clones out of the store; `List` walks ids in ascending order.
/// * **Update**: applied to a copy, checked for uniqueness, persisted, then swapped in. A
///   failed update leaves the stored entity untouched.
/// * **Delete**: `on_delete`, persisted removal, then removal.
/// * **Action**: `handle_action` on a copy, persisted, then swapped in.
/// * **Batch**: see [`BatchStep`]. Every entity it changed is persisted in one
///   [`Persistence::update_all`] call; if that fails the batch is rolled back.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    next_id: u32,
    persistence: Box<dyn Persistence<T>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the MPSC channel. If the channel is full,
    /// calls to the client wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            next_id: 1,
            persistence: Box::new(Volatile),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Like [`new`](Self::new), but the store is loaded from `persistence` and every later
    /// mutation is written through it. The id counter resumes after the highest loaded id.
    pub fn with_persistence(
        buffer_size: usize,
        persistence: impl Persistence<T>,
    ) -> Result<(Self, ResourceClient<T>), FrameworkError> {
        let rows = persistence.load().map_err(FrameworkError::Storage)?;
        let next_id = rows
            .iter()
            .map(|(raw, _)| *raw)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        let store: BTreeMap<T::Id, T> = rows
            .into_iter()
            .map(|(raw, item)| (T::Id::from(raw), item))
            .collect();
        debug!(loaded = store.len(), next_id, "Store loaded");

        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store,
            next_id,
            persistence: Box::new(persistence),
        };
        Ok((actor, ResourceClient::new(sender)))
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// The `context` argument is injected into every entity hook.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);
                    self.next_id += 1;

                    let result = self.create(id.clone(), params, &context).await;
                    match &result {
                        Ok(_) => info!(entity_type, %id, size = self.store.len(), "Created"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| item.matches(&filter))
                        .cloned()
                        .collect();
                    debug!(entity_type, ?filter, count = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let result = self.update(&id, update, &context).await;
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Updated"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    if let Some(item) = self.store.get(&id) {
                        if let Err(e) = item.on_delete(&context).await {
                            warn!(entity_type, %id, error = %e, "on_delete failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        if let Err(e) = self.persistence.remove(&id) {
                            error!(entity_type, %id, error = %e, "Delete not persisted");
                            let _ = respond_to.send(Err(FrameworkError::Storage(e)));
                            continue;
                        }
                        self.store.remove(&id);
                        info!(entity_type, %id, size = self.store.len(), "Deleted");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let result = self.act(&id, action, &context).await;
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Action ok"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Batch { steps, respond_to } => {
                    debug!(entity_type, steps = steps.len(), "Batch");
                    let result = self.apply_batch(steps, &context).await;
                    match &result {
                        Ok(results) => {
                            let touched: usize = results.iter().map(Vec::len).sum();
                            info!(entity_type, touched, "Batch committed");
                        }
                        Err(e) => warn!(entity_type, error = %e, "Batch rolled back"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    async fn create(
        &mut self,
        id: T::Id,
        params: T::Create,
        context: &T::Context,
    ) -> Result<T, FrameworkError> {
        let mut item = T::from_create_params(id.clone(), params)
            .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;
        self.ensure_unique(&id, &item)?;
        item.on_create(context)
            .await
            .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;
        if let Err(e) = self.persistence.insert(&id, &item) {
            error!(%id, error = %e, "Create not persisted");
            if let Err(undo) = item.on_create_aborted(context).await {
                error!(%id, error = %undo, "on_create_aborted failed");
            }
            return Err(FrameworkError::Storage(e));
        }
        self.store.insert(id, item.clone());
        Ok(item)
    }

    async fn update(
        &mut self,
        id: &T::Id,
        update: T::Update,
        context: &T::Context,
    ) -> Result<T, FrameworkError> {
        let mut draft = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        draft
            .on_update(update, context)
            .await
            .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;
        self.ensure_unique(id, &draft)?;
        self.persistence
            .update(id, &draft)
            .map_err(FrameworkError::Storage)?;
        self.store.insert(id.clone(), draft.clone());
        Ok(draft)
    }

    async fn act(
        &mut self,
        id: &T::Id,
        action: T::Action,
        context: &T::Context,
    ) -> Result<T::ActionResult, FrameworkError> {
        let mut draft = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let result = draft
            .handle_action(action, context)
            .await
            .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;
        self.persistence
            .update(id, &draft)
            .map_err(FrameworkError::Storage)?;
        self.store.insert(id.clone(), draft);
        Ok(result)
    }

    fn ensure_unique(&self, id: &T::Id, item: &T) -> Result<(), FrameworkError> {
        let Some(key) = item.unique_key() else {
            return Ok(());
        };
        let taken = self
            .store
            .iter()
            .any(|(other_id, other)| other_id != id && other.unique_key().as_ref() == Some(&key));
        if taken {
            return Err(FrameworkError::Conflict(key));
        }
        Ok(())
    }

    async fn apply_batch(
        &mut self,
        steps: Vec<BatchStep<T>>,
        context: &T::Context,
    ) -> Result<BatchResult<T>, FrameworkError> {
        let mut snapshot: Vec<(T::Id, T)> = Vec::new();
        let mut results = Vec::with_capacity(steps.len());

        for (step, BatchStep { filter, limit, action }) in steps.into_iter().enumerate() {
            let selected: Vec<T::Id> = self
                .store
                .iter()
                .filter(|(_, item)| item.matches(&filter))
                .take(limit)
                .map(|(id, _)| id.clone())
                .collect();

            if selected.len() < limit {
                self.restore(snapshot);
                return Err(FrameworkError::Shortfall {
                    step,
                    requested: limit,
                    found: selected.len(),
                });
            }

            let mut step_results = Vec::with_capacity(selected.len());
            for id in selected {
                let Some(item) = self.store.get_mut(&id) else {
                    continue;
                };
                snapshot.push((id.clone(), item.clone()));
                match item.handle_action(action.clone(), context).await {
                    Ok(result) => step_results.push((id, result)),
                    Err(e) => {
                        self.restore(snapshot);
                        return Err(FrameworkError::EntityError(Box::new(e)));
                    }
                }
            }
            results.push(step_results);
        }

        let touched: BTreeMap<T::Id, T> = snapshot
            .iter()
            .filter_map(|(id, _)| self.store.get(id).map(|item| (id.clone(), item.clone())))
            .collect();
        let touched: Vec<(T::Id, T)> = touched.into_iter().collect();
        if let Err(e) = self.persistence.update_all(&touched) {
            self.restore(snapshot);
            return Err(FrameworkError::Storage(e));
        }

        Ok(results)
    }

    /// Puts back the pre-batch copies. Newest first, so an entity touched twice ends at its
    /// oldest copy.
    fn restore(&mut self, snapshot: Vec<(T::Id, T)>) {
        for (id, item) in snapshot.into_iter().rev() {
            self.store.insert(id, item);
        }
    }
}
