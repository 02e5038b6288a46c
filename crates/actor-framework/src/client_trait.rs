//! # ActorClient Trait
//!
//! Provides a common interface for resource-specific clients, adding default `get`, `list`
//! and `delete` methods built on top of a generic `ResourceClient`.
use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit standard read and delete operations.
///
/// # Example
///
/// ```rust
/// use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Label { id: u32, text: String }
/// #[derive(Debug)] struct LabelCreate;
/// #[derive(Debug)] struct LabelUpdate;
/// #[derive(Debug, Clone)] enum LabelAction {}
/// #[derive(Debug, thiserror::Error)]
/// enum LabelError {
///     #[error("{0}")]
///     Communication(String),
/// }
/// impl From<String> for LabelError {
///     fn from(s: String) -> Self { LabelError::Communication(s) }
/// }
///
/// #[async_trait]
/// impl ActorEntity for Label {
///     type Id = u32;
///     type Create = LabelCreate;
///     type Update = LabelUpdate;
///     type Action = LabelAction;
///     type ActionResult = ();
///     type Filter = ();
///     type Context = ();
///     type Error = LabelError;
///
///     fn from_create_params(id: u32, _: LabelCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id, text: String::new() })
///     }
///     async fn on_update(&mut self, _: LabelUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, a: LabelAction, _: &()) -> Result<(), Self::Error> { match a {} }
/// }
///
/// struct LabelClient { inner: ResourceClient<Label> }
///
/// #[async_trait]
/// impl ActorClient<Label> for LabelClient {
///     type Error = LabelError;
///
///     fn inner(&self) -> &ResourceClient<Label> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         e.into_entity_error::<LabelError>()
///             .unwrap_or_else(|other| LabelError::Communication(other.to_string()))
///     }
/// }
///
/// async fn usage(client: LabelClient) {
///     // get(), list() and delete() are provided automatically.
///     let _ = client.get(1).await;
///     let _ = client.list(()).await;
///     let _ = client.delete(1).await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch every entity matching `filter`.
    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: T::Filter) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list(filter).await.map_err(Self::map_error)
    }

    /// Delete an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
