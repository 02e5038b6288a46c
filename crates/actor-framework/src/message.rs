//! # Generic Messages
//!
//! This module defines the generic message types used for communication between
//! the `ResourceClient` and `ResourceActor`.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Per-step results of a batch: the ids touched by each step, in selection order,
/// paired with what the action returned for them.
pub type BatchResult<T> =
    Vec<Vec<(<T as ActorEntity>::Id, <T as ActorEntity>::ActionResult)>>;

/// One step of an atomic batch: apply `action` to the first `limit` entities matching `filter`.
///
/// Steps run in order, so a later step sees the state left by earlier ones. If any step
/// selects fewer than `limit` entities, or any action fails, every entity touched by the
/// batch is restored and nothing is observable.
#[derive(Debug)]
pub struct BatchStep<T: ActorEntity> {
    pub filter: T::Filter,
    pub limit: usize,
    pub action: T::Action,
}

/// Internal message type sent to the actor to request operations.
///
/// The variants map to CRUD operations plus two extensions:
///
/// - **Create**: Lifecycle start. Responds with the stored entity.
/// - **Get / List**: Retrieval by ID or by [`ActorEntity::Filter`].
/// - **Update**: State mutation via [`ActorEntity::Update`].
/// - **Delete**: Lifecycle end.
/// - **Action**: A custom [`ActorEntity::Action`] on one entity.
/// - **Batch**: Select-and-apply over many entities as one all-or-nothing unit.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: T::Filter,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Batch {
        steps: Vec<BatchStep<T>>,
        respond_to: Response<BatchResult<T>>,
    },
}
