//! # Framework Errors
//!
//! This module defines the common error types used throughout the actor framework.

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unique value already taken: {0}")]
    Conflict(String),
    #[error("Batch step {step} selected {found} of {requested} entities")]
    Shortfall {
        step: usize,
        requested: usize,
        found: usize,
    },
    /// The actor's [`Persistence`](crate::Persistence) refused a write. Nothing was committed.
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Recovers the entity's own error type from an `EntityError`.
    ///
    /// Any other variant, or an `EntityError` holding a different type, is handed back unchanged.
    pub fn into_entity_error<E>(self) -> Result<E, Self>
    where
        E: std::error::Error + 'static,
    {
        match self {
            FrameworkError::EntityError(inner) => match inner.downcast::<E>() {
                Ok(err) => Ok(*err),
                Err(inner) => Err(FrameworkError::EntityError(inner)),
            },
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("out of keys")]
    struct OutOfKeys;

    #[test]
    fn test_into_entity_error_recovers_concrete_type() {
        let err = FrameworkError::EntityError(Box::new(OutOfKeys));
        assert_eq!(err.into_entity_error::<OutOfKeys>().unwrap(), OutOfKeys);
    }

    #[test]
    fn test_into_entity_error_passes_other_variants_through() {
        let err = FrameworkError::NotFound("key_9".into());
        let back = err.into_entity_error::<OutOfKeys>().unwrap_err();
        assert!(matches!(back, FrameworkError::NotFound(id) if id == "key_9"));

        let foreign = FrameworkError::EntityError(Box::new(std::io::Error::other("disk")));
        assert!(matches!(
            foreign.into_entity_error::<OutOfKeys>(),
            Err(FrameworkError::EntityError(_))
        ));
    }
}
