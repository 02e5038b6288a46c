//! Custom actions for the Key actor.

use crate::model::ActionId;

#[derive(Debug, Clone)]
pub enum KeyAction {
    /// Flags the key consumed on behalf of `action`. Fails if it already is.
    ///
    /// Returns the key as it is after consumption.
    Consume { action: ActionId },

    /// Makes a key consumed by `action` available again. Only used to undo a claim whose
    /// action could not be stored.
    Release { action: ActionId },
}
