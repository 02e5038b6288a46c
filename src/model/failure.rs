//! Notifications that exhausted their retries.
use crate::model::{ActionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_id!(DeliveryFailure, "delivery_failure");

/// Durable record of a notification that could not be delivered, kept for manual follow-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryFailure {
    pub id: DeliveryFailureId,
    pub client: UserId,
    pub action: ActionId,
    pub failed_at: DateTime<Utc>,
    pub error: String,
    pub attempts: u32,
    /// The allocation as JSON, so the keys can be re-sent by hand.
    pub payload: String,
    pub resolved: bool,
}

#[derive(Debug, Clone)]
pub struct DeliveryFailureCreate {
    pub client: UserId,
    pub action: ActionId,
    pub error: String,
    pub attempts: u32,
    pub payload: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryFailureFilter {
    pub resolved: Option<bool>,
}
