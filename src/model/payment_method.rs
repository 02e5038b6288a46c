use serde::{Deserialize, Serialize};

entity_id!(PaymentMethod, "payment_method");

/// A payment-method label ("Mvola", "Virement"). No payment is ever captured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodCreate {
    pub label: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentMethodUpdate {
    pub label: Option<String>,
}
