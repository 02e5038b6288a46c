//! # Allocator
//!
//! Records a purchase or a quote for a client. The procedure fails fast before any mutation:
//!
//! 1. the caller must be staff,
//! 2. the action type must parse,
//! 3. lines, quantities, client and payment method must be valid,
//! 4. every product must exist,
//! 5. for a purchase, every product must have enough available keys.
//!
//! Step 5 is advisory. The authoritative check is the claim the ledger runs while it records the
//! action (see [`ledger_actor`](crate::ledger_actor)); a purchase that loses a race there fails
//! with the same [`AllocationError::InsufficientStock`] and leaves nothing behind.
//!
//! The seller recorded on the action is always the caller.
//!
//! Once the action is committed the allocation is queued for the
//! [`notify`](crate::notify) dispatcher and echoed back; delivery is never awaited.

pub mod error;

pub use error::*;

use crate::auth::Principal;
use crate::catalog::{Catalog, CatalogError};
use crate::clients::{KeyPoolClient, LedgerClient, PaymentMethodClient, UserClient};
use crate::ledger_actor::ActionError;
use crate::model::{
    Action, ActionCreate, ActionId, ActionKind, Allocation, LineDraft, PaymentMethodId, Product,
    ProductId, Role, UserId, MAX_LINES, MAX_LINE_QUANTITY,
};
use crate::notify::{Notification, Notifier};
use actor_framework::ActorClient;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

pub const PURCHASE_DETAIL: &str = "Action created. The keys have been sent by email.";
pub const QUOTE_DETAIL: &str = "The quote has been sent by email.";

/// One requested product line. Quantity is signed so that bad input is reported, not wrapped.
#[derive(Debug, Clone)]
pub struct LineRequest {
    pub product: ProductId,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct ActionRequest {
    /// `ACHAT`/`PURCHASE` or `DEVIS`/`QUOTE`, any case.
    pub kind: String,
    pub client: UserId,
    pub payment_method: PaymentMethodId,
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub detail: &'static str,
    pub action_id: ActionId,
    pub allocation: Allocation,
    pub action: Action,
}

#[derive(Clone)]
pub struct Allocator {
    users: UserClient,
    payments: PaymentMethodClient,
    catalog: Catalog,
    keys: KeyPoolClient,
    ledger: LedgerClient,
    notifier: Notifier,
}

fn internal(e: impl ToString) -> AllocationError {
    AllocationError::Internal(e.to_string())
}

impl Allocator {
    pub fn new(
        users: UserClient,
        payments: PaymentMethodClient,
        catalog: Catalog,
        keys: KeyPoolClient,
        ledger: LedgerClient,
        notifier: Notifier,
    ) -> Self {
        Self {
            users,
            payments,
            catalog,
            keys,
            ledger,
            notifier,
        }
    }

    #[instrument(skip(self, request), fields(user = %principal.user, kind = %request.kind))]
    pub async fn submit(
        &self,
        principal: &Principal,
        request: ActionRequest,
    ) -> Result<AllocationOutcome, AllocationError> {
        match principal.role {
            Role::Admin | Role::Vendeur => {}
            Role::Client => return Err(AllocationError::Forbidden),
        }

        let kind = ActionKind::parse(&request.kind)
            .ok_or_else(|| AllocationError::InvalidActionType(request.kind.clone()))?;

        let quantities = self.validate(&request).await?;

        let ids: Vec<ProductId> = request.lines.iter().map(|line| line.product).collect();
        let products = self.catalog.get_many(&ids).await.map_err(|e| match e {
            CatalogError::ProductNotFound(ids) => AllocationError::ProductNotFound { ids },
            other => internal(other),
        })?;

        let lines: Vec<LineDraft> = request
            .lines
            .iter()
            .zip(&quantities)
            .filter_map(|(line, quantity)| {
                products.get(&line.product).map(|product| LineDraft {
                    product: product.id,
                    product_name: product.name.clone(),
                    unit_price: product.price,
                    validity: product.validity,
                    quantity: *quantity,
                })
            })
            .collect();

        if kind == ActionKind::Purchase {
            self.check_stock(&lines, &products).await?;
        }

        let action = self
            .ledger
            .record(ActionCreate {
                kind,
                client: request.client,
                seller: Some(principal.user),
                payment_method: request.payment_method,
                lines,
            })
            .await
            .map_err(|e| match e {
                ActionError::InsufficientStock {
                    product,
                    requested,
                    available,
                } => {
                    warn!(%product, requested, available, "Race condition: keys taken between check and claim");
                    AllocationError::InsufficientStock {
                        product,
                        name: product_name(&products, product),
                        requested,
                        available,
                    }
                }
                ActionError::ValidationError(message) => {
                    AllocationError::ValidationError(vec![FieldError::new("produits", message)])
                }
                other => internal(other),
            })?;

        info!(action_id = %action.id, code = %action.code, total = %action.total_price, "Action recorded");

        self.notifier
            .enqueue(Notification {
                client: action.client,
                action: action.id,
                allocation: action.allocation.clone(),
            })
            .await;

        Ok(AllocationOutcome {
            detail: match kind {
                ActionKind::Purchase => PURCHASE_DETAIL,
                ActionKind::Quote => QUOTE_DETAIL,
            },
            action_id: action.id,
            allocation: action.allocation.clone(),
            action,
        })
    }

    /// Field checks. Returns the quantities as `u32`, in line order.
    async fn validate(&self, request: &ActionRequest) -> Result<Vec<u32>, AllocationError> {
        let mut errors = Vec::new();

        if request.lines.is_empty() {
            errors.push(FieldError::new("produits", "at least one product is required"));
        }
        if request.lines.len() > MAX_LINES {
            errors.push(FieldError::new(
                "produits",
                format!("at most {MAX_LINES} product lines are allowed"),
            ));
        }
        let quantities: Vec<u32> = request
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| match u32::try_from(line.quantity) {
                Ok(quantity) if (1..=MAX_LINE_QUANTITY).contains(&quantity) => quantity,
                _ => {
                    errors.push(FieldError::new(
                        format!("produits[{i}].quantite"),
                        format!("quantity must be between 1 and {MAX_LINE_QUANTITY}"),
                    ));
                    0
                }
            })
            .collect();

        let client = self.users.get(request.client).await.map_err(internal)?;
        match client {
            Some(client) if client.active => {}
            Some(_) => errors.push(FieldError::new("client", "client account is disabled")),
            None => errors.push(FieldError::new(
                "client",
                format!("unknown client {}", request.client.0),
            )),
        }
        if self
            .payments
            .get(request.payment_method)
            .await
            .map_err(internal)?
            .is_none()
        {
            errors.push(FieldError::new(
                "methode_paiement",
                format!("unknown payment method {}", request.payment_method.0),
            ));
        }

        if errors.is_empty() {
            Ok(quantities)
        } else {
            Err(AllocationError::ValidationError(errors))
        }
    }

    /// Advisory pre-check against the summed demand per product.
    async fn check_stock(
        &self,
        lines: &[LineDraft],
        products: &BTreeMap<ProductId, Product>,
    ) -> Result<(), AllocationError> {
        let mut demand: Vec<(ProductId, usize)> = Vec::new();
        for line in lines {
            match demand.iter_mut().find(|(product, _)| *product == line.product) {
                Some((_, quantity)) => *quantity += line.quantity as usize,
                None => demand.push((line.product, line.quantity as usize)),
            }
        }

        for (product, requested) in demand {
            let available = self.keys.count_available(product).await.map_err(internal)?;
            if available < requested {
                return Err(AllocationError::InsufficientStock {
                    product,
                    name: product_name(products, product),
                    requested,
                    available,
                });
            }
        }
        Ok(())
    }
}

fn product_name(products: &BTreeMap<ProductId, Product>, id: ProductId) -> String {
    products
        .get(&id)
        .map(|product| product.name.clone())
        .unwrap_or_else(|| id.to_string())
}
