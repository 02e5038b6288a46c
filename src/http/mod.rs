//! # HTTP API
//!
//! axum router over the shop's services. Handlers authenticate with the [`Principal`]
//! extractor and gate on the role with [`require_staff`]/[`require_admin`]; everything else is
//! a call on an actor client.
//!
//! | Route | Access |
//! |-------|--------|
//! | `POST /actions/` | staff |
//! | `GET /actions/`, `GET /actions/:id` | authenticated (clients see their own) |
//! | `PATCH /actions/:id` | staff |
//! | `DELETE /actions/:id` | admin |
//! | `GET /categories/`, `GET /products/`, `GET /payment-methods/` | public |
//! | writes on categories, products, payment methods; everything on `/keys/` | staff |
//! | `/users/` | admin (`GET /users/me`: authenticated) |
//! | `/auth/*`, `/health` | public |
//! | `GET /stats/`, `/delivery-failures/` | admin |
//!
//! [`Principal`]: crate::auth::Principal

pub mod actions;
pub mod admin;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod keys;
pub mod users;

pub use error::AppError;
pub use extract::{require_admin, require_staff};

use crate::allocator::Allocator;
use crate::auth::TokenService;
use crate::catalog::Catalog;
use crate::clients::{
    CategoryClient, FailureLogClient, KeyPoolClient, LedgerClient, PaymentMethodClient,
    ProductClient, UserClient,
};
use crate::lifecycle::ShopSystem;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Handles shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: UserClient,
    pub categories: CategoryClient,
    pub products: ProductClient,
    pub payments: PaymentMethodClient,
    pub keys: KeyPoolClient,
    pub ledger: LedgerClient,
    pub failures: FailureLogClient,
    pub catalog: Catalog,
    pub allocator: Allocator,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(system: &ShopSystem) -> Self {
        Self {
            users: system.users.clone(),
            categories: system.categories.clone(),
            products: system.products.clone(),
            payments: system.payments.clone(),
            keys: system.keys.clone(),
            ledger: system.ledger.clone(),
            failures: system.failures.clone(),
            catalog: system.catalog.clone(),
            allocator: system.allocator.clone(),
            tokens: system.tokens.clone(),
        }
    }
}

/// Unwraps a JSON body, turning a malformed one into a 400 in the API's error shape.
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(value)| value).map_err(AppError::from)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(admin::health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/token", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/actions/",
            post(actions::create_action).get(actions::list_actions),
        )
        .route(
            "/actions/:id",
            get(actions::get_action)
                .patch(actions::update_action)
                .delete(actions::delete_action),
        )
        .route(
            "/categories/",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/categories/:id",
            get(catalog::get_category)
                .patch(catalog::update_category)
                .delete(catalog::delete_category),
        )
        .route(
            "/products/",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/products/:id",
            get(catalog::get_product)
                .patch(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/payment-methods/",
            get(catalog::list_payment_methods).post(catalog::create_payment_method),
        )
        .route(
            "/payment-methods/:id",
            get(catalog::get_payment_method)
                .patch(catalog::update_payment_method)
                .delete(catalog::delete_payment_method),
        )
        .route("/keys/", get(keys::list_keys).post(keys::create_key))
        .route(
            "/keys/:id",
            get(keys::get_key)
                .patch(keys::update_key)
                .delete(keys::delete_key),
        )
        .route("/users/", get(users::list_users).post(users::create_user))
        .route("/users/me", get(users::me))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/stats/", get(admin::stats))
        .route("/delivery-failures/", get(admin::list_failures))
        .route(
            "/delivery-failures/:id/resolve",
            post(admin::resolve_failure),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
