//! Categories, products and payment methods. Reads are public; writes are staff-only.

use super::{body, require_staff, AppError, AppState};
use crate::auth::Principal;
use crate::model::{
    Category, CategoryCreate, CategoryId, CategoryUpdate, PaymentMethod, PaymentMethodCreate,
    PaymentMethodId, PaymentMethodUpdate, Product, ProductCreate, ProductFilter, ProductId,
    ProductUpdate,
};
use actor_framework::ActorClient;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

// --- Categories ---

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.categories.list(()).await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Category>, AppError> {
    let id = CategoryId(id);
    state
        .categories
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Category not found: {id}")))
}

pub async fn create_category(
    principal: Principal,
    State(state): State<AppState>,
    payload: Result<Json<CategoryCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    require_staff(&principal)?;
    let category = state.categories.create_category(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
    payload: Result<Json<CategoryUpdate>, JsonRejection>,
) -> Result<Json<Category>, AppError> {
    require_staff(&principal)?;
    let category = state
        .categories
        .update_category(CategoryId(id), body(payload)?)
        .await?;
    Ok(Json(category))
}

pub async fn delete_category(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, AppError> {
    require_staff(&principal)?;
    state.catalog.delete_category(CategoryId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Products ---

pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.products.list(filter).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Product>, AppError> {
    let id = ProductId(id);
    state
        .products
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Product not found: {id}")))
}

pub async fn create_product(
    principal: Principal,
    State(state): State<AppState>,
    payload: Result<Json<ProductCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    require_staff(&principal)?;
    let product = state.products.create_product(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<Product>, AppError> {
    require_staff(&principal)?;
    let product = state
        .products
        .update_product(ProductId(id), body(payload)?)
        .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, AppError> {
    require_staff(&principal)?;
    state.catalog.delete_product(ProductId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Payment methods ---

pub async fn list_payment_methods(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentMethod>>, AppError> {
    Ok(Json(state.payments.list(()).await?))
}

pub async fn get_payment_method(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<PaymentMethod>, AppError> {
    let id = PaymentMethodId(id);
    state
        .payments
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Payment method not found: {id}")))
}

pub async fn create_payment_method(
    principal: Principal,
    State(state): State<AppState>,
    payload: Result<Json<PaymentMethodCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentMethod>), AppError> {
    require_staff(&principal)?;
    let method = state.payments.create_method(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(method)))
}

pub async fn update_payment_method(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
    payload: Result<Json<PaymentMethodUpdate>, JsonRejection>,
) -> Result<Json<PaymentMethod>, AppError> {
    require_staff(&principal)?;
    let method = state
        .payments
        .update_method(PaymentMethodId(id), body(payload)?)
        .await?;
    Ok(Json(method))
}

pub async fn delete_payment_method(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, AppError> {
    require_staff(&principal)?;
    state.payments.delete(PaymentMethodId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
