use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use super::{money, parse_decimal, LensFields, VariantFields};
use crate::application::cart_service::{AddToCart, CartService};
use crate::domain::cart::{CartItem, CartView};
use crate::domain::promotion::AppliedDiscount;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub product_id: i32,
    /// Defaults to 1.
    pub quantity: Option<i32>,
    /// Lens refraction index as a decimal string, e.g. "1.67".
    pub lens_index: Option<String>,
    pub prescription_id: Option<i32>,
    /// Coupon applied to the returned cart totals.
    pub coupon_code: Option<String>,
    #[serde(flatten)]
    pub variant: VariantFields,
    #[serde(flatten)]
    pub lens: LensFields,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CartQuery {
    /// Coupon code to evaluate against the cart subtotal.
    pub coupon: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
    pub lens_index: Option<String>,
    pub is_gift: bool,
    /// Resolved variant, lens add-ons and gift markers of the line.
    #[schema(value_type = Object)]
    pub customization: Value,
    pub created_at: String,
}

impl From<&CartItem> for CartItemResponse {
    fn from(item: &CartItem) -> Self {
        CartItemResponse {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: money(&item.unit_price),
            line_total: money(&item.line_total()),
            lens_index: item.lens_index.as_ref().map(ToString::to_string),
            is_gift: item.is_gift(),
            customization: item.customization.to_json(),
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountResponse {
    pub code: String,
    pub amount: String,
    pub free_shipping: bool,
}

impl From<&AppliedDiscount> for DiscountResponse {
    fn from(d: &AppliedDiscount) -> Self {
        DiscountResponse {
            code: d.code.clone(),
            amount: money(&d.amount),
            free_shipping: d.free_shipping,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub cart_id: i32,
    pub customer_id: i32,
    pub items: Vec<CartItemResponse>,
    pub item_count: i64,
    pub subtotal: String,
    pub discount: Option<DiscountResponse>,
    pub total: String,
}

impl From<&CartView> for CartResponse {
    fn from(view: &CartView) -> Self {
        CartResponse {
            cart_id: view.cart_id,
            customer_id: view.customer_id,
            items: view.items.iter().map(CartItemResponse::from).collect(),
            item_count: view.item_count,
            subtotal: money(&view.subtotal),
            discount: view.discount.as_ref().map(DiscountResponse::from),
            total: money(&view.total),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddItemResponse {
    pub item: CartItemResponse,
    /// True when the add incremented an existing line.
    pub merged: bool,
    pub gifts: Vec<CartItemResponse>,
    pub cart: CartResponse,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /customers/{customer_id}/cart
#[utoipa::path(
    get,
    path = "/customers/{customer_id}/cart",
    params(
        ("customer_id" = i32, Path, description = "Customer id"),
        CartQuery,
    ),
    responses(
        (status = 200, description = "Cart found", body = CartResponse),
        (status = 404, description = "Customer has no cart"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    service: web::Data<CartService>,
    path: web::Path<i32>,
    query: web::Query<CartQuery>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();
    let coupon = query.into_inner().coupon;

    let view = web::block(move || service.get_cart(customer_id, coupon.as_deref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(&view)))
}

/// POST /customers/{customer_id}/cart/items
///
/// Prices the configuration, then either increments a matching line or adds a
/// new one. Qualifying gifts are attached in the same call.
#[utoipa::path(
    post,
    path = "/customers/{customer_id}/cart/items",
    params(("customer_id" = i32, Path, description = "Customer id")),
    request_body = AddItemRequest,
    responses(
        (status = 201, description = "Item added or merged", body = AddItemResponse),
        (status = 400, description = "Invalid quantity, unavailable product or insufficient stock"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn add_item(
    service: web::Data<CartService>,
    path: web::Path<i32>,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();
    let body = body.into_inner();

    let request = AddToCart {
        product_id: body.product_id,
        quantity: body.quantity.unwrap_or(1),
        lens_index: parse_decimal("lens_index", body.lens_index.as_deref())?,
        variant: body.variant.into_request()?,
        lens: body.lens.into(),
        prescription_id: body.prescription_id,
        coupon_code: body.coupon_code,
    };

    let outcome = web::block(move || service.add_to_cart(customer_id, request))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(AddItemResponse {
        item: CartItemResponse::from(&outcome.item),
        merged: outcome.merged,
        gifts: outcome.gifts.iter().map(CartItemResponse::from).collect(),
        cart: CartResponse::from(&outcome.cart),
    }))
}

/// PATCH /customers/{customer_id}/cart/items/{item_id}
#[utoipa::path(
    patch,
    path = "/customers/{customer_id}/cart/items/{item_id}",
    params(
        ("customer_id" = i32, Path, description = "Customer id"),
        ("item_id" = i32, Path, description = "Cart line id"),
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = CartResponse),
        (status = 400, description = "Quantity below 1"),
        (status = 404, description = "Cart or line not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn update_item(
    service: web::Data<CartService>,
    path: web::Path<(i32, i32)>,
    body: web::Json<UpdateQuantityRequest>,
) -> Result<HttpResponse, AppError> {
    let (customer_id, item_id) = path.into_inner();
    let quantity = body.into_inner().quantity;

    let view = web::block(move || service.update_item_quantity(customer_id, item_id, quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(&view)))
}

/// DELETE /customers/{customer_id}/cart/items/{item_id}
#[utoipa::path(
    delete,
    path = "/customers/{customer_id}/cart/items/{item_id}",
    params(
        ("customer_id" = i32, Path, description = "Customer id"),
        ("item_id" = i32, Path, description = "Cart line id"),
    ),
    responses(
        (status = 200, description = "Line removed", body = CartResponse),
        (status = 404, description = "Cart or line not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn remove_item(
    service: web::Data<CartService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, AppError> {
    let (customer_id, item_id) = path.into_inner();

    let view = web::block(move || service.remove_item(customer_id, item_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(&view)))
}

/// DELETE /customers/{customer_id}/cart
#[utoipa::path(
    delete,
    path = "/customers/{customer_id}/cart",
    params(("customer_id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Cart emptied", body = CartResponse),
        (status = 404, description = "Customer has no cart"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn clear_cart(
    service: web::Data<CartService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();

    let view = web::block(move || service.clear_cart(customer_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(&view)))
}
