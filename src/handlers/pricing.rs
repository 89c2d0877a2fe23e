use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{money, AddOnResponse, LensFields, VariantFields};
use crate::application::cart_service::{CartService, CustomizationQuote};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomizationPriceRequest {
    pub product_id: i32,
    #[serde(flatten)]
    pub variant: VariantFields,
    #[serde(flatten)]
    pub lens: LensFields,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomizationPriceResponse {
    pub product_id: i32,
    /// The variant the request resolved to, if any.
    #[schema(value_type = Option<Object>)]
    pub variant: Option<Value>,
    /// Variant price, or the product price when no variant resolved.
    pub base_price: String,
    pub add_ons: Vec<AddOnResponse>,
    pub total: String,
}

impl From<&CustomizationQuote> for CustomizationPriceResponse {
    fn from(quote: &CustomizationQuote) -> Self {
        CustomizationPriceResponse {
            product_id: quote.product_id,
            variant: quote
                .variant
                .as_ref()
                .and_then(|v| serde_json::to_value(v).ok()),
            base_price: money(&quote.breakdown.base),
            add_ons: quote
                .breakdown
                .add_ons
                .iter()
                .map(AddOnResponse::from)
                .collect(),
            total: money(&quote.breakdown.total),
        }
    }
}

/// POST /pricing/customization
///
/// Quotes the unit price of a configuration without touching any cart.
#[utoipa::path(
    post,
    path = "/pricing/customization",
    request_body = CustomizationPriceRequest,
    responses(
        (status = 200, description = "Price computed", body = CustomizationPriceResponse),
        (status = 400, description = "Invalid request or unavailable product"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pricing"
)]
pub async fn quote_customization(
    service: web::Data<CartService>,
    body: web::Json<CustomizationPriceRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let product_id = body.product_id;
    let variant = body.variant.into_request()?;
    let lens = body.lens.into();

    let quote = web::block(move || service.calculate_customization_price(product_id, &variant, &lens))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CustomizationPriceResponse::from(&quote)))
}
