use actix_web::HttpResponse;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::domain::catalog::{AddOn, VariantKind};
use crate::domain::customization::LensSelection;
use crate::domain::pricing::round_money;
use crate::domain::variant::VariantRequest;
use crate::errors::AppError;

pub mod cart;
pub mod content;
pub mod pricing;

// ── Shared request pieces ────────────────────────────────────────────────────

/// Variant fields accepted by the add-to-cart and quote endpoints. At most one
/// variant system applies; catalog variants are tried first, then calibers,
/// then colors.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VariantFields {
    /// Id of an eye-hygiene or size/volume variant; requires `variant_type`.
    pub selected_variant_id: Option<i32>,
    /// `eye_hygiene` or `size_volume`.
    pub variant_type: Option<String>,
    /// Caliber in millimetres, e.g. "52".
    pub selected_mm_caliber: Option<String>,
    /// `#RRGGBB` hex code or a color name.
    pub selected_color: Option<String>,
}

impl VariantFields {
    fn into_request(self) -> Result<VariantRequest, AppError> {
        let variant_type = self
            .variant_type
            .as_deref()
            .map(parse_variant_kind)
            .transpose()?;
        Ok(VariantRequest {
            selected_variant_id: self.selected_variant_id,
            variant_type,
            selected_mm_caliber: self.selected_mm_caliber,
            selected_color: self.selected_color,
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LensFields {
    pub progressive_variant_id: Option<i32>,
    pub lens_thickness_material_id: Option<i32>,
    #[serde(default)]
    pub treatment_ids: Vec<i32>,
    pub photochromic_color_id: Option<i32>,
    pub prescription_sun_color_id: Option<i32>,
}

impl From<LensFields> for LensSelection {
    fn from(f: LensFields) -> Self {
        LensSelection {
            progressive_variant_id: f.progressive_variant_id,
            lens_thickness_material_id: f.lens_thickness_material_id,
            treatment_ids: f.treatment_ids,
            photochromic_color_id: f.photochromic_color_id,
            prescription_sun_color_id: f.prescription_sun_color_id,
        }
    }
}

fn parse_variant_kind(raw: &str) -> Result<VariantKind, AppError> {
    match raw.trim() {
        "eye_hygiene" => Ok(VariantKind::EyeHygiene),
        "size_volume" => Ok(VariantKind::SizeVolume),
        other => Err(AppError::BadRequest(format!(
            "Invalid variant_type '{other}': expected eye_hygiene or size_volume"
        ))),
    }
}

/// Parses an optional decimal field sent as a string, e.g. "1.67".
fn parse_decimal(field: &str, raw: Option<&str>) -> Result<Option<BigDecimal>, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            BigDecimal::from_str(s)
                .map_err(|e| AppError::BadRequest(format!("Invalid {field} '{s}': {e}")))
        })
        .transpose()
}

// ── Shared response pieces ───────────────────────────────────────────────────

/// Money is always rendered with two decimals, e.g. "115.00".
fn money(amount: &BigDecimal) -> String {
    round_money(amount).to_string()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddOnResponse {
    /// `progressive_variant`, `lens_thickness_material`, `treatment`,
    /// `photochromic_color` or `prescription_sun_color`.
    pub kind: String,
    pub id: i32,
    pub name: String,
    pub amount: String,
}

impl From<&AddOn> for AddOnResponse {
    fn from(a: &AddOn) -> Self {
        AddOnResponse {
            kind: a.kind.as_str().to_string(),
            id: a.id,
            name: a.name.clone(),
            amount: money(&a.amount),
        }
    }
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
