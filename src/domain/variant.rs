//! Resolution of a requested variant against a product.
//!
//! The related-table variants (eye hygiene, size/volume) take priority; the
//! caliber and color entries embedded on the product are consulted after
//! them, in that order. Each stage only runs when its input was supplied and
//! the first stage that matches wins.

use std::sync::LazyLock;

use bigdecimal::BigDecimal;
use regex::Regex;
use serde::Deserialize;

use super::catalog::{CaliberOption, CatalogVariant, ColorOption, Product, VariantKind};
use super::customization::VariantSelection;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern compiles"));

/// The variant part of an add-to-cart or pricing request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantRequest {
    pub selected_variant_id: Option<i32>,
    pub variant_type: Option<VariantKind>,
    pub selected_mm_caliber: Option<String>,
    pub selected_color: Option<String>,
}

impl VariantRequest {
    /// `(kind, id)` of a related-table variant, when both halves were sent.
    pub fn catalog_reference(&self) -> Option<(VariantKind, i32)> {
        match (self.variant_type, self.selected_variant_id) {
            (Some(kind), Some(id)) => Some((kind, id)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.catalog_reference().is_none()
            && blank(self.selected_mm_caliber.as_deref())
            && blank(self.selected_color.as_deref())
    }
}

/// Request that resolves back to a stored selection, used to look up the
/// stock bounding an existing line.
impl From<&VariantSelection> for VariantRequest {
    fn from(selection: &VariantSelection) -> Self {
        match selection {
            VariantSelection::Color { selected_color, .. } => VariantRequest {
                selected_color: Some(selected_color.clone()),
                ..VariantRequest::default()
            },
            VariantSelection::Caliber {
                selected_mm_caliber,
                ..
            } => VariantRequest {
                selected_mm_caliber: Some(selected_mm_caliber.clone()),
                ..VariantRequest::default()
            },
            VariantSelection::EyeHygiene { variant_id, .. } => VariantRequest {
                selected_variant_id: Some(*variant_id),
                variant_type: Some(VariantKind::EyeHygiene),
                ..VariantRequest::default()
            },
            VariantSelection::SizeVolume { variant_id, .. } => VariantRequest {
                selected_variant_id: Some(*variant_id),
                variant_type: Some(VariantKind::SizeVolume),
                ..VariantRequest::default()
            },
        }
    }
}

fn blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Outcome of resolving a request: what gets written into the line's
/// customization plus the stock that bounds the requested quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVariant {
    pub selection: VariantSelection,
    /// `None` when the variant does not track its own stock.
    pub stock: Option<i32>,
}

impl ResolvedVariant {
    pub fn price(&self) -> &BigDecimal {
        self.selection.price()
    }
}

/// Resolves `request` against `product`.
///
/// `catalog_variant` is the related-table row the caller fetched for
/// [`VariantRequest::catalog_reference`]; it is ignored unless it belongs to
/// the product and is active. Returns `None` when nothing matches, in which
/// case the line is priced from the base product.
pub fn resolve(
    product: &Product,
    request: &VariantRequest,
    catalog_variant: Option<&CatalogVariant>,
) -> Option<ResolvedVariant> {
    if request.is_empty() {
        return None;
    }

    let resolved = request
        .catalog_reference()
        .and_then(|reference| resolve_catalog(product, reference, catalog_variant))
        .or_else(|| {
            request
                .selected_mm_caliber
                .as_deref()
                .and_then(|mm| resolve_caliber(product, mm))
        })
        .or_else(|| {
            request
                .selected_color
                .as_deref()
                .and_then(|color| resolve_color(product, color))
        });

    if resolved.is_none() {
        log::warn!(
            "No variant of product {} matches {:?}; using the base product",
            product.id,
            request
        );
    }
    resolved
}

fn resolve_catalog(
    product: &Product,
    (kind, id): (VariantKind, i32),
    variant: Option<&CatalogVariant>,
) -> Option<ResolvedVariant> {
    let variant = variant.filter(|v| {
        v.kind == kind && v.id == id && v.product_id == product.id && v.is_active
    })?;

    let selection = match kind {
        VariantKind::EyeHygiene => VariantSelection::EyeHygiene {
            variant_id: variant.id,
            name: variant.label.clone(),
            image_url: variant.image_url.clone(),
            price: variant.price.clone(),
        },
        VariantKind::SizeVolume => VariantSelection::SizeVolume {
            variant_id: variant.id,
            size_volume: variant.label.clone(),
            image_url: variant.image_url.clone(),
            price: variant.price.clone(),
        },
    };
    Some(ResolvedVariant {
        selection,
        stock: Some(variant.stock),
    })
}

fn resolve_caliber(product: &Product, requested: &str) -> Option<ResolvedVariant> {
    let requested = requested.trim();
    if requested.is_empty() {
        return None;
    }
    let caliber: &CaliberOption = product
        .calibers
        .iter()
        .find(|c| c.mm.trim().eq_ignore_ascii_case(requested))?;

    Some(ResolvedVariant {
        selection: VariantSelection::Caliber {
            selected_mm_caliber: caliber.mm.clone(),
            image_url: caliber.image_url.clone(),
            price: caliber.price.clone().unwrap_or_else(|| product.price.clone()),
        },
        stock: caliber.stock,
    })
}

fn resolve_color(product: &Product, requested: &str) -> Option<ResolvedVariant> {
    let color = match_color(&product.color_options, requested)?;

    Some(ResolvedVariant {
        selection: VariantSelection::Color {
            selected_color: color.selection_value().to_string(),
            color_name: color.name.clone(),
            image_url: color.images.first().cloned(),
            price: color.price.clone().unwrap_or_else(|| product.price.clone()),
        },
        stock: color.stock,
    })
}

/// Finds the color entry for `requested`: exact hex match when it looks like
/// `#RRGGBB`, otherwise a case-insensitive substring match on the name in
/// either direction. The substring match can select a broader entry than
/// intended ("blue" matches "Navy Blue" before "Blue").
pub fn match_color<'a>(colors: &'a [ColorOption], requested: &str) -> Option<&'a ColorOption> {
    let requested = requested.trim();
    if requested.is_empty() {
        return None;
    }

    if HEX_COLOR.is_match(requested) {
        return colors.iter().find(|c| {
            c.hex
                .as_deref()
                .is_some_and(|hex| hex.trim().eq_ignore_ascii_case(requested))
        });
    }

    let needle = requested.to_lowercase();
    colors.iter().find(|c| {
        let name = c.name.trim().to_lowercase();
        !name.is_empty() && (name.contains(&needle) || needle.contains(&name))
    })
}
