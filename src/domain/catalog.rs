use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Product {
    pub id: i32,
    pub name: String,
    /// `glasses`, `sunglasses` or `contact_lenses`.
    pub category: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub is_active: bool,
    pub images: Vec<String>,
    pub color_options: Vec<ColorOption>,
    pub calibers: Vec<CaliberOption>,
}

/// One entry of a product's `color_images` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorOption {
    #[serde(default)]
    pub hex: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub price: Option<BigDecimal>,
    #[serde(default)]
    pub stock: Option<i32>,
}

impl ColorOption {
    /// The value recorded as `selected_color` once this entry is chosen.
    pub fn selection_value(&self) -> &str {
        self.hex.as_deref().unwrap_or(&self.name)
    }
}

/// One entry of a product's `mm_calibers` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaliberOption {
    pub mm: String,
    #[serde(default)]
    pub price: Option<BigDecimal>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    EyeHygiene,
    SizeVolume,
}

/// A row of one of the related variant tables.
#[derive(Debug, Clone)]
pub struct CatalogVariant {
    pub kind: VariantKind,
    pub id: i32,
    pub product_id: i32,
    /// Variant name for eye hygiene, the size/volume label for size variants.
    pub label: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOnKind {
    ProgressiveVariant,
    LensThicknessMaterial,
    Treatment,
    PhotochromicColor,
    PrescriptionSunColor,
}

impl AddOnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProgressiveVariant => "progressive_variant",
            Self::LensThicknessMaterial => "lens_thickness_material",
            Self::Treatment => "treatment",
            Self::PhotochromicColor => "photochromic_color",
            Self::PrescriptionSunColor => "prescription_sun_color",
        }
    }
}

/// A priced lens option. `amount` is the price for materials, treatments and
/// progressive variants, and the price adjustment for tint colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub kind: AddOnKind,
    pub id: i32,
    pub name: String,
    pub amount: BigDecimal,
}
