//! Typed form of the `customization` JSON stored on every cart line.
//!
//! The database keeps the record as `jsonb`; it is converted to and from these
//! types only at the persistence and HTTP boundaries.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::catalog::AddOn;

/// The variant a cart line was resolved to, one case per variant system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant_type", rename_all = "snake_case")]
pub enum VariantSelection {
    Color {
        selected_color: String,
        color_name: String,
        #[serde(default)]
        image_url: Option<String>,
        price: BigDecimal,
    },
    Caliber {
        selected_mm_caliber: String,
        #[serde(default)]
        image_url: Option<String>,
        price: BigDecimal,
    },
    EyeHygiene {
        variant_id: i32,
        name: String,
        #[serde(default)]
        image_url: Option<String>,
        price: BigDecimal,
    },
    SizeVolume {
        variant_id: i32,
        size_volume: String,
        #[serde(default)]
        image_url: Option<String>,
        price: BigDecimal,
    },
}

impl VariantSelection {
    pub fn price(&self) -> &BigDecimal {
        match self {
            Self::Color { price, .. }
            | Self::Caliber { price, .. }
            | Self::EyeHygiene { price, .. }
            | Self::SizeVolume { price, .. } => price,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Color { image_url, .. }
            | Self::Caliber { image_url, .. }
            | Self::EyeHygiene { image_url, .. }
            | Self::SizeVolume { image_url, .. } => image_url.as_deref(),
        }
    }

    pub fn selected_color(&self) -> Option<&str> {
        match self {
            Self::Color { selected_color, .. } => Some(selected_color),
            _ => None,
        }
    }
}

/// Lens options requested for a line. Ids that do not resolve are kept here
/// but never priced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LensSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progressive_variant_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lens_thickness_material_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub treatment_ids: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photochromic_color_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_sun_color_id: Option<i32>,
}

impl LensSelection {
    pub fn is_empty(&self) -> bool {
        self.progressive_variant_id.is_none()
            && self.lens_thickness_material_id.is_none()
            && self.treatment_ids.is_empty()
            && self.photochromic_color_id.is_none()
            && self.prescription_sun_color_id.is_none()
    }

    /// Same selection with treatment ids sorted and deduplicated, so two
    /// selections listing the same treatments compare equal.
    pub fn normalized(&self) -> Self {
        let mut treatment_ids = self.treatment_ids.clone();
        treatment_ids.sort_unstable();
        treatment_ids.dedup();
        Self {
            treatment_ids,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantSelection>,
    #[serde(default, skip_serializing_if = "LensSelection::is_empty")]
    pub lens: LensSelection,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_ons: Vec<AddOn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_id: Option<i32>,
    #[serde(default)]
    pub is_gift: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_for_product_id: Option<i32>,
}

impl Customization {
    pub fn gift_for(product_id: i32) -> Self {
        Self {
            is_gift: true,
            gift_for_product_id: Some(product_id),
            ..Self::default()
        }
    }

    pub fn selected_color(&self) -> Option<&str> {
        self.variant.as_ref().and_then(VariantSelection::selected_color)
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Serializing plain data with string keys cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Reads a stored customization. Records that do not match the current
    /// shape are logged and read as empty rather than failing the request.
    pub fn from_json(value: &serde_json::Value) -> Self {
        if value.is_null() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            log::warn!("Unreadable cart item customization, using empty: {e}");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[test]
    fn color_variant_serializes_with_variant_type_tag() {
        let c = Customization {
            variant: Some(VariantSelection::Color {
                selected_color: "#1A2B3C".to_string(),
                color_name: "Navy".to_string(),
                image_url: None,
                price: dec("120.00"),
            }),
            ..Customization::default()
        };

        let value = c.to_json();

        assert_eq!(value["variant"]["variant_type"], "color");
        assert_eq!(value["variant"]["selected_color"], "#1A2B3C");
        assert_eq!(value["is_gift"], false);
        assert!(value.get("lens").is_none());
    }

    #[test]
    fn reads_stored_size_volume_record() {
        let stored = json!({
            "variant": {
                "variant_type": "size_volume",
                "variant_id": 4,
                "size_volume": "360 ml",
                "price": "18.50"
            },
            "lens": { "treatment_ids": [3, 1] },
            "is_gift": false
        });

        let c = Customization::from_json(&stored);

        assert!(matches!(
            c.variant,
            Some(VariantSelection::SizeVolume { variant_id: 4, .. })
        ));
        assert_eq!(c.variant.as_ref().map(VariantSelection::price), Some(&dec("18.5")));
        assert_eq!(c.lens.treatment_ids, vec![3, 1]);
    }

    #[test]
    fn malformed_record_reads_as_empty() {
        let c = Customization::from_json(&json!({ "variant": "blue" }));
        assert_eq!(c, Customization::default());
    }

    #[test]
    fn null_record_reads_as_empty() {
        assert_eq!(
            Customization::from_json(&serde_json::Value::Null),
            Customization::default()
        );
    }

    #[test]
    fn gift_marker_survives_a_round_trip_through_json() {
        let c = Customization::from_json(&Customization::gift_for(7).to_json());
        assert!(c.is_gift);
        assert_eq!(c.gift_for_product_id, Some(7));
    }

    #[test]
    fn normalized_lens_selection_sorts_and_dedups_treatments() {
        let lens = LensSelection {
            treatment_ids: vec![5, 2, 5, 1],
            ..LensSelection::default()
        };
        assert_eq!(lens.normalized().treatment_ids, vec![1, 2, 5]);
    }
}
