use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::customization::Customization;
use super::pricing::round_money;
use super::promotion::AppliedDiscount;

#[derive(Debug, Clone)]
pub struct Cart {
    pub id: i32,
    pub customer_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    /// Price snapshot taken when the line was created.
    pub unit_price: BigDecimal,
    pub lens_index: Option<BigDecimal>,
    pub customization: Customization,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    pub fn line_total(&self) -> BigDecimal {
        round_money(&(&self.unit_price * BigDecimal::from(self.quantity)))
    }

    pub fn is_gift(&self) -> bool {
        self.customization.is_gift
    }

    pub fn merge_key(&self) -> MergeKey {
        MergeKey::new(self.product_id, self.lens_index.clone(), &self.customization)
    }
}

#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub lens_index: Option<BigDecimal>,
    pub customization: Customization,
}

/// What two lines must share for an add to increment the existing line
/// instead of creating a new one.
///
/// Only the product, the lens index and the normalized selected color take
/// part. Lens add-ons, size variants and prescriptions do not, and the merged
/// line keeps its original price snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeKey {
    pub product_id: i32,
    pub lens_index: Option<BigDecimal>,
    pub color: Option<String>,
}

impl MergeKey {
    pub fn new(
        product_id: i32,
        lens_index: Option<BigDecimal>,
        customization: &Customization,
    ) -> Self {
        Self {
            product_id,
            lens_index,
            color: customization.selected_color().and_then(normalize_color),
        }
    }
}

fn normalize_color(color: &str) -> Option<String> {
    let color = color.trim();
    (!color.is_empty()).then(|| color.to_lowercase())
}

/// The existing line an add should merge into, if any. Gift lines are never
/// merge targets.
pub fn find_mergeable<'a>(items: &'a [CartItem], key: &MergeKey) -> Option<&'a CartItem> {
    items
        .iter()
        .filter(|item| !item.is_gift())
        .find(|item| item.merge_key() == *key)
}

/// Read model returned by the cart endpoints.
#[derive(Debug, Clone)]
pub struct CartView {
    pub cart_id: i32,
    pub customer_id: i32,
    pub items: Vec<CartItem>,
    /// Summed wide so lines near `i32::MAX` cannot overflow the count.
    pub item_count: i64,
    pub subtotal: BigDecimal,
    pub discount: Option<AppliedDiscount>,
    pub total: BigDecimal,
}

impl CartView {
    pub fn new(cart: &Cart, items: Vec<CartItem>, discount: Option<AppliedDiscount>) -> Self {
        let subtotal = round_money(
            &items
                .iter()
                .map(CartItem::line_total)
                .fold(BigDecimal::from(0), |acc, line| acc + line),
        );
        let total = match &discount {
            Some(d) => round_money(&(&subtotal - &d.amount)),
            None => subtotal.clone(),
        };
        Self {
            cart_id: cart.id,
            customer_id: cart.customer_id,
            item_count: items.iter().map(|i| i64::from(i.quantity)).sum(),
            items,
            subtotal,
            discount,
            total,
        }
    }
}
