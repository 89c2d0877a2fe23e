use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pricing::round_money;

/// Buying `min_quantity..=max_quantity` of `product_id` bundles one free
/// `gift_product_id`.
#[derive(Debug, Clone)]
pub struct GiftRule {
    pub id: i32,
    pub product_id: i32,
    pub gift_product_id: i32,
    pub min_quantity: i32,
    /// Unbounded when `None`.
    pub max_quantity: Option<i32>,
    pub is_active: bool,
}

impl GiftRule {
    pub fn applies_to(&self, quantity: i32) -> bool {
        self.is_active
            && quantity >= self.min_quantity
            && self.max_quantity.map_or(true, |max| quantity <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
    FreeShipping,
}

impl DiscountType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" => Some(Self::Percentage),
            "fixed" => Some(Self::Fixed),
            "free_shipping" => Some(Self::FreeShipping),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Coupon {
    pub id: i32,
    pub code: String,
    pub discount_type: DiscountType,
    pub value: BigDecimal,
    pub min_order_amount: Option<BigDecimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount {
    pub code: String,
    pub amount: BigDecimal,
    pub free_shipping: bool,
}

impl Coupon {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at.map_or(true, |starts| starts <= now)
            && self.ends_at.map_or(true, |ends| now <= ends)
    }

    /// The discount this coupon grants on `subtotal` at `now`, or `None` when
    /// it is inactive, outside its window or below its minimum order.
    pub fn evaluate(&self, subtotal: &BigDecimal, now: DateTime<Utc>) -> Option<AppliedDiscount> {
        if !self.is_live(now) {
            return None;
        }
        if self
            .min_order_amount
            .as_ref()
            .is_some_and(|min| subtotal < min)
        {
            return None;
        }

        let (amount, free_shipping) = match self.discount_type {
            DiscountType::Percentage => {
                let raw = subtotal * &self.value / BigDecimal::from(100);
                (round_money(&raw).min(subtotal.clone()), false)
            }
            DiscountType::Fixed => (round_money(&self.value.clone().min(subtotal.clone())), false),
            DiscountType::FreeShipping => (round_money(&BigDecimal::from(0)), true),
        };

        Some(AppliedDiscount {
            code: self.code.clone(),
            amount,
            free_shipping,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Duration;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn coupon(discount_type: DiscountType, value: &str) -> Coupon {
        Coupon {
            id: 1,
            code: "SPRING".to_string(),
            discount_type,
            value: dec(value),
            min_order_amount: None,
            starts_at: None,
            ends_at: None,
            is_active: true,
        }
    }

    #[test]
    fn percentage_discount_is_rounded() {
        let d = coupon(DiscountType::Percentage, "15")
            .evaluate(&dec("99.99"), Utc::now())
            .expect("applies");
        assert_eq!(d.amount.to_string(), "15.00");
        assert!(!d.free_shipping);
    }

    #[test]
    fn fixed_discount_is_capped_at_subtotal() {
        let d = coupon(DiscountType::Fixed, "50.00")
            .evaluate(&dec("30.00"), Utc::now())
            .expect("applies");
        assert_eq!(d.amount, dec("30.00"));
    }

    #[test]
    fn free_shipping_has_zero_amount() {
        let d = coupon(DiscountType::FreeShipping, "0")
            .evaluate(&dec("30.00"), Utc::now())
            .expect("applies");
        assert_eq!(d.amount.to_string(), "0.00");
        assert!(d.free_shipping);
    }

    #[test]
    fn coupon_outside_window_never_applies() {
        let now = Utc::now();
        let mut not_started = coupon(DiscountType::Fixed, "5");
        not_started.starts_at = Some(now + Duration::days(1));
        let mut expired = coupon(DiscountType::Percentage, "10");
        expired.ends_at = Some(now - Duration::seconds(1));

        for subtotal in ["0.00", "10.00", "5000.00"] {
            assert!(not_started.evaluate(&dec(subtotal), now).is_none());
            assert!(expired.evaluate(&dec(subtotal), now).is_none());
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Fixed, "5");
        c.starts_at = Some(now);
        c.ends_at = Some(now);
        assert!(c.evaluate(&dec("10.00"), now).is_some());
    }

    #[test]
    fn minimum_order_amount_is_enforced() {
        let mut c = coupon(DiscountType::Fixed, "5");
        c.min_order_amount = Some(dec("50.00"));

        assert!(c.evaluate(&dec("49.99"), Utc::now()).is_none());
        assert!(c.evaluate(&dec("50.00"), Utc::now()).is_some());
    }

    #[test]
    fn inactive_coupon_never_applies() {
        let mut c = coupon(DiscountType::Fixed, "5");
        c.is_active = false;
        assert!(c.evaluate(&dec("10.00"), Utc::now()).is_none());
    }

    #[test]
    fn gift_rule_bounds() {
        let rule = GiftRule {
            id: 1,
            product_id: 7,
            gift_product_id: 3,
            min_quantity: 2,
            max_quantity: Some(4),
            is_active: true,
        };
        assert!(!rule.applies_to(1));
        assert!(rule.applies_to(2));
        assert!(rule.applies_to(4));
        assert!(!rule.applies_to(5));

        let open_ended = GiftRule {
            max_quantity: None,
            ..rule
        };
        assert!(open_ended.applies_to(500));
    }

    #[test]
    fn discount_type_parsing() {
        assert_eq!(DiscountType::parse("Percentage"), Some(DiscountType::Percentage));
        assert_eq!(DiscountType::parse("free_shipping"), Some(DiscountType::FreeShipping));
        assert_eq!(DiscountType::parse("bogo"), None);
    }
}
