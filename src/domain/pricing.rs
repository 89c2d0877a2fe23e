use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, RoundingMode, Zero};

use super::catalog::AddOn;

/// Rounds a money amount half-up to cents. The result always carries two
/// decimal places, zero included.
pub fn round_money(amount: &BigDecimal) -> BigDecimal {
    let rounded = amount.with_scale_round(2, RoundingMode::HalfUp);
    if rounded.is_zero() {
        // with_scale_round collapses zero to scale 0.
        BigDecimal::new(BigInt::from(0), 2)
    } else {
        rounded
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub base: BigDecimal,
    pub add_ons: Vec<AddOn>,
    pub total: BigDecimal,
}

/// `base` plus every add-on amount, rounded to cents. Addition is the only
/// operation, so the order of `add_ons` never changes the total.
pub fn accumulate(base: &BigDecimal, add_ons: Vec<AddOn>) -> PriceBreakdown {
    let sum = add_ons
        .iter()
        .fold(base.clone(), |total, add_on| total + &add_on.amount);

    PriceBreakdown {
        base: round_money(base),
        add_ons,
        total: round_money(&sum),
    }
}
