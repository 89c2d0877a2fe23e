use bigdecimal::BigDecimal;
use serde_json::{json, Value};

/// Cart activity relayed to the admin notification channel through the
/// outbox table.
#[derive(Debug, Clone)]
pub enum CartEvent {
    ItemAdded {
        cart_id: i32,
        customer_id: i32,
        item_id: i32,
        product_id: i32,
        quantity: i32,
        unit_price: BigDecimal,
        merged: bool,
    },
    GiftAttached {
        cart_id: i32,
        customer_id: i32,
        item_id: i32,
        gift_product_id: i32,
        for_product_id: i32,
    },
}

impl CartEvent {
    pub const AGGREGATE_TYPE: &'static str = "Cart";

    pub fn cart_id(&self) -> i32 {
        match self {
            Self::ItemAdded { cart_id, .. } | Self::GiftAttached { cart_id, .. } => *cart_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ItemAdded { .. } => "CartItemAdded",
            Self::GiftAttached { .. } => "GiftAttached",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Self::ItemAdded {
                cart_id,
                customer_id,
                item_id,
                product_id,
                quantity,
                unit_price,
                merged,
            } => json!({
                "cart_id": cart_id,
                "customer_id": customer_id,
                "item_id": item_id,
                "product_id": product_id,
                "quantity": quantity,
                "unit_price": unit_price.to_string(),
                "merged": merged
            }),
            Self::GiftAttached {
                cart_id,
                customer_id,
                item_id,
                gift_product_id,
                for_product_id,
            } => json!({
                "cart_id": cart_id,
                "customer_id": customer_id,
                "item_id": item_id,
                "gift_product_id": gift_product_id,
                "for_product_id": for_product_id
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn item_added_payload_carries_price_as_string() {
        let event = CartEvent::ItemAdded {
            cart_id: 3,
            customer_id: 42,
            item_id: 11,
            product_id: 7,
            quantity: 2,
            unit_price: BigDecimal::from_str("115.00").expect("valid decimal"),
            merged: true,
        };

        let payload = event.payload();

        assert_eq!(event.event_type(), "CartItemAdded");
        assert_eq!(event.cart_id(), 3);
        assert_eq!(payload["unit_price"], "115.00");
        assert_eq!(payload["merged"], true);
    }
}
