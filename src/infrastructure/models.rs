use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::schema::{
    cart_event_outbox, cart_items, carts, coupons, eye_hygiene_variants, product_gifts, products,
    size_volume_variants,
};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub is_active: bool,
    pub images: Value,
    pub color_images: Option<Value>,
    pub mm_calibers: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub is_active: bool,
    pub images: Value,
    pub color_images: Option<Value>,
    pub mm_calibers: Option<Value>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = eye_hygiene_variants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EyeHygieneVariantRow {
    pub id: i32,
    pub product_id: i32,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = size_volume_variants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SizeVolumeVariantRow {
    pub id: i32,
    pub product_id: i32,
    pub size_volume: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: i32,
    pub customer_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub customer_id: i32,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = cart_items)]
#[diesel(belongs_to(CartRow, foreign_key = cart_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub lens_index: Option<BigDecimal>,
    pub customization: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItemRow {
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub lens_index: Option<BigDecimal>,
    pub customization: Value,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = product_gifts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductGiftRow {
    pub id: i32,
    pub product_id: i32,
    pub gift_product_id: i32,
    pub min_quantity: i32,
    pub max_quantity: Option<i32>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = product_gifts)]
pub struct NewProductGiftRow {
    pub product_id: i32,
    pub gift_product_id: i32,
    pub min_quantity: i32,
    pub max_quantity: Option<i32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CouponRow {
    pub id: i32,
    pub code: String,
    pub discount_type: String,
    pub discount_value: BigDecimal,
    pub min_order_amount: Option<BigDecimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = coupons)]
pub struct NewCouponRow {
    pub code: String,
    pub discount_type: String,
    pub discount_value: BigDecimal,
    pub min_order_amount: Option<BigDecimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = cart_event_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_event_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}
