use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{Cart, CartItem, NewCartItem};
use crate::domain::catalog::{AddOn, AddOnKind, CatalogVariant, Product, VariantKind};
use crate::domain::customization::Customization;
use crate::domain::errors::DomainError;
use crate::domain::events::CartEvent;
use crate::domain::ports::{
    CartEventSink, CartRepository, CatalogRepository, ContentRepository, PromotionRepository,
};
use crate::domain::promotion::{Coupon, DiscountType, GiftRule};
use crate::schema::{
    cart_event_outbox, cart_items, carts, content_blocks, coupons, eye_hygiene_variants,
    lens_thickness_materials, lens_treatments, photochromic_colors, prescription_sun_colors,
    product_gifts, products, progressive_lens_variants, size_volume_variants,
};

use super::models::{
    CartItemRow, CartRow, CouponRow, EyeHygieneVariantRow, NewCartItemRow, NewCartRow,
    NewOutboxEventRow, ProductGiftRow, ProductRow, SizeVolumeVariantRow,
};

diesel::define_sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Row → domain conversions ──────────────────────────────────────────────────

/// Decodes one of the JSON list columns. A malformed column is logged and
/// read as empty so one bad product row does not break the cart.
fn json_list<T: DeserializeOwned>(value: Option<Value>, column: &str, product_id: i32) -> Vec<T> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed {column} on product {product_id}: {e}");
            Vec::new()
        }),
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            images: json_list(Some(row.images), "images", row.id),
            color_options: json_list(row.color_images, "color_images", row.id),
            calibers: json_list(row.mm_calibers, "mm_calibers", row.id),
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            stock: row.stock,
            is_active: row.is_active,
        }
    }
}

impl From<EyeHygieneVariantRow> for CatalogVariant {
    fn from(row: EyeHygieneVariantRow) -> Self {
        CatalogVariant {
            kind: VariantKind::EyeHygiene,
            id: row.id,
            product_id: row.product_id,
            label: row.name,
            price: row.price,
            stock: row.stock,
            image_url: row.image_url,
            is_active: row.is_active,
        }
    }
}

impl From<SizeVolumeVariantRow> for CatalogVariant {
    fn from(row: SizeVolumeVariantRow) -> Self {
        CatalogVariant {
            kind: VariantKind::SizeVolume,
            id: row.id,
            product_id: row.product_id,
            label: row.size_volume,
            price: row.price,
            stock: row.stock,
            image_url: row.image_url,
            is_active: row.is_active,
        }
    }
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Cart {
            id: row.id,
            customer_id: row.customer_id,
            created_at: row.created_at,
        }
    }
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            customization: Customization::from_json(&row.customization),
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            lens_index: row.lens_index,
            created_at: row.created_at,
        }
    }
}

impl From<ProductGiftRow> for GiftRule {
    fn from(row: ProductGiftRow) -> Self {
        GiftRule {
            id: row.id,
            product_id: row.product_id,
            gift_product_id: row.gift_product_id,
            min_quantity: row.min_quantity,
            max_quantity: row.max_quantity,
            is_active: row.is_active,
        }
    }
}

impl TryFrom<CouponRow> for Coupon {
    type Error = DomainError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let discount_type = DiscountType::parse(&row.discount_type).ok_or_else(|| {
            DomainError::Internal(format!(
                "coupon {} has unknown discount type {:?}",
                row.id, row.discount_type
            ))
        })?;
        Ok(Coupon {
            id: row.id,
            code: row.code,
            discount_type,
            value: row.discount_value,
            min_order_amount: row.min_order_amount,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            is_active: row.is_active,
        })
    }
}

fn add_on(kind: AddOnKind, (id, name, amount): (i32, String, BigDecimal)) -> AddOn {
    AddOn {
        kind,
        id,
        name,
        amount,
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselStore {
    fn find_product(&self, id: i32) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Product::from))
    }

    fn find_variant(
        &self,
        kind: VariantKind,
        product_id: i32,
        id: i32,
    ) -> Result<Option<CatalogVariant>, DomainError> {
        let mut conn = self.pool.get()?;

        let variant = match kind {
            VariantKind::EyeHygiene => eye_hygiene_variants::table
                .filter(eye_hygiene_variants::id.eq(id))
                .filter(eye_hygiene_variants::product_id.eq(product_id))
                .select(EyeHygieneVariantRow::as_select())
                .first(&mut conn)
                .optional()?
                .map(CatalogVariant::from),
            VariantKind::SizeVolume => size_volume_variants::table
                .filter(size_volume_variants::id.eq(id))
                .filter(size_volume_variants::product_id.eq(product_id))
                .select(SizeVolumeVariantRow::as_select())
                .first(&mut conn)
                .optional()?
                .map(CatalogVariant::from),
        };
        Ok(variant)
    }

    fn find_add_on(&self, kind: AddOnKind, id: i32) -> Result<Option<AddOn>, DomainError> {
        let mut conn = self.pool.get()?;

        // Tint colors are priced by adjustment, the other add-ons by price.
        let row: Option<(i32, String, BigDecimal)> = match kind {
            AddOnKind::ProgressiveVariant => progressive_lens_variants::table
                .filter(progressive_lens_variants::id.eq(id))
                .filter(progressive_lens_variants::is_active.eq(true))
                .select((
                    progressive_lens_variants::id,
                    progressive_lens_variants::name,
                    progressive_lens_variants::price,
                ))
                .first(&mut conn)
                .optional()?,
            AddOnKind::LensThicknessMaterial => lens_thickness_materials::table
                .filter(lens_thickness_materials::id.eq(id))
                .filter(lens_thickness_materials::is_active.eq(true))
                .select((
                    lens_thickness_materials::id,
                    lens_thickness_materials::name,
                    lens_thickness_materials::price,
                ))
                .first(&mut conn)
                .optional()?,
            AddOnKind::Treatment => lens_treatments::table
                .filter(lens_treatments::id.eq(id))
                .filter(lens_treatments::is_active.eq(true))
                .select((lens_treatments::id, lens_treatments::name, lens_treatments::price))
                .first(&mut conn)
                .optional()?,
            AddOnKind::PhotochromicColor => photochromic_colors::table
                .filter(photochromic_colors::id.eq(id))
                .filter(photochromic_colors::is_active.eq(true))
                .select((
                    photochromic_colors::id,
                    photochromic_colors::name,
                    photochromic_colors::price_adjustment,
                ))
                .first(&mut conn)
                .optional()?,
            AddOnKind::PrescriptionSunColor => prescription_sun_colors::table
                .filter(prescription_sun_colors::id.eq(id))
                .filter(prescription_sun_colors::is_active.eq(true))
                .select((
                    prescription_sun_colors::id,
                    prescription_sun_colors::name,
                    prescription_sun_colors::price_adjustment,
                ))
                .first(&mut conn)
                .optional()?,
        };

        Ok(row.map(|row| add_on(kind, row)))
    }

    fn find_add_ons(&self, kind: AddOnKind, ids: &[i32]) -> Result<Vec<AddOn>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if kind != AddOnKind::Treatment {
            // Only treatments are selected as a list.
            let mut found = Vec::new();
            for id in ids {
                found.extend(self.find_add_on(kind, *id)?);
            }
            return Ok(found);
        }

        let mut conn = self.pool.get()?;
        let rows: Vec<(i32, String, BigDecimal)> = lens_treatments::table
            .filter(lens_treatments::id.eq_any(ids))
            .filter(lens_treatments::is_active.eq(true))
            .select((lens_treatments::id, lens_treatments::name, lens_treatments::price))
            .order(lens_treatments::id.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(|row| add_on(kind, row)).collect())
    }
}

impl CartRepository for DieselStore {
    fn find_cart(&self, customer_id: i32) -> Result<Option<Cart>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = carts::table
            .filter(carts::customer_id.eq(customer_id))
            .select(CartRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Cart::from))
    }

    fn find_or_create_cart(&self, customer_id: i32) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;

        // The unique customer_id makes concurrent first adds converge on one cart.
        diesel::insert_into(carts::table)
            .values(&NewCartRow { customer_id })
            .on_conflict(carts::customer_id)
            .do_nothing()
            .execute(&mut conn)?;

        let row = carts::table
            .filter(carts::customer_id.eq(customer_id))
            .select(CartRow::as_select())
            .first(&mut conn)?;

        Ok(row.into())
    }

    fn cart_items(&self, cart_id: i32) -> Result<Vec<CartItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = cart_items::table
            .filter(cart_items::cart_id.eq(cart_id))
            .select(CartItemRow::as_select())
            .order(cart_items::id.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    fn insert_item(&self, item: NewCartItem) -> Result<CartItem, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                cart_id: item.cart_id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                lens_index: item.lens_index,
                customization: item.customization.to_json(),
            })
            .returning(CartItemRow::as_returning())
            .get_result(&mut conn)?;

        Ok(row.into())
    }

    fn increment_item(&self, item_id: i32, by: i32) -> Result<CartItem, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::update(cart_items::table.find(item_id))
            .set((
                cart_items::quantity.eq(cart_items::quantity + by),
                cart_items::updated_at.eq(Utc::now()),
            ))
            .returning(CartItemRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or(DomainError::NotFound("Cart item"))?;

        Ok(row.into())
    }

    fn set_item_quantity(&self, item_id: i32, quantity: i32) -> Result<CartItem, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::update(cart_items::table.find(item_id))
            .set((
                cart_items::quantity.eq(quantity),
                cart_items::updated_at.eq(Utc::now()),
            ))
            .returning(CartItemRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or(DomainError::NotFound("Cart item"))?;

        Ok(row.into())
    }

    fn delete_item(&self, item_id: i32) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(cart_items::table.find(item_id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn clear_items(&self, cart_id: i32) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart_id)))
            .execute(&mut conn)?;
        Ok(deleted)
    }
}

impl PromotionRepository for DieselStore {
    fn gift_rules_for(&self, product_id: i32) -> Result<Vec<GiftRule>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = product_gifts::table
            .filter(product_gifts::product_id.eq(product_id))
            .filter(product_gifts::is_active.eq(true))
            .select(ProductGiftRow::as_select())
            .order(product_gifts::id.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(GiftRule::from).collect())
    }

    fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = coupons::table
            .filter(lower(coupons::code).eq(code.trim().to_lowercase()))
            .select(CouponRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Coupon::try_from).transpose()
    }
}

impl CartEventSink for DieselStore {
    fn record(&self, event: &CartEvent) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        // Debezium's EventRouter SMT derives the Kafka topic from `aggregate_type`.
        diesel::insert_into(cart_event_outbox::table)
            .values(&NewOutboxEventRow {
                id: Uuid::new_v4(),
                aggregate_type: CartEvent::AGGREGATE_TYPE.to_string(),
                aggregate_id: event.cart_id().to_string(),
                event_type: event.event_type().to_string(),
                payload: event.payload(),
            })
            .execute(&mut conn)?;

        Ok(())
    }
}

impl ContentRepository for DieselStore {
    fn find_block(&self, key: &str) -> Result<Option<Value>, DomainError> {
        let mut conn = self.pool.get()?;

        let body = content_blocks::table
            .find(key)
            .select(content_blocks::body)
            .first::<Value>(&mut conn)
            .optional()?;

        Ok(body)
    }
}
