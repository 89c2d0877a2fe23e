use serde_json::Value;

use super::cart::{Cart, CartItem, NewCartItem};
use super::catalog::{AddOn, AddOnKind, CatalogVariant, Product, VariantKind};
use super::errors::DomainError;
use super::events::CartEvent;
use super::promotion::{Coupon, GiftRule};

pub trait CatalogRepository: Send + Sync + 'static {
    fn find_product(&self, id: i32) -> Result<Option<Product>, DomainError>;
    fn find_variant(
        &self,
        kind: VariantKind,
        product_id: i32,
        id: i32,
    ) -> Result<Option<CatalogVariant>, DomainError>;
    /// Active add-on of `kind` with the given id.
    fn find_add_on(&self, kind: AddOnKind, id: i32) -> Result<Option<AddOn>, DomainError>;
    /// Active add-ons of `kind` among `ids`; unknown ids are left out.
    fn find_add_ons(&self, kind: AddOnKind, ids: &[i32]) -> Result<Vec<AddOn>, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    fn find_cart(&self, customer_id: i32) -> Result<Option<Cart>, DomainError>;
    fn find_or_create_cart(&self, customer_id: i32) -> Result<Cart, DomainError>;
    fn cart_items(&self, cart_id: i32) -> Result<Vec<CartItem>, DomainError>;
    fn insert_item(&self, item: NewCartItem) -> Result<CartItem, DomainError>;
    /// Adds `by` to the stored quantity in a single statement.
    fn increment_item(&self, item_id: i32, by: i32) -> Result<CartItem, DomainError>;
    fn set_item_quantity(&self, item_id: i32, quantity: i32) -> Result<CartItem, DomainError>;
    fn delete_item(&self, item_id: i32) -> Result<bool, DomainError>;
    fn clear_items(&self, cart_id: i32) -> Result<usize, DomainError>;
}

pub trait PromotionRepository: Send + Sync + 'static {
    /// Active gift rules triggered by `product_id`.
    fn gift_rules_for(&self, product_id: i32) -> Result<Vec<GiftRule>, DomainError>;
    /// Coupon whose code matches case-insensitively.
    fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, DomainError>;
}

pub trait CartEventSink: Send + Sync + 'static {
    fn record(&self, event: &CartEvent) -> Result<(), DomainError>;
}

pub trait ContentRepository: Send + Sync + 'static {
    fn find_block(&self, key: &str) -> Result<Option<Value>, DomainError>;
}

/// Everything the cart service reads and writes.
pub trait CartStore: CatalogRepository + CartRepository + PromotionRepository + CartEventSink {}

impl<T> CartStore for T where T: CatalogRepository + CartRepository + PromotionRepository + CartEventSink {}
