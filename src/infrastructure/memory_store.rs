//! In-process implementation of the ports used by the service and HTTP tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde_json::Value;

use crate::domain::cart::{Cart, CartItem, NewCartItem};
use crate::domain::catalog::{AddOn, AddOnKind, CatalogVariant, Product, VariantKind};
use crate::domain::errors::DomainError;
use crate::domain::events::CartEvent;
use crate::domain::ports::{
    CartEventSink, CartRepository, CatalogRepository, ContentRepository, PromotionRepository,
};
use crate::domain::promotion::{Coupon, GiftRule};

#[derive(Default)]
struct State {
    products: HashMap<i32, Product>,
    variants: Vec<CatalogVariant>,
    add_ons: Vec<(AddOn, bool)>,
    gift_rules: Vec<GiftRule>,
    coupons: Vec<Coupon>,
    carts: Vec<Cart>,
    items: Vec<CartItem>,
    events: Vec<CartEvent>,
    content: HashMap<String, Value>,
    next_cart_id: i32,
    next_item_id: i32,
    fail_events: bool,
    fail_gift_rules: bool,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write leaves `State` consistent, so a panic in another test
    /// thread does not invalidate it.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_product(&self, product: Product) {
        self.state().products.insert(product.id, product);
    }

    pub fn insert_variant(&self, variant: CatalogVariant) {
        self.state().variants.push(variant);
    }

    pub fn insert_add_on(&self, add_on: AddOn, is_active: bool) {
        self.state().add_ons.push((add_on, is_active));
    }

    pub fn insert_gift_rule(&self, rule: GiftRule) {
        self.state().gift_rules.push(rule);
    }

    pub fn insert_coupon(&self, coupon: Coupon) {
        self.state().coupons.push(coupon);
    }

    pub fn insert_content(&self, key: &str, body: Value) {
        self.state().content.insert(key.to_string(), body);
    }

    pub fn events(&self) -> Vec<CartEvent> {
        self.state().events.clone()
    }

    /// Makes every event write fail, to exercise best-effort publishing.
    pub fn fail_event_writes(&self) {
        self.state().fail_events = true;
    }

    /// Makes every gift rule lookup fail.
    pub fn fail_gift_rule_reads(&self) {
        self.state().fail_gift_rules = true;
    }
}

impl CatalogRepository for InMemoryStore {
    fn find_product(&self, id: i32) -> Result<Option<Product>, DomainError> {
        Ok(self.state().products.get(&id).cloned())
    }

    fn find_variant(
        &self,
        kind: VariantKind,
        product_id: i32,
        id: i32,
    ) -> Result<Option<CatalogVariant>, DomainError> {
        Ok(self
            .state()
            .variants
            .iter()
            .find(|v| v.kind == kind && v.product_id == product_id && v.id == id)
            .cloned())
    }

    fn find_add_on(&self, kind: AddOnKind, id: i32) -> Result<Option<AddOn>, DomainError> {
        Ok(self
            .state()
            .add_ons
            .iter()
            .find(|(a, active)| *active && a.kind == kind && a.id == id)
            .map(|(a, _)| a.clone()))
    }

    fn find_add_ons(&self, kind: AddOnKind, ids: &[i32]) -> Result<Vec<AddOn>, DomainError> {
        let state = self.state();
        let mut found: Vec<AddOn> = state
            .add_ons
            .iter()
            .filter(|(a, active)| *active && a.kind == kind && ids.contains(&a.id))
            .map(|(a, _)| a.clone())
            .collect();
        found.sort_by_key(|a| a.id);
        Ok(found)
    }
}

impl CartRepository for InMemoryStore {
    fn find_cart(&self, customer_id: i32) -> Result<Option<Cart>, DomainError> {
        Ok(self
            .state()
            .carts
            .iter()
            .find(|c| c.customer_id == customer_id)
            .cloned())
    }

    fn find_or_create_cart(&self, customer_id: i32) -> Result<Cart, DomainError> {
        let mut state = self.state();
        if let Some(cart) = state.carts.iter().find(|c| c.customer_id == customer_id) {
            return Ok(cart.clone());
        }
        state.next_cart_id += 1;
        let cart = Cart {
            id: state.next_cart_id,
            customer_id,
            created_at: Utc::now(),
        };
        state.carts.push(cart.clone());
        Ok(cart)
    }

    fn cart_items(&self, cart_id: i32) -> Result<Vec<CartItem>, DomainError> {
        Ok(self
            .state()
            .items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect())
    }

    fn insert_item(&self, item: NewCartItem) -> Result<CartItem, DomainError> {
        let mut state = self.state();
        state.next_item_id += 1;
        let row = CartItem {
            id: state.next_item_id,
            cart_id: item.cart_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            lens_index: item.lens_index,
            customization: item.customization,
            created_at: Utc::now(),
        };
        state.items.push(row.clone());
        Ok(row)
    }

    fn increment_item(&self, item_id: i32, by: i32) -> Result<CartItem, DomainError> {
        let mut state = self.state();
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(DomainError::NotFound("Cart item"))?;
        item.quantity = item
            .quantity
            .checked_add(by)
            .ok_or_else(|| DomainError::InvalidInput("Quantity is too large".to_string()))?;
        Ok(item.clone())
    }

    fn set_item_quantity(&self, item_id: i32, quantity: i32) -> Result<CartItem, DomainError> {
        let mut state = self.state();
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(DomainError::NotFound("Cart item"))?;
        item.quantity = quantity;
        Ok(item.clone())
    }

    fn delete_item(&self, item_id: i32) -> Result<bool, DomainError> {
        let mut state = self.state();
        let before = state.items.len();
        state.items.retain(|i| i.id != item_id);
        Ok(state.items.len() < before)
    }

    fn clear_items(&self, cart_id: i32) -> Result<usize, DomainError> {
        let mut state = self.state();
        let before = state.items.len();
        state.items.retain(|i| i.cart_id != cart_id);
        Ok(before - state.items.len())
    }
}

impl PromotionRepository for InMemoryStore {
    fn gift_rules_for(&self, product_id: i32) -> Result<Vec<GiftRule>, DomainError> {
        let state = self.state();
        if state.fail_gift_rules {
            return Err(DomainError::Internal("gift rules unavailable".to_string()));
        }
        Ok(state
            .gift_rules
            .iter()
            .filter(|r| r.product_id == product_id && r.is_active)
            .cloned()
            .collect())
    }

    fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, DomainError> {
        Ok(self
            .state()
            .coupons
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
            .cloned())
    }
}

impl CartEventSink for InMemoryStore {
    fn record(&self, event: &CartEvent) -> Result<(), DomainError> {
        let mut state = self.state();
        if state.fail_events {
            return Err(DomainError::Internal("outbox unavailable".to_string()));
        }
        state.events.push(event.clone());
        Ok(())
    }
}

impl ContentRepository for InMemoryStore {
    fn find_block(&self, key: &str) -> Result<Option<Value>, DomainError> {
        Ok(self.state().content.get(key).cloned())
    }
}
