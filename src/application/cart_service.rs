use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::domain::cart::{find_mergeable, Cart, CartItem, CartView, MergeKey, NewCartItem};
use crate::domain::catalog::{AddOn, AddOnKind, Product};
use crate::domain::customization::{Customization, LensSelection, VariantSelection};
use crate::domain::errors::DomainError;
use crate::domain::events::CartEvent;
use crate::domain::ports::CartStore;
use crate::domain::pricing::{self, PriceBreakdown};
use crate::domain::promotion::{AppliedDiscount, GiftRule};
use crate::domain::variant::{self, ResolvedVariant, VariantRequest};

#[derive(Debug, Clone)]
pub struct AddToCart {
    pub product_id: i32,
    pub quantity: i32,
    pub lens_index: Option<BigDecimal>,
    pub variant: VariantRequest,
    pub lens: LensSelection,
    pub prescription_id: Option<i32>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AddToCartOutcome {
    /// The created line, or the existing line after its quantity was bumped.
    pub item: CartItem,
    pub merged: bool,
    pub gifts: Vec<CartItem>,
    pub cart: CartView,
}

#[derive(Debug, Clone)]
pub struct CustomizationQuote {
    pub product_id: i32,
    pub variant: Option<VariantSelection>,
    pub breakdown: PriceBreakdown,
}

pub struct CartService<S: ?Sized = dyn CartStore> {
    store: Arc<S>,
}

impl<S: CartStore + ?Sized> CartService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Adds a configured product to the customer's cart, creating the cart on
    /// first use. The unit price is computed once here and stored on the line.
    pub fn add_to_cart(
        &self,
        customer_id: i32,
        request: AddToCart,
    ) -> Result<AddToCartOutcome, DomainError> {
        if request.quantity < 1 {
            return Err(DomainError::InvalidInput(
                "quantity must be at least 1".to_string(),
            ));
        }

        let product = self.available_product(request.product_id)?;
        let (resolved, breakdown) = self.price(&product, &request.variant, &request.lens)?;

        let limit = stock_limit(&product, resolved.as_ref());
        ensure_in_stock(&product, Some(request.quantity), limit)?;

        let customization = Customization {
            variant: resolved.map(|r| r.selection),
            lens: request.lens.clone(),
            add_ons: breakdown.add_ons.clone(),
            prescription_id: request.prescription_id,
            ..Customization::default()
        };

        let cart = self.store.find_or_create_cart(customer_id)?;
        let existing = self.store.cart_items(cart.id)?;
        let key = MergeKey::new(product.id, request.lens_index.clone(), &customization);

        let (item, merged) = match find_mergeable(&existing, &key) {
            Some(line) => {
                // The merged line keeps its own variant, so its stock bounds the total.
                let limit = self.stock_for(&product, line.customization.variant.as_ref())?;
                ensure_in_stock(&product, line.quantity.checked_add(request.quantity), limit)?;
                (self.store.increment_item(line.id, request.quantity)?, true)
            }
            None => {
                let line = self.store.insert_item(NewCartItem {
                    cart_id: cart.id,
                    product_id: product.id,
                    quantity: request.quantity,
                    unit_price: breakdown.total.clone(),
                    lens_index: request.lens_index.clone(),
                    customization,
                })?;
                (line, false)
            }
        };
        log::info!(
            "Cart {} {} product {} (line {}, quantity {})",
            cart.id,
            if merged { "merged" } else { "added" },
            product.id,
            item.id,
            item.quantity
        );

        self.publish(&CartEvent::ItemAdded {
            cart_id: cart.id,
            customer_id,
            item_id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
            merged,
        });

        let gifts = self.attach_gifts(&cart, &item);
        let view = self.view(&cart, request.coupon_code.as_deref())?;

        Ok(AddToCartOutcome {
            item,
            merged,
            gifts,
            cart: view,
        })
    }

    /// Price quote for a configuration, without touching any cart.
    pub fn calculate_customization_price(
        &self,
        product_id: i32,
        variant: &VariantRequest,
        lens: &LensSelection,
    ) -> Result<CustomizationQuote, DomainError> {
        let product = self.available_product(product_id)?;
        let (resolved, breakdown) = self.price(&product, variant, lens)?;
        Ok(CustomizationQuote {
            product_id,
            variant: resolved.map(|r| r.selection),
            breakdown,
        })
    }

    pub fn get_cart(
        &self,
        customer_id: i32,
        coupon_code: Option<&str>,
    ) -> Result<CartView, DomainError> {
        let cart = self.customer_cart(customer_id)?;
        self.view(&cart, coupon_code)
    }

    pub fn update_item_quantity(
        &self,
        customer_id: i32,
        item_id: i32,
        quantity: i32,
    ) -> Result<CartView, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidInput(
                "quantity must be at least 1".to_string(),
            ));
        }
        let cart = self.customer_cart(customer_id)?;
        let item = self.owned_item(&cart, item_id)?;
        let product = self
            .store
            .find_product(item.product_id)?
            .ok_or(DomainError::NotFound("Product"))?;
        let limit = self.stock_for(&product, item.customization.variant.as_ref())?;
        ensure_in_stock(&product, Some(quantity), limit)?;
        self.store.set_item_quantity(item_id, quantity)?;
        self.view(&cart, None)
    }

    pub fn remove_item(&self, customer_id: i32, item_id: i32) -> Result<CartView, DomainError> {
        let cart = self.customer_cart(customer_id)?;
        self.owned_item(&cart, item_id)?;
        if !self.store.delete_item(item_id)? {
            return Err(DomainError::NotFound("Cart item"));
        }
        self.view(&cart, None)
    }

    pub fn clear_cart(&self, customer_id: i32) -> Result<CartView, DomainError> {
        let cart = self.customer_cart(customer_id)?;
        let removed = self.store.clear_items(cart.id)?;
        log::info!("Cleared {removed} line(s) from cart {}", cart.id);
        self.view(&cart, None)
    }

    fn available_product(&self, product_id: i32) -> Result<Product, DomainError> {
        let product = self
            .store
            .find_product(product_id)?
            .ok_or(DomainError::NotFound("Product"))?;
        if !product.is_active {
            return Err(DomainError::InvalidInput(format!(
                "product {product_id} is not available"
            )));
        }
        Ok(product)
    }

    fn customer_cart(&self, customer_id: i32) -> Result<Cart, DomainError> {
        self.store
            .find_cart(customer_id)?
            .ok_or(DomainError::NotFound("Cart"))
    }

    fn owned_item(&self, cart: &Cart, item_id: i32) -> Result<CartItem, DomainError> {
        self.store
            .cart_items(cart.id)?
            .into_iter()
            .find(|item| item.id == item_id)
            .ok_or(DomainError::NotFound("Cart item"))
    }

    fn price(
        &self,
        product: &Product,
        request: &VariantRequest,
        lens: &LensSelection,
    ) -> Result<(Option<ResolvedVariant>, PriceBreakdown), DomainError> {
        let resolved = self.resolve(product, request)?;

        let base = resolved
            .as_ref()
            .map_or(&product.price, ResolvedVariant::price)
            .clone();
        let add_ons = self.collect_add_ons(lens)?;

        Ok((resolved, pricing::accumulate(&base, add_ons)))
    }

    fn resolve(
        &self,
        product: &Product,
        request: &VariantRequest,
    ) -> Result<Option<ResolvedVariant>, DomainError> {
        let catalog_variant = match request.catalog_reference() {
            Some((kind, id)) => self.store.find_variant(kind, product.id, id)?,
            None => None,
        };
        Ok(variant::resolve(product, request, catalog_variant.as_ref()))
    }

    /// Stock bounding a line that was stored with `selection`. The selection
    /// is resolved again so the current catalog figure applies.
    fn stock_for(
        &self,
        product: &Product,
        selection: Option<&VariantSelection>,
    ) -> Result<i32, DomainError> {
        let resolved = match selection {
            Some(selection) => self.resolve(product, &VariantRequest::from(selection))?,
            None => None,
        };
        Ok(stock_limit(product, resolved.as_ref()))
    }

    /// Looks every requested add-on up on its own; ids that do not resolve
    /// are skipped.
    fn collect_add_ons(&self, lens: &LensSelection) -> Result<Vec<AddOn>, DomainError> {
        let singles = [
            (AddOnKind::ProgressiveVariant, lens.progressive_variant_id),
            (AddOnKind::LensThicknessMaterial, lens.lens_thickness_material_id),
            (AddOnKind::PhotochromicColor, lens.photochromic_color_id),
            (AddOnKind::PrescriptionSunColor, lens.prescription_sun_color_id),
        ];

        let mut add_ons = Vec::new();
        for (kind, id) in singles {
            let Some(id) = id else { continue };
            match self.store.find_add_on(kind, id)? {
                Some(add_on) => add_ons.push(add_on),
                None => log::debug!("Skipping unknown {} {id}", kind.as_str()),
            }
        }

        let treatment_ids = lens.normalized().treatment_ids;
        if !treatment_ids.is_empty() {
            let treatments = self.store.find_add_ons(AddOnKind::Treatment, &treatment_ids)?;
            for id in &treatment_ids {
                if !treatments.iter().any(|t| t.id == *id) {
                    log::debug!("Skipping unknown treatment {id}");
                }
            }
            add_ons.extend(treatments);
        }

        Ok(add_ons)
    }

    /// Attaches the free items `item` qualifies for. Failures are logged per
    /// rule and never reach the caller.
    fn attach_gifts(&self, cart: &Cart, item: &CartItem) -> Vec<CartItem> {
        let rules = match self.store.gift_rules_for(item.product_id) {
            Ok(rules) => rules,
            Err(e) => {
                log::warn!("Could not load gift rules for product {}: {e}", item.product_id);
                return Vec::new();
            }
        };

        rules
            .iter()
            .filter(|rule| rule.applies_to(item.quantity))
            .filter_map(|rule| match self.attach_gift(cart, rule) {
                Ok(gift) => gift,
                Err(e) => {
                    log::warn!("Skipping gift rule {}: {e}", rule.id);
                    None
                }
            })
            .collect()
    }

    fn attach_gift(&self, cart: &Cart, rule: &GiftRule) -> Result<Option<CartItem>, DomainError> {
        let Some(gift) = self.store.find_product(rule.gift_product_id)? else {
            log::debug!("Gift product {} of rule {} is gone", rule.gift_product_id, rule.id);
            return Ok(None);
        };
        if !gift.is_active || gift.stock <= 0 {
            return Ok(None);
        }

        // A zero-priced line of the gift product means it is already attached.
        let zero = BigDecimal::from(0);
        let already_attached = self
            .store
            .cart_items(cart.id)?
            .iter()
            .any(|line| line.product_id == gift.id && line.unit_price == zero);
        if already_attached {
            return Ok(None);
        }

        let line = self.store.insert_item(NewCartItem {
            cart_id: cart.id,
            product_id: gift.id,
            quantity: 1,
            unit_price: zero,
            lens_index: None,
            customization: Customization::gift_for(rule.product_id),
        })?;

        self.publish(&CartEvent::GiftAttached {
            cart_id: cart.id,
            customer_id: cart.customer_id,
            item_id: line.id,
            gift_product_id: gift.id,
            for_product_id: rule.product_id,
        });
        Ok(Some(line))
    }

    fn view(&self, cart: &Cart, coupon_code: Option<&str>) -> Result<CartView, DomainError> {
        let view = CartView::new(cart, self.store.cart_items(cart.id)?, None);
        match coupon_code.and_then(|code| self.apply_coupon(code, &view.subtotal)) {
            Some(discount) => Ok(CartView::new(cart, view.items, Some(discount))),
            None => Ok(view),
        }
    }

    /// Coupon lookups never fail a request; an unusable code yields no
    /// discount.
    fn apply_coupon(&self, code: &str, subtotal: &BigDecimal) -> Option<AppliedDiscount> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        match self.store.find_coupon(code) {
            Ok(Some(coupon)) => coupon.evaluate(subtotal, Utc::now()),
            Ok(None) => {
                log::debug!("Unknown coupon code {code:?}");
                None
            }
            Err(e) => {
                log::warn!("Coupon lookup for {code:?} failed: {e}");
                None
            }
        }
    }

    fn publish(&self, event: &CartEvent) {
        if let Err(e) = self.store.record(event) {
            log::warn!(
                "Could not record {} for cart {}: {e}",
                event.event_type(),
                event.cart_id()
            );
        }
    }
}

/// The variant's own stock when it tracks one, the product's otherwise.
fn stock_limit(product: &Product, resolved: Option<&ResolvedVariant>) -> i32 {
    resolved.and_then(|r| r.stock).unwrap_or(product.stock)
}

/// `quantity` is `None` when computing it overflowed, which no stock covers.
fn ensure_in_stock(
    product: &Product,
    quantity: Option<i32>,
    limit: i32,
) -> Result<(), DomainError> {
    match quantity {
        Some(quantity) if quantity <= limit => Ok(()),
        _ => Err(DomainError::InvalidInput(format!(
            "only {} of product {} in stock",
            limit.max(0),
            product.id
        ))),
    }
}
