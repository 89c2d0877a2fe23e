//! HTTP tests for the cart, pricing and content endpoints, served over the
//! in-memory store.

use std::str::FromStr;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use bigdecimal::BigDecimal;
use serde_json::{json, Value};

use eyewear_cart::application::cart_service::CartService;
use eyewear_cart::application::content_service::{ContentService, StaticContent};
use eyewear_cart::configure_routes;
use eyewear_cart::domain::catalog::{AddOn, AddOnKind, CaliberOption, ColorOption, Product};
use eyewear_cart::domain::ports::CartStore;
use eyewear_cart::domain::promotion::{Coupon, DiscountType, GiftRule};
use eyewear_cart::infrastructure::memory_store::InMemoryStore;

const FRAME: i32 = 1;
const CASE: i32 = 2;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).expect("valid decimal")
}

fn seeded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    store.insert_product(Product {
        id: FRAME,
        name: "Aviator".to_string(),
        category: "glasses".to_string(),
        price: dec("100.00"),
        stock: 10,
        is_active: true,
        images: vec!["aviator.jpg".to_string()],
        color_options: vec![ColorOption {
            hex: Some("#000000".to_string()),
            name: "Negro".to_string(),
            images: vec!["aviator-black.jpg".to_string()],
            price: Some(dec("110.00")),
            stock: None,
        }],
        calibers: vec![CaliberOption {
            mm: "52".to_string(),
            price: Some(dec("105.00")),
            image_url: None,
            stock: Some(3),
        }],
    });
    store.insert_product(Product {
        id: CASE,
        name: "Hard case".to_string(),
        category: "accessories".to_string(),
        price: dec("20.00"),
        stock: 5,
        is_active: true,
        images: vec![],
        color_options: vec![],
        calibers: vec![],
    });
    for (kind, id, name, amount) in [
        (AddOnKind::Treatment, 1, "Anti-reflective", "10.00"),
        (AddOnKind::Treatment, 2, "Blue light", "5.00"),
        (AddOnKind::LensThicknessMaterial, 1, "1.67 high index", "15.00"),
    ] {
        store.insert_add_on(
            AddOn {
                kind,
                id,
                name: name.to_string(),
                amount: dec(amount),
            },
            true,
        );
    }
    store.insert_gift_rule(GiftRule {
        id: 1,
        product_id: FRAME,
        gift_product_id: CASE,
        min_quantity: 1,
        max_quantity: None,
        is_active: true,
    });
    store.insert_coupon(Coupon {
        id: 1,
        code: "SAVE10".to_string(),
        discount_type: DiscountType::Percentage,
        value: dec("10"),
        min_order_amount: None,
        starts_at: None,
        ends_at: None,
        is_active: true,
    });
    store.insert_content("home_hero", json!({ "title": "Summer collection" }));
    Arc::new(store)
}

fn app(
    store: Arc<InMemoryStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cart_store: Arc<dyn CartStore> = store.clone();
    let defaults = StaticContent::bundled().expect("bundled content parses");
    App::new()
        .app_data(web::Data::new(CartService::new(cart_store)))
        .app_data(web::Data::new(ContentService::new(store, defaults)))
        .configure(configure_routes)
}

fn add_request(customer_id: i32, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/customers/{customer_id}/cart/items"))
        .set_json(body)
}

#[actix_web::test]
async fn health_reports_ok() {
    let app = test::init_service(app(seeded_store())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn add_prices_lens_add_ons_and_attaches_gift() {
    let app = test::init_service(app(seeded_store())).await;

    let resp = test::call_service(
        &app,
        add_request(
            5,
            json!({
                "product_id": FRAME,
                "lens_index": "1.67",
                "treatment_ids": [2, 1],
                "lens_thickness_material_id": 1
            }),
        )
        .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["merged"], false);
    assert_eq!(body["item"]["unit_price"], "130.00");
    assert_eq!(body["item"]["lens_index"], "1.67");
    assert_eq!(body["gifts"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["gifts"][0]["product_id"], CASE);
    assert_eq!(body["gifts"][0]["unit_price"], "0.00");
    assert_eq!(body["gifts"][0]["is_gift"], true);
    assert_eq!(body["cart"]["item_count"], 2);
    assert_eq!(body["cart"]["subtotal"], "130.00");
    assert_eq!(body["cart"]["total"], "130.00");
}

#[actix_web::test]
async fn repeated_add_merges_and_gift_is_not_duplicated() {
    let app = test::init_service(app(seeded_store())).await;
    let body = json!({ "product_id": FRAME, "selected_color": "#000000" });

    let first = test::call_service(&app, add_request(5, body.clone()).to_request()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = test::call_service(&app, add_request(5, body).to_request()).await;
    assert_eq!(second.status(), StatusCode::CREATED);
    let second: Value = test::read_body_json(second).await;

    assert_eq!(second["merged"], true);
    assert_eq!(second["item"]["quantity"], 2);
    assert_eq!(second["item"]["unit_price"], "110.00");
    assert_eq!(second["item"]["customization"]["variant"]["variant_type"], "color");
    assert_eq!(second["gifts"].as_array().map(Vec::len), Some(0));
    assert_eq!(second["cart"]["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(second["cart"]["subtotal"], "220.00");
}

#[actix_web::test]
async fn caliber_selection_uses_caliber_price() {
    let app = test::init_service(app(seeded_store())).await;

    let resp = test::call_service(
        &app,
        add_request(5, json!({ "product_id": FRAME, "selected_mm_caliber": "52" })).to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["item"]["unit_price"], "105.00");
}

#[actix_web::test]
async fn invalid_add_requests_are_rejected() {
    let app = test::init_service(app(seeded_store())).await;

    let cases = [
        (json!({ "product_id": FRAME, "quantity": 0 }), StatusCode::BAD_REQUEST),
        (json!({ "product_id": FRAME, "quantity": 11 }), StatusCode::BAD_REQUEST),
        (json!({ "product_id": FRAME, "lens_index": "thin" }), StatusCode::BAD_REQUEST),
        (
            json!({ "product_id": FRAME, "selected_variant_id": 1, "variant_type": "color" }),
            StatusCode::BAD_REQUEST,
        ),
        (json!({ "product_id": 999 }), StatusCode::NOT_FOUND),
    ];

    for (body, expected) in cases {
        let resp = test::call_service(&app, add_request(5, body.clone()).to_request()).await;
        assert_eq!(resp.status(), expected, "request {body}");
    }
}

#[actix_web::test]
async fn get_cart_applies_coupon_case_insensitively() {
    let app = test::init_service(app(seeded_store())).await;
    test::call_service(
        &app,
        add_request(5, json!({ "product_id": FRAME, "selected_color": "#000000" })).to_request(),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/customers/5/cart?coupon=save10")
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["subtotal"], "110.00");
    assert_eq!(body["discount"]["code"], "SAVE10");
    assert_eq!(body["discount"]["amount"], "11.00");
    assert_eq!(body["total"], "99.00");
}

#[actix_web::test]
async fn unknown_coupon_leaves_totals_untouched() {
    let app = test::init_service(app(seeded_store())).await;
    test::call_service(&app, add_request(5, json!({ "product_id": FRAME })).to_request()).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/customers/5/cart?coupon=NOPE")
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["discount"], Value::Null);
    assert_eq!(body["total"], body["subtotal"]);
}

#[actix_web::test]
async fn missing_cart_is_404() {
    let app = test::init_service(app(seeded_store())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/customers/42/cart").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Cart not found");
}

#[actix_web::test]
async fn update_and_remove_are_scoped_to_the_customer() {
    let app = test::init_service(app(seeded_store())).await;
    let added =
        test::call_service(&app, add_request(5, json!({ "product_id": FRAME })).to_request()).await;
    let added: Value = test::read_body_json(added).await;
    let item_id = added["item"]["id"].as_i64().expect("item id");
    test::call_service(&app, add_request(6, json!({ "product_id": CASE })).to_request()).await;

    let foreign = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/customers/6/cart/items/{item_id}"))
            .set_json(json!({ "quantity": 3 }))
            .to_request(),
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let zero = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/customers/5/cart/items/{item_id}"))
            .set_json(json!({ "quantity": 0 }))
            .to_request(),
    )
    .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    for quantity in [11, i32::MAX] {
        let oversized = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/customers/5/cart/items/{item_id}"))
                .set_json(json!({ "quantity": quantity }))
                .to_request(),
        )
        .await;
        assert_eq!(oversized.status(), StatusCode::BAD_REQUEST);
    }

    let updated = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/customers/5/cart/items/{item_id}"))
            .set_json(json!({ "quantity": 3 }))
            .to_request(),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(updated).await;
    assert_eq!(updated["items"][0]["quantity"], 3);
    assert_eq!(updated["items"][0]["line_total"], "300.00");

    let removed = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/customers/5/cart/items/{item_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(removed.status(), StatusCode::OK);
    let removed: Value = test::read_body_json(removed).await;
    assert!(removed["items"]
        .as_array()
        .expect("items")
        .iter()
        .all(|i| i["id"].as_i64() != Some(item_id)));

    let again = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/customers/5/cart/items/{item_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn clear_cart_empties_lines() {
    let app = test::init_service(app(seeded_store())).await;
    test::call_service(&app, add_request(5, json!({ "product_id": FRAME })).to_request()).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::delete().uri("/customers/5/cart").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["subtotal"], "0.00");
    assert_eq!(body["total"], "0.00");
    assert_eq!(body["item_count"], 0);

    let unknown = test::call_service(
        &app,
        test::TestRequest::delete().uri("/customers/77/cart").to_request(),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn customization_quote_does_not_create_a_cart() {
    let app = test::init_service(app(seeded_store())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/pricing/customization")
            .set_json(json!({
                "product_id": FRAME,
                "selected_color": "#000000",
                "treatment_ids": [1, 2, 99]
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["base_price"], "110.00");
    assert_eq!(body["total"], "125.00");
    assert_eq!(body["add_ons"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["variant"]["selected_color"], "#000000");

    let cart = test::call_service(
        &app,
        test::TestRequest::get().uri("/customers/5/cart").to_request(),
    )
    .await;
    assert_eq!(cart.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn content_prefers_store_and_falls_back_to_defaults() {
    let app = test::init_service(app(seeded_store())).await;

    let stored = test::call_service(
        &app,
        test::TestRequest::get().uri("/content/home_hero").to_request(),
    )
    .await;
    assert_eq!(stored.status(), StatusCode::OK);
    let stored: Value = test::read_body_json(stored).await;
    assert_eq!(stored["origin"], "store");
    assert_eq!(stored["body"]["title"], "Summer collection");

    let fallback = test::call_service(
        &app,
        test::TestRequest::get().uri("/content/footer").to_request(),
    )
    .await;
    assert_eq!(fallback.status(), StatusCode::OK);
    let fallback: Value = test::read_body_json(fallback).await;
    assert_eq!(fallback["origin"], "default");

    let missing = test::call_service(
        &app,
        test::TestRequest::get().uri("/content/nope").to_request(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn merge_beyond_stock_is_rejected() {
    let app = test::init_service(app(seeded_store())).await;
    let body = json!({ "product_id": FRAME, "selected_mm_caliber": "52", "quantity": 2 });

    let first = test::call_service(&app, add_request(5, body.clone()).to_request()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = test::call_service(&app, add_request(5, body).to_request()).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let cart = test::call_service(
        &app,
        test::TestRequest::get().uri("/customers/5/cart").to_request(),
    )
    .await;
    let cart: Value = test::read_body_json(cart).await;
    assert_eq!(cart["items"][0]["quantity"], 2);
}
