pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::http::StatusCode;
use actix_web::middleware::{Condition, ErrorHandlers, Logger};
use actix_web::{web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::cart_service::CartService;
use application::content_service::ContentService;
use config::AppConfig;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::cart::get_cart,
        handlers::cart::add_item,
        handlers::cart::update_item,
        handlers::cart::remove_item,
        handlers::cart::clear_cart,
        handlers::pricing::quote_customization,
        handlers::content::get_content,
    ),
    components(schemas(
        handlers::VariantFields,
        handlers::LensFields,
        handlers::AddOnResponse,
        handlers::cart::AddItemRequest,
        handlers::cart::UpdateQuantityRequest,
        handlers::cart::CartItemResponse,
        handlers::cart::DiscountResponse,
        handlers::cart::CartResponse,
        handlers::cart::AddItemResponse,
        handlers::pricing::CustomizationPriceRequest,
        handlers::pricing::CustomizationPriceResponse,
        handlers::content::ContentResponse,
    )),
    tags(
        (name = "cart", description = "Customer carts"),
        (name = "pricing", description = "Customization quotes"),
        (name = "content", description = "Storefront content blocks"),
    )
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Registers every API route. Services are expected as app data.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/customers/{customer_id}/cart")
                .route("", web::get().to(handlers::cart::get_cart))
                .route("", web::delete().to(handlers::cart::clear_cart))
                .route("/items", web::post().to(handlers::cart::add_item))
                .route("/items/{item_id}", web::patch().to(handlers::cart::update_item))
                .route("/items/{item_id}", web::delete().to(handlers::cart::remove_item)),
        )
        .route(
            "/pricing/customization",
            web::post().to(handlers::pricing::quote_customization),
        )
        .route("/content/{key}", web::get().to(handlers::content::get_content));
}

/// Build and return an actix-web `Server` bound to the configured address.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    cart_service: web::Data<CartService>,
    content_service: web::Data<ContentService>,
    config: &AppConfig,
) -> std::io::Result<actix_web::dev::Server> {
    let expose_errors = config.is_development();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(cart_service.clone())
            .app_data(content_service.clone())
            .wrap(Condition::new(
                expose_errors,
                ErrorHandlers::new().handler(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    errors::expose_internal_error,
                ),
            ))
            .wrap(Logger::default())
            .configure(configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((config.host.clone(), config.port))?
    .run())
}
