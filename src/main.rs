use std::sync::Arc;

use actix_web::web;
use eyewear_cart::application::cart_service::CartService;
use eyewear_cart::application::content_service::{ContentService, StaticContent};
use eyewear_cart::config::AppConfig;
use eyewear_cart::domain::ports::CartStore;
use eyewear_cart::infrastructure::diesel_store::DieselStore;
use eyewear_cart::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let pool = create_pool(&config.database_url, config.pool_size).map_err(std::io::Error::other)?;
    run_migrations(&pool).map_err(std::io::Error::other)?;

    let defaults = StaticContent::bundled().map_err(std::io::Error::other)?;
    let store = Arc::new(DieselStore::new(pool));
    let cart_store: Arc<dyn CartStore> = store.clone();
    let cart_service = web::Data::new(CartService::new(cart_store));
    let content_service = web::Data::new(ContentService::new(store, defaults));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(cart_service, content_service, &config)?.await
}
