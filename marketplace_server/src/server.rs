use std::{path::Path, sync::Arc, time::Duration};

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::Logger,
    web,
    web::ServiceConfig,
    App,
    HttpServer,
};
use log::*;
use marketplace_engine::{
    events::EventProducers,
    traits::{OrderManagement, ProductCatalog, SellerManagement},
    OrderPlacementApi,
    OrderQueryApi,
    ProductApi,
    SellerApi,
    SqliteDatabase,
};

use crate::{
    auth::TokenValidator,
    config::ServerConfig,
    errors::ServerError,
    lock_worker::start_lock_worker,
    middleware::JwtMiddlewareFactory,
    notifications::create_logging_event_handlers,
    routes::{
        health,
        CreateProductRoute,
        DeleteProductRoute,
        MyOrdersRoute,
        PlaceOrderRoute,
        SellerOrderRoute,
        SellerOrdersRoute,
        SellerProductsRoute,
        ShopProductRoute,
        ShopProductsRoute,
        UpdateProductRoute,
        UpdateSellerOrderRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    ensure_database_directory(&config.database_url)?;
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_logging_event_handlers(EVENT_BUFFER_SIZE);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let _lock_worker = start_lock_worker(db.clone(), config.seller_policy, producers.clone(), config.lock_interval);
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let validator = Arc::new(TokenValidator::new(&config.auth));
    let pricing = config.pricing;
    let seller_policy = config.seller_policy;
    let srv = HttpServer::new(move || {
        let product_api = ProductApi::new(db.clone(), producers.clone());
        let placement_api = OrderPlacementApi::new(db.clone(), pricing, producers.clone());
        let query_api = OrderQueryApi::new(db.clone(), producers.clone());
        let seller_api = SellerApi::new(db.clone(), seller_policy, producers.clone());
        let validator = Arc::clone(&validator);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mkt::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(product_api))
            .app_data(web::Data::new(placement_api))
            .app_data(web::Data::new(query_api))
            .app_data(web::Data::new(seller_api))
            .configure(|cfg| configure_routes::<SqliteDatabase>(cfg, validator))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers every route. The storefront is public. Everything else under `/api` requires a bearer token, and each
/// route checks the caller's role.
///
/// `/api/shop` must be registered before `/api`, since scopes are matched in registration order.
pub fn configure_routes<A>(cfg: &mut ServiceConfig, validator: Arc<TokenValidator>)
where A: ProductCatalog + OrderManagement + SellerManagement + 'static {
    let shop_scope =
        web::scope("/api/shop").service(ShopProductsRoute::<A>::new()).service(ShopProductRoute::<A>::new());
    let auth_scope = web::scope("/api")
        .wrap(JwtMiddlewareFactory::new(validator))
        .service(PlaceOrderRoute::<A>::new())
        .service(MyOrdersRoute::<A>::new())
        .service(SellerProductsRoute::<A>::new())
        .service(CreateProductRoute::<A>::new())
        .service(UpdateProductRoute::<A>::new())
        .service(DeleteProductRoute::<A>::new())
        .service(SellerOrdersRoute::<A>::new())
        .service(SellerOrderRoute::<A>::new())
        .service(UpdateSellerOrderRoute::<A>::new());
    cfg.service(health).service(shop_scope).service(auth_scope);
}

/// Malformed JSON bodies get the same `{"error": ...}` shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!("💻️ Rejected request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

/// SQLite creates the database file on first connect, but not the directory it lives in.
fn ensure_database_directory(url: &str) -> Result<(), ServerError> {
    let Some(path) = url.strip_prefix("sqlite://").map(|p| p.split('?').next().unwrap_or(p)) else {
        return Ok(());
    };
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            info!("🗃️ Creating database directory {}", dir.display());
            std::fs::create_dir_all(dir)?;
            Ok(())
        },
        _ => Ok(()),
    }
}
