pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::order_board::{BoardConfig, OrderBoard};
pub use db::{create_pool, DbPool};
pub use domain::ports::OrderRepository;
pub use handlers::orders::ListingDefaults;

use application::order_service::OrderService;
use handlers::orders::SharedOrderService;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::list_active_orders,
        handlers::orders::list_recent_orders,
        handlers::orders::update_order_status,
        handlers::orders::assign_delivery_person,
    ),
    components(schemas(
        handlers::orders::AddressPayload,
        handlers::orders::CreateOrderItemRequest,
        handlers::orders::CreateOrderRequest,
        handlers::orders::CreateOrderResponse,
        handlers::orders::OrderItemResponse,
        handlers::orders::OrderResponse,
        handlers::orders::OrderPageResponse,
        handlers::orders::UpdateStatusRequest,
        handlers::orders::AssignDeliveryPersonRequest,
    )),
    tags((name = "orders", description = "Order back-office"))
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Register the order routes on an actix `ServiceConfig`.
pub fn configure(
    repo: Arc<dyn OrderRepository>,
    defaults: ListingDefaults,
) -> impl FnOnce(&mut web::ServiceConfig) {
    let service: web::Data<SharedOrderService> = web::Data::new(OrderService::new(repo));
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(service)
            .app_data(web::Data::new(defaults))
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("/active", web::get().to(handlers::orders::list_active_orders))
                    .route("/recent", web::get().to(handlers::orders::list_recent_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route(
                        "/{id}/status",
                        web::patch().to(handlers::orders::update_order_status),
                    )
                    .route(
                        "/{id}/delivery-person",
                        web::put().to(handlers::orders::assign_delivery_person),
                    ),
            );
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    repo: Arc<dyn OrderRepository>,
    defaults: ListingDefaults,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure(Arc::clone(&repo), defaults))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
