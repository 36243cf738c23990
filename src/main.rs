use std::sync::Arc;

use dotenvy::dotenv;
use order_board::config::Config;
use order_board::infrastructure::DieselOrderRepository;
use order_board::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url)?;
    run_migrations(&pool)?;

    let repo = DieselOrderRepository::new(pool).with_poll_interval(config.active_poll_interval);

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(Arc::new(repo), config.listing, &config.host, config.port)?.await?;
    Ok(())
}
