use std::sync::Arc;

use pool_server::{api, bracket, config, create_app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load config
    let config = config::Config::from_env();
    tracing::info!("Starting pool server on {}", config.server_addr());

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    // Run migrations
    db::run_migrations(&pool).await?;

    // Create pool manager
    let manager = Arc::new(bracket::PoolManager::new(Arc::new(pool.clone())));

    // Create shared state
    let state = Arc::new(api::AppState { pool, manager });

    // Build router using lib function
    let app = create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server_addr()).await?;
    tracing::info!("Server listening on {}", config.server_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
