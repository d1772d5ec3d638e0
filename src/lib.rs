//! Pool Server Library
//!
//! This module exposes the server components for integration testing.

pub mod api;
pub mod audit;
pub mod bracket;
pub mod config;
pub mod db;
pub mod error;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

/// Creates the application router with all endpoints
pub fn create_app(state: Arc<api::AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Pool Server" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api/pools", api::pools_router().with_state(state.clone()))
        .nest("/api/games", api::games_router().with_state(state))
        .layer(cors)
}

/// Test helper to create an in-memory database and run migrations
pub async fn create_test_db() -> db::DbPool {
    let pool = db::create_memory_pool()
        .await
        .expect("Failed to create in-memory database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Test helper to create a fully configured test app
pub async fn create_test_app() -> (Router, Arc<bracket::PoolManager>) {
    let pool = create_test_db().await;
    let manager = Arc::new(bracket::PoolManager::new(Arc::new(pool.clone())));

    let state = Arc::new(api::AppState {
        pool,
        manager: manager.clone(),
    });

    (create_app(state), manager)
}
