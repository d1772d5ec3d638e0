pub mod games;
pub mod pools;

use std::sync::Arc;

use crate::bracket::PoolManager;
use crate::db::DbPool;

pub use games::router as games_router;
pub use pools::router as pools_router;

/// Shared state for all endpoints
pub struct AppState {
    pub pool: DbPool,
    pub manager: Arc<PoolManager>,
}
