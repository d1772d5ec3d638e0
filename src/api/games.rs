use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::models::Game;
use crate::error::{AppError, Result};

use super::AppState;

// ==================== Request/Response Types ====================

#[derive(Debug, Deserialize)]
pub struct SetSpreadRequest {
    pub spread: f64,
}

#[derive(Debug, Deserialize)]
pub struct SubmitScoreRequest {
    pub higher_seed_score: i64,
    pub lower_seed_score: i64,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub game: Game,
}

// ==================== Router ====================

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:id", get(get_game))
        .route("/:id/spread", put(set_spread))
        .route("/:id/start", post(start_game))
        .route("/:id/score", post(submit_score))
}

// ==================== Handlers ====================

async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>> {
    let game = state.manager.get_game(&game_id).await?;
    Ok(Json(GameResponse { game }))
}

async fn set_spread(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<SetSpreadRequest>,
) -> Result<Json<GameResponse>> {
    let game = state.manager.set_spread(&game_id, req.spread).await?;
    Ok(Json(GameResponse { game }))
}

async fn start_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>> {
    let game = state.manager.start_game(&game_id).await?;
    Ok(Json(GameResponse { game }))
}

async fn submit_score(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<SubmitScoreRequest>,
) -> Result<Json<GameResponse>> {
    if req.higher_seed_score < 0 || req.lower_seed_score < 0 {
        return Err(AppError::Validation(
            "Scores must be non-negative".to_string(),
        ));
    }
    let game = state
        .manager
        .submit_final_score(&game_id, req.higher_seed_score, req.lower_seed_score)
        .await?;
    Ok(Json(GameResponse { game }))
}
