use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::bracket::manager::{EntrySpec, PoolConfig, TeamSpec};
use crate::db::models::{Entry, Game, Pool, Team};
use crate::error::Result;

use super::AppState;

// ==================== Request/Response Types ====================

#[derive(Debug, serde::Deserialize)]
pub struct RegisterTeamsRequest {
    pub teams: Vec<TeamSpec>,
}

#[derive(Debug, serde::Deserialize)]
pub struct RegisterEntriesRequest {
    pub entries: Vec<EntrySpec>,
}

#[derive(Debug, Serialize)]
pub struct PoolResponse {
    pub pool: Pool,
    pub team_count: i64,
    pub entry_count: i64,
}

#[derive(Debug, Serialize)]
pub struct TeamsResponse {
    pub teams: Vec<Team>,
}

#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    pub entries: Vec<Entry>,
}

#[derive(Debug, Serialize)]
pub struct BracketResponse {
    pub games: Vec<Game>,
}

#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    pub pool: Pool,
    pub champion_entry_id: Option<String>,
    pub entries: Vec<Entry>,
}

// ==================== Router ====================

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_pool))
        .route("/:id", get(get_pool))
        .route("/:id/teams", post(register_teams))
        .route("/:id/entries", post(register_entries))
        .route("/:id/draw", post(run_draw))
        .route("/:id/bracket", get(get_bracket))
        .route("/:id/standings", get(get_standings))
}

// ==================== Handlers ====================

async fn create_pool(
    State(state): State<Arc<AppState>>,
    Json(config): Json<PoolConfig>,
) -> Result<Json<Pool>> {
    let pool = state.manager.create_pool(config).await?;
    Ok(Json(pool))
}

async fn get_pool(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<String>,
) -> Result<Json<PoolResponse>> {
    let pool = state.manager.get_pool(&pool_id).await?;
    let (team_count, entry_count) = state.manager.roster_counts(&pool_id).await?;
    Ok(Json(PoolResponse {
        pool,
        team_count,
        entry_count,
    }))
}

async fn register_teams(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<String>,
    Json(req): Json<RegisterTeamsRequest>,
) -> Result<Json<TeamsResponse>> {
    let teams = state.manager.register_teams(&pool_id, req.teams).await?;
    Ok(Json(TeamsResponse { teams }))
}

async fn register_entries(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<String>,
    Json(req): Json<RegisterEntriesRequest>,
) -> Result<Json<EntriesResponse>> {
    let entries = state.manager.register_entries(&pool_id, req.entries).await?;
    Ok(Json(EntriesResponse { entries }))
}

async fn run_draw(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<String>,
) -> Result<Json<EntriesResponse>> {
    let entries = state.manager.run_draw(&pool_id).await?;
    Ok(Json(EntriesResponse { entries }))
}

async fn get_bracket(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<String>,
) -> Result<Json<BracketResponse>> {
    let games = state.manager.bracket(&pool_id).await?;
    Ok(Json(BracketResponse { games }))
}

async fn get_standings(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<String>,
) -> Result<Json<StandingsResponse>> {
    let (pool, entries) = state.manager.standings(&pool_id).await?;
    Ok(Json(StandingsResponse {
        champion_entry_id: pool.champion_entry_id.clone(),
        pool,
        entries,
    }))
}
