//! Advancement propagation
//!
//! Consumes a finalized game and pushes its consequences through the
//! bracket: the entry owning the covering team advances into the next
//! game's slot, the other entry (and its team) is eliminated exactly once,
//! and the championship game crowns the pool champion.

use std::sync::Arc;

use crate::audit;
use crate::db::models::{Game, Pool};
use crate::error::{AppError, Result};

use super::context::PoolContext;
use super::graph::{self, Round};

/// What a single propagation did, for the payout pass that follows
#[derive(Debug, Clone)]
pub(crate) struct AdvancementOutcome {
    pub(crate) advancing_entry_id: String,
    pub(crate) eliminated_entry_id: String,
    pub(crate) round: Round,
    pub(crate) completed: bool,
}

pub(crate) struct AdvancementService {
    ctx: Arc<PoolContext>,
}

impl AdvancementService {
    pub(crate) fn new(ctx: Arc<PoolContext>) -> Self {
        Self { ctx }
    }

    /// Applies a freshly finalized game. The caller holds the only
    /// finalization win for this game (the status guard), so this runs at
    /// most once per game; the per-row guards below turn any replay into
    /// an explicit error instead of a double elimination.
    pub(crate) async fn apply(&self, pool: &Pool, game: &Game) -> Result<AdvancementOutcome> {
        let round = game
            .round_tag()
            .ok_or_else(|| AppError::Internal(format!("Game {} has unknown round", game.id)))?;
        let covering_team = game
            .spread_covering_team_id
            .as_deref()
            .ok_or_else(|| AppError::Internal(format!("Game {} has no covering team", game.id)))?;
        let higher_team = game
            .higher_seed_team_id
            .as_deref()
            .ok_or_else(|| AppError::Internal(format!("Game {} has no higher team", game.id)))?;
        let lower_team = game
            .lower_seed_team_id
            .as_deref()
            .ok_or_else(|| AppError::Internal(format!("Game {} has no lower team", game.id)))?;

        let losing_team = if covering_team == higher_team {
            lower_team
        } else {
            higher_team
        };

        let advancing_entry = self
            .ctx
            .entry_owning_team(&game.pool_id, covering_team)
            .await?;
        let eliminated_entry = self
            .ctx
            .entry_owning_team(&game.pool_id, losing_team)
            .await?;

        self.ctx.eliminate_entry(&eliminated_entry.id, round).await?;
        self.ctx.eliminate_team(losing_team, round).await?;
        audit::log_entry_eliminated(&pool.id, &eliminated_entry.id, round.as_str());

        let completed = if round == Round::Championship {
            self.ctx.set_champion(&pool.id, &advancing_entry.id).await?;
            audit::log_pool_completed(&pool.id, &advancing_entry.id);
            true
        } else {
            let dest = graph::next_slot(round, game.region_tag(), game.game_number)?;
            let dest_game = self
                .ctx
                .load_game_at(&game.pool_id, dest.round, dest.region, dest.game_number)
                .await?;
            self.ctx
                .install_slot(&dest_game.id, dest.slot, &advancing_entry.id, covering_team)
                .await?;
            false
        };

        Ok(AdvancementOutcome {
            advancing_entry_id: advancing_entry.id,
            eliminated_entry_id: eliminated_entry.id,
            round,
            completed,
        })
    }
}
