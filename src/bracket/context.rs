//! Shared persistence context for the bracket engine
//!
//! All row loads and writes live here. Every mutation that the concurrency
//! model cares about is a conditional UPDATE: finalization only fires while
//! the game is not final, slot installation only while the slot is unset,
//! the draw gate only while the draw is incomplete. Callers branch on the
//! affected-row count instead of taking locks.

use std::sync::Arc;

use chrono::Utc;

use crate::db::models::{Entry, Game, Pool, Team};
use crate::db::DbPool;
use crate::error::{AppError, Result};

use super::error::PoolError;
use super::graph::{Region, Round, Slot};

pub struct PoolContext {
    pub(crate) pool: Arc<DbPool>,
}

impl PoolContext {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    // ==================== Pools ====================

    pub(crate) async fn insert_pool(&self, pool: &Pool) -> Result<()> {
        sqlx::query(
            "INSERT INTO pools (
                id, name, push_rule, spreads_enabled,
                sweet16_pct, elite8_pct, final_four_pct, runner_up_pct, champion_pct,
                draw_completed, draw_completed_at, champion_entry_id, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&pool.id)
        .bind(&pool.name)
        .bind(&pool.push_rule)
        .bind(pool.spreads_enabled)
        .bind(pool.sweet16_pct)
        .bind(pool.elite8_pct)
        .bind(pool.final_four_pct)
        .bind(pool.runner_up_pct)
        .bind(pool.champion_pct)
        .bind(pool.draw_completed)
        .bind(&pool.draw_completed_at)
        .bind(&pool.champion_entry_id)
        .bind(&pool.status)
        .bind(&pool.created_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub(crate) async fn load_pool(&self, pool_id: &str) -> Result<Pool> {
        sqlx::query_as::<_, Pool>("SELECT * FROM pools WHERE id = ?")
            .bind(pool_id)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pool {} not found", pool_id)))
    }

    /// One-time draw gate. Returns false when another submission already
    /// completed the draw.
    pub(crate) async fn complete_draw(&self, pool_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE pools
             SET draw_completed = 1, draw_completed_at = ?, status = 'drawn'
             WHERE id = ? AND draw_completed = 0",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(pool_id)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Records the champion and completes the pool. Idempotent: a repeat
    /// with the same entry is a no-op, a different entry is a consistency
    /// error.
    pub(crate) async fn set_champion(&self, pool_id: &str, entry_id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE pools
             SET champion_entry_id = ?, status = 'completed'
             WHERE id = ? AND champion_entry_id IS NULL",
        )
        .bind(entry_id)
        .bind(pool_id)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let pool = self.load_pool(pool_id).await?;
            if pool.champion_entry_id.as_deref() != Some(entry_id) {
                return Err(AppError::Internal(format!(
                    "Pool {} already has a different champion",
                    pool_id
                )));
            }
        }
        Ok(())
    }

    // ==================== Teams ====================

    pub(crate) async fn insert_teams(&self, teams: &[Team]) -> Result<()> {
        for team in teams {
            sqlx::query(
                "INSERT INTO teams (id, pool_id, name, seed, region, eliminated, eliminated_round, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&team.id)
            .bind(&team.pool_id)
            .bind(&team.name)
            .bind(team.seed)
            .bind(&team.region)
            .bind(team.eliminated)
            .bind(&team.eliminated_round)
            .bind(&team.created_at)
            .execute(&*self.pool)
            .await?;
        }
        Ok(())
    }

    pub(crate) async fn list_teams(&self, pool_id: &str) -> Result<Vec<Team>> {
        Ok(sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE pool_id = ? ORDER BY region, seed",
        )
        .bind(pool_id)
        .fetch_all(&*self.pool)
        .await?)
    }

    pub(crate) async fn count_teams(&self, pool_id: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams WHERE pool_id = ?")
            .bind(pool_id)
            .fetch_one(&*self.pool)
            .await?;
        Ok(count)
    }

    /// Marks a team out of the pool. Teams follow their owning entry, so a
    /// repeat call is not an error here; the entry-side guard catches
    /// replays.
    pub(crate) async fn eliminate_team(&self, team_id: &str, round: Round) -> Result<()> {
        sqlx::query(
            "UPDATE teams SET eliminated = 1, eliminated_round = ?
             WHERE id = ? AND eliminated = 0",
        )
        .bind(round.as_str())
        .bind(team_id)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    // ==================== Entries ====================

    pub(crate) async fn insert_entries(&self, entries: &[Entry]) -> Result<()> {
        for entry in entries {
            sqlx::query(
                "INSERT INTO entries (
                    id, pool_id, display_name, current_team_id, original_team_id,
                    eliminated, eliminated_round, payout_pct, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&entry.id)
            .bind(&entry.pool_id)
            .bind(&entry.display_name)
            .bind(&entry.current_team_id)
            .bind(&entry.original_team_id)
            .bind(entry.eliminated)
            .bind(&entry.eliminated_round)
            .bind(entry.payout_pct)
            .bind(&entry.created_at)
            .execute(&*self.pool)
            .await?;
        }
        Ok(())
    }

    pub(crate) async fn list_entries(&self, pool_id: &str) -> Result<Vec<Entry>> {
        Ok(sqlx::query_as::<_, Entry>(
            "SELECT * FROM entries WHERE pool_id = ?
             ORDER BY payout_pct DESC, eliminated ASC, display_name",
        )
        .bind(pool_id)
        .fetch_all(&*self.pool)
        .await?)
    }

    pub(crate) async fn count_entries(&self, pool_id: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM entries WHERE pool_id = ?")
            .bind(pool_id)
            .fetch_one(&*self.pool)
            .await?;
        Ok(count)
    }

    pub(crate) async fn load_entry(&self, entry_id: &str) -> Result<Entry> {
        sqlx::query_as::<_, Entry>("SELECT * FROM entries WHERE id = ?")
            .bind(entry_id)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))
    }

    /// The entry that currently owns a team. Exactly one must exist once
    /// the draw is complete; anything else is a mis-seeded bracket.
    pub(crate) async fn entry_owning_team(&self, pool_id: &str, team_id: &str) -> Result<Entry> {
        sqlx::query_as::<_, Entry>(
            "SELECT * FROM entries WHERE pool_id = ? AND current_team_id = ?",
        )
        .bind(pool_id)
        .bind(team_id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| {
            PoolError::OwnerNotFound {
                team_id: team_id.to_string(),
            }
            .into()
        })
    }

    /// Writes the draw result onto the entries. `original_team_id` is set
    /// here, once, and never again.
    pub(crate) async fn apply_assignment(&self, pairs: &[(String, String)]) -> Result<()> {
        for (entry_id, team_id) in pairs {
            sqlx::query(
                "UPDATE entries SET current_team_id = ?, original_team_id = ? WHERE id = ?",
            )
            .bind(team_id)
            .bind(team_id)
            .bind(entry_id)
            .execute(&*self.pool)
            .await?;
        }
        Ok(())
    }

    /// Write-once elimination. A second attempt means a replay bug upstream
    /// and is rejected, never re-applied.
    pub(crate) async fn eliminate_entry(&self, entry_id: &str, round: Round) -> Result<()> {
        let result = sqlx::query(
            "UPDATE entries SET eliminated = 1, eliminated_round = ?
             WHERE id = ? AND eliminated = 0",
        )
        .bind(round.as_str())
        .bind(entry_id)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PoolError::AlreadyEliminated {
                entry_id: entry_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Write-once payout assignment; reruns leave an already-paid entry
    /// untouched.
    pub(crate) async fn assign_payout(&self, entry_id: &str, pct: f64) -> Result<()> {
        sqlx::query("UPDATE entries SET payout_pct = ? WHERE id = ? AND payout_pct = 0")
            .bind(pct)
            .bind(entry_id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    // ==================== Games ====================

    pub(crate) async fn insert_games(&self, games: &[Game]) -> Result<()> {
        for game in games {
            sqlx::query(
                "INSERT INTO games (
                    id, pool_id, round, region, game_number,
                    higher_seed_team_id, lower_seed_team_id, spread,
                    higher_seed_score, lower_seed_score, status,
                    winning_team_id, spread_covering_team_id,
                    higher_seed_entry_id, lower_seed_entry_id, advancing_entry_id,
                    created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&game.id)
            .bind(&game.pool_id)
            .bind(&game.round)
            .bind(&game.region)
            .bind(game.game_number)
            .bind(&game.higher_seed_team_id)
            .bind(&game.lower_seed_team_id)
            .bind(game.spread)
            .bind(game.higher_seed_score)
            .bind(game.lower_seed_score)
            .bind(&game.status)
            .bind(&game.winning_team_id)
            .bind(&game.spread_covering_team_id)
            .bind(&game.higher_seed_entry_id)
            .bind(&game.lower_seed_entry_id)
            .bind(&game.advancing_entry_id)
            .bind(&game.created_at)
            .execute(&*self.pool)
            .await?;
        }
        Ok(())
    }

    pub(crate) async fn load_game(&self, game_id: &str) -> Result<Game> {
        sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = ?")
            .bind(game_id)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))
    }

    pub(crate) async fn load_game_at(
        &self,
        pool_id: &str,
        round: Round,
        region: Option<Region>,
        game_number: i32,
    ) -> Result<Game> {
        sqlx::query_as::<_, Game>(
            "SELECT * FROM games
             WHERE pool_id = ? AND round = ? AND region IS ? AND game_number = ?",
        )
        .bind(pool_id)
        .bind(round.as_str())
        .bind(region.map(|r| r.as_str()))
        .bind(game_number)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| {
            PoolError::NoDestination {
                round: round.as_str().to_string(),
                game_number,
            }
            .into()
        })
    }

    pub(crate) async fn list_games(&self, pool_id: &str) -> Result<Vec<Game>> {
        Ok(
            sqlx::query_as::<_, Game>("SELECT * FROM games WHERE pool_id = ?")
                .bind(pool_id)
                .fetch_all(&*self.pool)
                .await?,
        )
    }

    pub(crate) async fn set_game_entries(
        &self,
        game_id: &str,
        higher_entry_id: &str,
        lower_entry_id: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE games SET higher_seed_entry_id = ?, lower_seed_entry_id = ? WHERE id = ?",
        )
        .bind(higher_entry_id)
        .bind(lower_entry_id)
        .bind(game_id)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    /// Spread edits are only legal before kickoff. Returns false when the
    /// game has already started or finished.
    pub(crate) async fn update_spread(&self, game_id: &str, spread: f64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE games SET spread = ? WHERE id = ? AND status = 'scheduled'",
        )
        .bind(spread)
        .bind(game_id)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub(crate) async fn start_game(&self, game_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE games SET status = 'in_progress' WHERE id = ? AND status = 'scheduled'",
        )
        .bind(game_id)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Commits a resolution. The status guard makes concurrent submissions
    /// race safely: exactly one writer wins, the loser reloads and returns
    /// the committed state.
    pub(crate) async fn finalize_game(&self, game: &Game) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE games
             SET status = 'final',
                 higher_seed_score = ?, lower_seed_score = ?,
                 winning_team_id = ?, spread_covering_team_id = ?, advancing_entry_id = ?
             WHERE id = ? AND status != 'final'",
        )
        .bind(game.higher_seed_score)
        .bind(game.lower_seed_score)
        .bind(&game.winning_team_id)
        .bind(&game.spread_covering_team_id)
        .bind(&game.advancing_entry_id)
        .bind(&game.id)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Installs an advancing entry into one slot of its destination game.
    /// Set-only-if-unset: the two feeders of a game each touch their own
    /// slot, so no serialization is needed. Re-installing the same entry is
    /// a no-op; a different entry in an occupied slot is a consistency
    /// error.
    pub(crate) async fn install_slot(
        &self,
        game_id: &str,
        slot: Slot,
        entry_id: &str,
        team_id: &str,
    ) -> Result<()> {
        let query = match slot {
            Slot::Higher => {
                "UPDATE games SET higher_seed_entry_id = ?, higher_seed_team_id = ?
                 WHERE id = ? AND higher_seed_entry_id IS NULL"
            }
            Slot::Lower => {
                "UPDATE games SET lower_seed_entry_id = ?, lower_seed_team_id = ?
                 WHERE id = ? AND lower_seed_entry_id IS NULL"
            }
        };

        let result = sqlx::query(query)
            .bind(entry_id)
            .bind(team_id)
            .bind(game_id)
            .execute(&*self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let game = self.load_game(game_id).await?;
            let occupant = match slot {
                Slot::Higher => game.higher_seed_entry_id.as_deref(),
                Slot::Lower => game.lower_seed_entry_id.as_deref(),
            };
            if occupant != Some(entry_id) {
                return Err(PoolError::SlotConflict {
                    game_id: game_id.to_string(),
                    slot: slot.as_str().to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
