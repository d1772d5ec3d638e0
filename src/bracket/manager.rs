//! Pool Manager
//!
//! Centralized management for a pool's lifecycle:
//! - Roster registration (teams and entries from the membership subsystem)
//! - The one-time blind draw
//! - Spread edits and score submission
//! - Advancement propagation and payout assignment

use std::collections::HashMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Deserialize;

use crate::audit;
use crate::db::models::{Entry, Game, Pool, Team};
use crate::db::DbPool;
use crate::error::{AppError, Result};

use super::advancement::AdvancementService;
use super::context::PoolContext;
use super::draw;
use super::error::PoolError;
use super::graph::{self, Region, Round, FIELD_SIZE, FIRST_ROUND_SEED_ORDER, REGION_SEEDS};
use super::payouts::PayoutScheme;
use super::resolver;

/// Configuration for creating a pool, immutable once the draw begins
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub name: String,
    pub push_rule: Option<String>,
    pub spreads_enabled: Option<bool>,
    pub payouts: PayoutScheme,
}

/// One seeded team from the roster subsystem
#[derive(Debug, Clone, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    pub seed: i32,
    pub region: String,
}

/// One approved entry from the membership subsystem
#[derive(Debug, Clone, Deserialize)]
pub struct EntrySpec {
    pub display_name: String,
}

/// Manages all pools
pub struct PoolManager {
    ctx: Arc<PoolContext>,
    advancement: AdvancementService,
}

impl PoolManager {
    pub fn new(pool: Arc<DbPool>) -> Self {
        let ctx = Arc::new(PoolContext::new(pool));
        let advancement = AdvancementService::new(ctx.clone());
        Self { ctx, advancement }
    }

    // ==================== Pool lifecycle ====================

    /// Create a pool. The payout tiers and push rule are validated here and
    /// never change afterwards.
    pub async fn create_pool(&self, config: PoolConfig) -> Result<Pool> {
        let push_rule = match &config.push_rule {
            Some(value) => value.parse().map_err(|_| PoolError::InvalidPushRule {
                value: value.clone(),
            })?,
            None => resolver::PushRule::HigherSeedAdvances,
        };
        config.payouts.validate()?;

        let pool = Pool::new(
            config.name,
            push_rule,
            config.spreads_enabled.unwrap_or(true),
            config.payouts,
        );
        self.ctx.insert_pool(&pool).await?;

        tracing::info!("Created pool: {} ({})", pool.name, pool.id);
        Ok(pool)
    }

    pub async fn get_pool(&self, pool_id: &str) -> Result<Pool> {
        self.ctx.load_pool(pool_id).await
    }

    pub async fn roster_counts(&self, pool_id: &str) -> Result<(i64, i64)> {
        let teams = self.ctx.count_teams(pool_id).await?;
        let entries = self.ctx.count_entries(pool_id).await?;
        Ok((teams, entries))
    }

    /// Register the 64 seeded teams and create the 63 bracket games.
    /// First-round games get their pairings from the standard seed order;
    /// later rounds are created empty and filled by advancement.
    pub async fn register_teams(&self, pool_id: &str, specs: Vec<TeamSpec>) -> Result<Vec<Team>> {
        let pool = self.ctx.load_pool(pool_id).await?;
        if pool.draw_completed {
            return Err(PoolError::AlreadyDrawn.into());
        }
        if self.ctx.count_teams(pool_id).await? > 0 {
            return Err(AppError::BadRequest(
                "Teams are already registered for this pool".to_string(),
            ));
        }
        validate_team_specs(&specs)?;

        let mut teams = Vec::with_capacity(FIELD_SIZE);
        let mut by_slot: HashMap<(Region, i32), String> = HashMap::new();
        for spec in specs {
            let region: Region = spec.region.parse().map_err(|_| PoolError::InvalidRoster {
                reason: format!("unknown region: {}", spec.region),
            })?;
            let team = Team::new(pool_id.to_string(), spec.name, spec.seed, region);
            by_slot.insert((region, spec.seed), team.id.clone());
            teams.push(team);
        }
        self.ctx.insert_teams(&teams).await?;

        let mut games = Vec::with_capacity(graph::GAME_COUNT);
        for region in Region::ALL {
            for (number, (high, low)) in FIRST_ROUND_SEED_ORDER.iter().enumerate() {
                let mut game = Game::new(
                    pool_id.to_string(),
                    Round::First,
                    Some(region),
                    number as i32,
                );
                game.higher_seed_team_id = by_slot.get(&(region, *high)).cloned();
                game.lower_seed_team_id = by_slot.get(&(region, *low)).cloned();
                games.push(game);
            }
            for round in [Round::Second, Round::Sweet16, Round::Elite8] {
                for number in 0..round.games_per_region().unwrap_or(0) {
                    games.push(Game::new(pool_id.to_string(), round, Some(region), number));
                }
            }
        }
        for number in 0..2 {
            games.push(Game::new(pool_id.to_string(), Round::FinalFour, None, number));
        }
        games.push(Game::new(pool_id.to_string(), Round::Championship, None, 0));
        self.ctx.insert_games(&games).await?;

        tracing::info!("Seeded bracket for pool {} with {} games", pool_id, games.len());
        Ok(teams)
    }

    /// Register the approved entries. The membership subsystem hands over
    /// the full roster at once.
    pub async fn register_entries(
        &self,
        pool_id: &str,
        specs: Vec<EntrySpec>,
    ) -> Result<Vec<Entry>> {
        let pool = self.ctx.load_pool(pool_id).await?;
        if pool.draw_completed {
            return Err(PoolError::AlreadyDrawn.into());
        }
        if self.ctx.count_entries(pool_id).await? > 0 {
            return Err(AppError::BadRequest(
                "Entries are already registered for this pool".to_string(),
            ));
        }
        if specs.len() != FIELD_SIZE {
            return Err(PoolError::InvalidRoster {
                reason: format!("expected {} entries, got {}", FIELD_SIZE, specs.len()),
            }
            .into());
        }

        let entries: Vec<Entry> = specs
            .into_iter()
            .map(|spec| Entry::new(pool_id.to_string(), spec.display_name))
            .collect();
        self.ctx.insert_entries(&entries).await?;

        tracing::info!("Registered {} entries for pool {}", entries.len(), pool_id);
        Ok(entries)
    }

    // ==================== Draw ====================

    /// Run the one-time blind draw: a uniformly random entry/team bijection
    /// behind a check-and-set gate. There is no re-draw; a repeat call is
    /// rejected.
    pub async fn run_draw(&self, pool_id: &str) -> Result<Vec<Entry>> {
        let pool = self.ctx.load_pool(pool_id).await?;
        if pool.draw_completed {
            return Err(PoolError::AlreadyDrawn.into());
        }

        let entries = self.ctx.list_entries(pool_id).await?;
        let teams = self.ctx.list_teams(pool_id).await?;
        if entries.len() != FIELD_SIZE || teams.len() != FIELD_SIZE {
            return Err(PoolError::CountMismatch {
                entries: entries.len(),
                teams: teams.len(),
            }
            .into());
        }

        // Claim the gate before writing anything; a concurrent submission
        // observes zero affected rows and is rejected here.
        if !self.ctx.complete_draw(pool_id).await? {
            return Err(PoolError::AlreadyDrawn.into());
        }

        let entry_ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
        let team_ids: Vec<String> = teams.iter().map(|t| t.id.clone()).collect();
        let mut rng = ChaCha20Rng::from_entropy();
        let pairs = draw::assign(&entry_ids, &team_ids, &mut rng)?;
        self.ctx.apply_assignment(&pairs).await?;

        // Install the owners into the first-round games their teams occupy.
        let owner_of: HashMap<&str, &str> = pairs
            .iter()
            .map(|(entry_id, team_id)| (team_id.as_str(), entry_id.as_str()))
            .collect();
        for game in self.ctx.list_games(pool_id).await? {
            if game.round_tag() != Some(Round::First) {
                continue;
            }
            let higher_team = game.higher_seed_team_id.as_deref().unwrap_or_default();
            let lower_team = game.lower_seed_team_id.as_deref().unwrap_or_default();
            match (owner_of.get(higher_team), owner_of.get(lower_team)) {
                (Some(higher_entry), Some(lower_entry)) => {
                    self.ctx
                        .set_game_entries(&game.id, higher_entry, lower_entry)
                        .await?;
                }
                _ => {
                    return Err(PoolError::SlotsUnfilled {
                        game_id: game.id.clone(),
                    }
                    .into())
                }
            }
        }

        audit::log_draw_completed(pool_id);
        self.ctx.list_entries(pool_id).await
    }

    // ==================== Games ====================

    pub async fn get_game(&self, game_id: &str) -> Result<Game> {
        self.ctx.load_game(game_id).await
    }

    /// Set or correct a game's spread, legal only before kickoff.
    pub async fn set_spread(&self, game_id: &str, spread: f64) -> Result<Game> {
        if !spread.is_finite() {
            return Err(AppError::Validation("Spread must be a number".to_string()));
        }
        if !self.ctx.update_spread(game_id, spread).await? {
            // Distinguish a missing game from a locked one.
            let game = self.ctx.load_game(game_id).await?;
            return Err(PoolError::SpreadLocked { game_id: game.id }.into());
        }
        self.ctx.load_game(game_id).await
    }

    /// Mark kickoff, locking the spread. Starting an in-progress game is a
    /// no-op; a finished game cannot restart.
    pub async fn start_game(&self, game_id: &str) -> Result<Game> {
        if !self.ctx.start_game(game_id).await? {
            let game = self.ctx.load_game(game_id).await?;
            if game.is_final() {
                return Err(AppError::BadRequest(
                    "This game is already finalized".to_string(),
                ));
            }
            return Ok(game);
        }
        self.ctx.load_game(game_id).await
    }

    /// Submit a final score: resolution, advancement, and payouts as one
    /// pipeline.
    ///
    /// Submitting the same score to a finalized game returns the committed
    /// state unchanged, so a retried request cannot double-eliminate or
    /// double-install; a different score for a finalized game is rejected.
    pub async fn submit_final_score(
        &self,
        game_id: &str,
        higher_seed_score: i64,
        lower_seed_score: i64,
    ) -> Result<Game> {
        let mut game = self.ctx.load_game(game_id).await?;
        let pool = self.ctx.load_pool(&game.pool_id).await?;

        if game.is_final() {
            if game.higher_seed_score == Some(higher_seed_score)
                && game.lower_seed_score == Some(lower_seed_score)
            {
                return Ok(game);
            }
            return Err(AppError::BadRequest(
                "This game is already finalized".to_string(),
            ));
        }
        if !pool.draw_completed {
            return Err(PoolError::DrawNotCompleted.into());
        }

        let push_rule = pool.push_rule().ok_or_else(|| {
            AppError::Internal(format!("Pool {} has unknown push rule", pool.id))
        })?;

        game.higher_seed_score = Some(higher_seed_score);
        game.lower_seed_score = Some(lower_seed_score);
        let resolution = resolver::resolve(&game, push_rule, pool.spreads_enabled)?;

        let advancing_entry = self
            .ctx
            .entry_owning_team(&pool.id, &resolution.spread_covering_team_id)
            .await?;
        game.winning_team_id = Some(resolution.winning_team_id.clone());
        game.spread_covering_team_id = Some(resolution.spread_covering_team_id.clone());
        game.advancing_entry_id = Some(advancing_entry.id.clone());
        game.status = "final".to_string();

        if !self.ctx.finalize_game(&game).await? {
            // A concurrent submission won the status race; its result stands.
            return self.ctx.load_game(game_id).await;
        }
        audit::log_game_finalized(
            &pool.id,
            game_id,
            &resolution.winning_team_id,
            &resolution.spread_covering_team_id,
        );

        let outcome = self.advancement.apply(&pool, &game).await?;
        self.compute_payouts(&pool).await?;
        if outcome.completed {
            tracing::info!(
                "Pool {} completed; champion entry {}",
                pool.id,
                outcome.advancing_entry_id
            );
        }

        self.ctx.load_game(game_id).await
    }

    // ==================== Payouts ====================

    /// Assign payout percentages to every entry whose fate is decided and
    /// not yet paid. Write-once per entry: reruns only touch entries newly
    /// eliminated since the previous run, plus the champion at completion.
    pub async fn compute_payouts(&self, pool: &Pool) -> Result<()> {
        let scheme = pool.payout_scheme();
        let champion_entry_id = self
            .ctx
            .load_pool(&pool.id)
            .await?
            .champion_entry_id;

        for entry in self.ctx.list_entries(&pool.id).await? {
            if entry.payout_pct != 0.0 {
                continue;
            }
            let share = if champion_entry_id.as_deref() == Some(entry.id.as_str()) {
                scheme.champion_share()
            } else if let Some(round) = entry.eliminated_round() {
                scheme.elimination_share(round)
            } else {
                continue;
            };
            if share > 0.0 {
                self.ctx.assign_payout(&entry.id, share).await?;
                audit::log_payout_assigned(&pool.id, &entry.id, share);
            }
        }
        Ok(())
    }

    // ==================== Views ====================

    /// All games in bracket order, for rendering.
    pub async fn bracket(&self, pool_id: &str) -> Result<Vec<Game>> {
        self.ctx.load_pool(pool_id).await?;
        let mut games = self.ctx.list_games(pool_id).await?;
        games.sort_by_key(|game| {
            (
                game.round_tag().map(|r| r.index()).unwrap_or(usize::MAX),
                game.region_tag()
                    .and_then(|region| Region::ALL.iter().position(|r| *r == region))
                    .unwrap_or(usize::MAX),
                game.game_number,
            )
        });
        Ok(games)
    }

    /// Per-entry standings: elimination status and payout percentages.
    pub async fn standings(&self, pool_id: &str) -> Result<(Pool, Vec<Entry>)> {
        let pool = self.ctx.load_pool(pool_id).await?;
        let entries = self.ctx.list_entries(pool_id).await?;
        Ok((pool, entries))
    }
}

fn validate_team_specs(specs: &[TeamSpec]) -> Result<()> {
    if specs.len() != FIELD_SIZE {
        return Err(PoolError::InvalidRoster {
            reason: format!("expected {} teams, got {}", FIELD_SIZE, specs.len()),
        }
        .into());
    }

    let mut seeds_by_region: HashMap<Region, Vec<i32>> = HashMap::new();
    for spec in specs {
        let region: Region = spec.region.parse().map_err(|_| PoolError::InvalidRoster {
            reason: format!("unknown region: {}", spec.region),
        })?;
        if spec.seed < 1 || spec.seed > REGION_SEEDS as i32 {
            return Err(PoolError::InvalidRoster {
                reason: format!("seed {} out of range for {}", spec.seed, spec.name),
            }
            .into());
        }
        seeds_by_region.entry(region).or_default().push(spec.seed);
    }

    for region in Region::ALL {
        let mut seeds = seeds_by_region.remove(&region).unwrap_or_default();
        seeds.sort_unstable();
        seeds.dedup();
        if seeds.len() != REGION_SEEDS {
            return Err(PoolError::InvalidRoster {
                reason: format!(
                    "region {} must have seeds 1 through {} exactly once",
                    region.as_str(),
                    REGION_SEEDS
                ),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_specs() -> Vec<TeamSpec> {
        let mut specs = Vec::new();
        for region in Region::ALL {
            for seed in 1..=16 {
                specs.push(TeamSpec {
                    name: format!("{} {}", region.as_str(), seed),
                    seed,
                    region: region.as_str().to_string(),
                });
            }
        }
        specs
    }

    #[test]
    fn test_valid_roster_accepted() {
        assert!(validate_team_specs(&full_specs()).is_ok());
    }

    #[test]
    fn test_short_roster_rejected() {
        let mut specs = full_specs();
        specs.pop();
        assert!(validate_team_specs(&specs).is_err());
    }

    #[test]
    fn test_duplicate_seed_rejected() {
        let mut specs = full_specs();
        specs[0].seed = 2;
        assert!(validate_team_specs(&specs).is_err());
    }

    #[test]
    fn test_unknown_region_rejected() {
        let mut specs = full_specs();
        specs[0].region = "north".to_string();
        assert!(validate_team_specs(&specs).is_err());
    }
}
