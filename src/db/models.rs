use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::bracket::graph::{Region, Round};
use crate::bracket::payouts::PayoutScheme;
use crate::bracket::resolver::PushRule;

/// A pool aggregate: one tenant's bracket tournament plus its immutable
/// configuration. The payout percentages are tier totals (see
/// `PayoutScheme`); `draw_completed` is the one-way gate for the blind draw.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pool {
    pub id: String,
    pub name: String,
    pub push_rule: String,
    pub spreads_enabled: bool,
    pub sweet16_pct: f64,
    pub elite8_pct: f64,
    pub final_four_pct: f64,
    pub runner_up_pct: f64,
    pub champion_pct: f64,
    pub draw_completed: bool,
    pub draw_completed_at: Option<String>,
    pub champion_entry_id: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl Pool {
    pub fn new(
        name: String,
        push_rule: PushRule,
        spreads_enabled: bool,
        payouts: PayoutScheme,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            push_rule: push_rule.as_str().to_string(),
            spreads_enabled,
            sweet16_pct: payouts.sweet16_pct,
            elite8_pct: payouts.elite8_pct,
            final_four_pct: payouts.final_four_pct,
            runner_up_pct: payouts.runner_up_pct,
            champion_pct: payouts.champion_pct,
            draw_completed: false,
            draw_completed_at: None,
            champion_entry_id: None,
            status: "setup".to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn payout_scheme(&self) -> PayoutScheme {
        PayoutScheme {
            sweet16_pct: self.sweet16_pct,
            elite8_pct: self.elite8_pct,
            final_four_pct: self.final_four_pct,
            runner_up_pct: self.runner_up_pct,
            champion_pct: self.champion_pct,
        }
    }

    pub fn push_rule(&self) -> Option<PushRule> {
        self.push_rule.parse().ok()
    }
}

/// A participant entry. `original_team_id` is fixed forever at draw time;
/// `current_team_id` is the team the entry advances with.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: String,
    pub pool_id: String,
    pub display_name: String,
    pub current_team_id: Option<String>,
    pub original_team_id: Option<String>,
    pub eliminated: bool,
    pub eliminated_round: Option<String>,
    pub payout_pct: f64,
    pub created_at: String,
}

impl Entry {
    pub fn new(pool_id: String, display_name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            pool_id,
            display_name,
            current_team_id: None,
            original_team_id: None,
            eliminated: false,
            eliminated_round: None,
            payout_pct: 0.0,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn eliminated_round(&self) -> Option<Round> {
        self.eliminated_round.as_deref().and_then(|r| r.parse().ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: String,
    pub pool_id: String,
    pub name: String,
    pub seed: i32,
    pub region: String,
    pub eliminated: bool,
    pub eliminated_round: Option<String>,
    pub created_at: String,
}

impl Team {
    pub fn new(pool_id: String, name: String, seed: i32, region: Region) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            pool_id,
            name,
            seed,
            region: region.as_str().to_string(),
            eliminated: false,
            eliminated_round: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// One bracket game. The higher/lower prefixes name the two slots of the
/// game: in the first round the higher slot holds the better seed, and in
/// later rounds it holds whichever side the bracket graph feeds into it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub id: String,
    pub pool_id: String,
    pub round: String,
    pub region: Option<String>,
    pub game_number: i32,
    pub higher_seed_team_id: Option<String>,
    pub lower_seed_team_id: Option<String>,
    pub spread: Option<f64>,
    pub higher_seed_score: Option<i64>,
    pub lower_seed_score: Option<i64>,
    pub status: String,
    pub winning_team_id: Option<String>,
    pub spread_covering_team_id: Option<String>,
    pub higher_seed_entry_id: Option<String>,
    pub lower_seed_entry_id: Option<String>,
    pub advancing_entry_id: Option<String>,
    pub created_at: String,
}

impl Game {
    pub fn new(pool_id: String, round: Round, region: Option<Region>, game_number: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            pool_id,
            round: round.as_str().to_string(),
            region: region.map(|r| r.as_str().to_string()),
            game_number,
            higher_seed_team_id: None,
            lower_seed_team_id: None,
            spread: None,
            higher_seed_score: None,
            lower_seed_score: None,
            status: "scheduled".to_string(),
            winning_team_id: None,
            spread_covering_team_id: None,
            higher_seed_entry_id: None,
            lower_seed_entry_id: None,
            advancing_entry_id: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn round_tag(&self) -> Option<Round> {
        self.round.parse().ok()
    }

    pub fn region_tag(&self) -> Option<Region> {
        self.region.as_deref().and_then(|r| r.parse().ok())
    }

    pub fn is_final(&self) -> bool {
        self.status == "final"
    }
}
