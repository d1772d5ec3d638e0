//! Structured audit logging for pool-changing events.
//!
//! Draw completion, game finalization, eliminations, and payout assignments
//! are logged using tracing spans for structured output.

/// Log completion of the one-time blind draw
pub fn log_draw_completed(pool_id: &str) {
    tracing::info!(
        target: "audit",
        event = "draw_completed",
        pool_id = pool_id,
        "Blind draw completed for pool {}",
        pool_id
    );
}

/// Log a finalized game with both the straight winner and the covering team
pub fn log_game_finalized(
    pool_id: &str,
    game_id: &str,
    winning_team_id: &str,
    covering_team_id: &str,
) {
    tracing::info!(
        target: "audit",
        event = "game_finalized",
        pool_id = pool_id,
        game_id = game_id,
        winning_team_id = winning_team_id,
        covering_team_id = covering_team_id,
        "Game {} finalized: winner {}, covered by {}",
        game_id,
        winning_team_id,
        covering_team_id
    );
}

/// Log an entry elimination
pub fn log_entry_eliminated(pool_id: &str, entry_id: &str, round: &str) {
    tracing::info!(
        target: "audit",
        event = "entry_eliminated",
        pool_id = pool_id,
        entry_id = entry_id,
        round = round,
        "Entry {} eliminated in {} for pool {}",
        entry_id,
        round,
        pool_id
    );
}

/// Log a payout percentage assignment
pub fn log_payout_assigned(pool_id: &str, entry_id: &str, pct: f64) {
    tracing::info!(
        target: "audit",
        event = "payout_assigned",
        pool_id = pool_id,
        entry_id = entry_id,
        pct = pct,
        "Entry {} assigned {}% in pool {}",
        entry_id,
        pct,
        pool_id
    );
}

/// Log pool completion with the champion entry
pub fn log_pool_completed(pool_id: &str, champion_entry_id: &str) {
    tracing::info!(
        target: "audit",
        event = "pool_completed",
        pool_id = pool_id,
        champion_entry_id = champion_entry_id,
        "Pool {} completed; champion entry {}",
        pool_id,
        champion_entry_id
    );
}
