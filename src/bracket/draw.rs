//! Blind draw assignment
//!
//! Produces the one-time random bijection between entries and teams using a
//! Fisher-Yates shuffle over ChaCha20. The persistence side (the
//! `draw_completed` gate, writing `original_team_id`, seeding the first-round
//! entry slots) lives in the manager; this module is the pure assignment.

use rand::seq::SliceRandom;
use rand::Rng;

use super::error::{PoolError, PoolResult};

/// Pairs each entry id with a uniformly random team id.
///
/// The caller supplies the RNG so the manager can use entropy in production
/// while tests use a seeded generator.
pub fn assign<R: Rng>(
    entry_ids: &[String],
    team_ids: &[String],
    rng: &mut R,
) -> PoolResult<Vec<(String, String)>> {
    if entry_ids.len() != team_ids.len() {
        return Err(PoolError::CountMismatch {
            entries: entry_ids.len(),
            teams: team_ids.len(),
        });
    }

    let mut shuffled: Vec<String> = team_ids.to_vec();
    shuffled.shuffle(rng);

    Ok(entry_ids.iter().cloned().zip(shuffled).collect())
}
