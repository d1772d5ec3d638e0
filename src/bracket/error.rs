//! Bracket engine error types
//!
//! Typed errors instead of String so callers can match on the exact
//! failure and the API layer can map each class to a status code.

use std::fmt;

/// Errors that can occur during draw, resolution, and advancement
#[derive(Debug, Clone, PartialEq)]
pub enum PoolError {
    // Validation errors
    CountMismatch { entries: usize, teams: usize },
    InvalidRoster { reason: String },
    InvalidScore { score: i64 },
    InvalidPayouts { total: f64 },
    InvalidPushRule { value: String },
    MissingSpread { game_id: String },
    MissingScores { game_id: String },

    // State errors
    AlreadyDrawn,
    DrawNotCompleted,
    AlreadyEliminated { entry_id: String },
    SpreadLocked { game_id: String },
    TiedGame { game_id: String },
    SlotsUnfilled { game_id: String },

    // Consistency errors: a mis-seeded bracket, surfaced verbatim
    NoDestination { round: String, game_number: i32 },
    OwnerNotFound { team_id: String },
    SlotConflict { game_id: String, slot: String },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::CountMismatch { entries, teams } => {
                write!(
                    f,
                    "Draw requires 64 entries and 64 teams, found {} entries and {} teams",
                    entries, teams
                )
            }
            PoolError::InvalidRoster { reason } => write!(f, "Invalid roster: {}", reason),
            PoolError::InvalidScore { score } => {
                write!(f, "Scores must be non-negative, got {}", score)
            }
            PoolError::InvalidPayouts { total } => {
                write!(f, "Payout percentages must sum to 100, got {}", total)
            }
            PoolError::InvalidPushRule { value } => {
                write!(f, "Unknown push rule: {}", value)
            }
            PoolError::MissingSpread { game_id } => {
                write!(f, "Game {} has no spread set", game_id)
            }
            PoolError::MissingScores { game_id } => {
                write!(f, "Game {} does not have both scores", game_id)
            }

            PoolError::AlreadyDrawn => write!(f, "The draw has already been completed"),
            PoolError::DrawNotCompleted => {
                write!(f, "The draw has not been completed yet")
            }
            PoolError::AlreadyEliminated { entry_id } => {
                write!(f, "Entry {} is already eliminated", entry_id)
            }
            PoolError::SpreadLocked { game_id } => {
                write!(f, "Game {} has started; the spread is locked", game_id)
            }
            PoolError::TiedGame { game_id } => {
                write!(f, "Game {} ended in a tie; tournament games cannot tie", game_id)
            }
            PoolError::SlotsUnfilled { game_id } => {
                write!(f, "Game {} does not yet have both teams", game_id)
            }

            PoolError::NoDestination { round, game_number } => {
                write!(
                    f,
                    "No destination slot for round {} game {}",
                    round, game_number
                )
            }
            PoolError::OwnerNotFound { team_id } => {
                write!(f, "No entry currently owns team {}", team_id)
            }
            PoolError::SlotConflict { game_id, slot } => {
                write!(
                    f,
                    "The {} slot of game {} is already occupied by a different entry",
                    slot, game_id
                )
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type for bracket engine operations
pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PoolError::CountMismatch {
            entries: 63,
            teams: 64,
        };
        assert_eq!(
            err.to_string(),
            "Draw requires 64 entries and 64 teams, found 63 entries and 64 teams"
        );

        let err = PoolError::AlreadyDrawn;
        assert_eq!(err.to_string(), "The draw has already been completed");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(PoolError::AlreadyDrawn, PoolError::AlreadyDrawn);
        assert_ne!(
            PoolError::AlreadyDrawn,
            PoolError::SpreadLocked {
                game_id: "g".to_string()
            }
        );
    }
}
