//! Bracket structure
//!
//! Pure round/region/game-number arithmetic for a 64-team single-elimination
//! bracket. Within a region, game g feeds game g / 2 in the next round; even
//! game numbers feed the higher slot, odd the lower. The four regional
//! champions converge into two Final Four games (East/West into game 0,
//! South/Midwest into game 1), which converge into the championship.
//! No mutation happens here; the advancement pipeline consults this map.

use serde::{Deserialize, Serialize};

use super::error::{PoolError, PoolResult};

/// Number of entries and teams in a pool
pub const FIELD_SIZE: usize = 64;

/// Teams seeded per region
pub const REGION_SEEDS: usize = 16;

/// Total games in the bracket (32 + 16 + 8 + 4 + 2 + 1)
pub const GAME_COUNT: usize = 63;

/// First-round pairings in bracket order: game g pits seed pair g so that
/// winners meet the standard way (1/16 plays the 8/9 winner, and so on).
pub const FIRST_ROUND_SEED_ORDER: [(i32, i32); 8] = [
    (1, 16),
    (8, 9),
    (5, 12),
    (4, 13),
    (6, 11),
    (3, 14),
    (7, 10),
    (2, 15),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Round {
    First,
    Second,
    Sweet16,
    Elite8,
    FinalFour,
    Championship,
}

impl Round {
    pub const ALL: [Round; 6] = [
        Round::First,
        Round::Second,
        Round::Sweet16,
        Round::Elite8,
        Round::FinalFour,
        Round::Championship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Round::First => "first",
            Round::Second => "second",
            Round::Sweet16 => "sweet16",
            Round::Elite8 => "elite8",
            Round::FinalFour => "final_four",
            Round::Championship => "championship",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Round::First => "Round of 64",
            Round::Second => "Round of 32",
            Round::Sweet16 => "Sweet Sixteen",
            Round::Elite8 => "Elite Eight",
            Round::FinalFour => "Final Four",
            Round::Championship => "Championship",
        }
    }

    /// Position in chronological round order, 0-based
    pub fn index(&self) -> usize {
        match self {
            Round::First => 0,
            Round::Second => 1,
            Round::Sweet16 => 2,
            Round::Elite8 => 3,
            Round::FinalFour => 4,
            Round::Championship => 5,
        }
    }

    /// Games in this round within a single region, if the round is regional
    pub fn games_per_region(&self) -> Option<i32> {
        match self {
            Round::First => Some(8),
            Round::Second => Some(4),
            Round::Sweet16 => Some(2),
            Round::Elite8 => Some(1),
            Round::FinalFour | Round::Championship => None,
        }
    }

    /// Total games across the bracket in this round
    pub fn total_games(&self) -> i32 {
        match self {
            Round::First => 32,
            Round::Second => 16,
            Round::Sweet16 => 8,
            Round::Elite8 => 4,
            Round::FinalFour => 2,
            Round::Championship => 1,
        }
    }
}

impl std::str::FromStr for Round {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Round::First),
            "second" => Ok(Round::Second),
            "sweet16" => Ok(Round::Sweet16),
            "elite8" => Ok(Round::Elite8),
            "final_four" => Ok(Round::FinalFour),
            "championship" => Ok(Round::Championship),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    East,
    West,
    South,
    Midwest,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::East, Region::West, Region::South, Region::Midwest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::East => "east",
            Region::West => "west",
            Region::South => "south",
            Region::Midwest => "midwest",
        }
    }
}

impl std::str::FromStr for Region {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "east" => Ok(Region::East),
            "west" => Ok(Region::West),
            "south" => Ok(Region::South),
            "midwest" => Ok(Region::Midwest),
            _ => Err(()),
        }
    }
}

/// Which side of the destination game an advancing entry lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Higher,
    Lower,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Higher => "higher",
            Slot::Lower => "lower",
        }
    }
}

/// Destination of an advancing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub round: Round,
    pub region: Option<Region>,
    pub game_number: i32,
    pub slot: Slot,
}

/// Maps (round, region, game number) to the next round's slot.
///
/// Fails with `NoDestination` for the championship (nothing follows it) and
/// for coordinates outside the bracket, which indicate a mis-seeded bracket.
pub fn next_slot(
    round: Round,
    region: Option<Region>,
    game_number: i32,
) -> PoolResult<Destination> {
    let no_destination = || PoolError::NoDestination {
        round: round.as_str().to_string(),
        game_number,
    };

    match round {
        Round::First | Round::Second | Round::Sweet16 => {
            let region = region.ok_or_else(no_destination)?;
            let per_region = round.games_per_region().ok_or_else(no_destination)?;
            if game_number < 0 || game_number >= per_region {
                return Err(no_destination());
            }
            let next_round = match round {
                Round::First => Round::Second,
                Round::Second => Round::Sweet16,
                _ => Round::Elite8,
            };
            Ok(Destination {
                round: next_round,
                region: Some(region),
                game_number: game_number / 2,
                slot: parity_slot(game_number),
            })
        }
        Round::Elite8 => {
            let region = region.ok_or_else(no_destination)?;
            if game_number != 0 {
                return Err(no_destination());
            }
            let (game_number, slot) = match region {
                Region::East => (0, Slot::Higher),
                Region::West => (0, Slot::Lower),
                Region::South => (1, Slot::Higher),
                Region::Midwest => (1, Slot::Lower),
            };
            Ok(Destination {
                round: Round::FinalFour,
                region: None,
                game_number,
                slot,
            })
        }
        Round::FinalFour => {
            if game_number < 0 || game_number >= 2 {
                return Err(no_destination());
            }
            Ok(Destination {
                round: Round::Championship,
                region: None,
                game_number: 0,
                slot: parity_slot(game_number),
            })
        }
        Round::Championship => Err(no_destination()),
    }
}

fn parity_slot(game_number: i32) -> Slot {
    if game_number % 2 == 0 {
        Slot::Higher
    } else {
        Slot::Lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regional_rounds_halve_game_numbers() {
        for g in 0..8 {
            let dest = next_slot(Round::First, Some(Region::East), g).unwrap();
            assert_eq!(dest.round, Round::Second);
            assert_eq!(dest.region, Some(Region::East));
            assert_eq!(dest.game_number, g / 2);
        }

        let dest = next_slot(Round::Second, Some(Region::South), 3).unwrap();
        assert_eq!(dest.round, Round::Sweet16);
        assert_eq!(dest.game_number, 1);
        assert_eq!(dest.slot, Slot::Lower);
    }

    #[test]
    fn test_parity_determines_slot() {
        let even = next_slot(Round::First, Some(Region::West), 4).unwrap();
        assert_eq!(even.slot, Slot::Higher);

        let odd = next_slot(Round::First, Some(Region::West), 5).unwrap();
        assert_eq!(odd.slot, Slot::Lower);
    }

    #[test]
    fn test_elite_eight_converges_to_final_four() {
        let east = next_slot(Round::Elite8, Some(Region::East), 0).unwrap();
        assert_eq!(east.round, Round::FinalFour);
        assert_eq!(east.region, None);
        assert_eq!(east.game_number, 0);
        assert_eq!(east.slot, Slot::Higher);

        let west = next_slot(Round::Elite8, Some(Region::West), 0).unwrap();
        assert_eq!((west.game_number, west.slot), (0, Slot::Lower));

        let south = next_slot(Round::Elite8, Some(Region::South), 0).unwrap();
        assert_eq!((south.game_number, south.slot), (1, Slot::Higher));

        let midwest = next_slot(Round::Elite8, Some(Region::Midwest), 0).unwrap();
        assert_eq!((midwest.game_number, midwest.slot), (1, Slot::Lower));
    }

    #[test]
    fn test_final_four_converges_to_championship() {
        let semi_one = next_slot(Round::FinalFour, None, 0).unwrap();
        assert_eq!(semi_one.round, Round::Championship);
        assert_eq!((semi_one.game_number, semi_one.slot), (0, Slot::Higher));

        let semi_two = next_slot(Round::FinalFour, None, 1).unwrap();
        assert_eq!((semi_two.game_number, semi_two.slot), (0, Slot::Lower));
    }

    #[test]
    fn test_championship_has_no_destination() {
        let err = next_slot(Round::Championship, None, 0).unwrap_err();
        assert!(matches!(err, PoolError::NoDestination { .. }));
    }

    #[test]
    fn test_out_of_range_game_number_rejected() {
        assert!(next_slot(Round::First, Some(Region::East), 8).is_err());
        assert!(next_slot(Round::First, Some(Region::East), -1).is_err());
        assert!(next_slot(Round::Elite8, Some(Region::East), 1).is_err());
        assert!(next_slot(Round::FinalFour, None, 2).is_err());
    }

    #[test]
    fn test_regional_rounds_require_region() {
        assert!(next_slot(Round::First, None, 0).is_err());
        assert!(next_slot(Round::Elite8, None, 0).is_err());
    }

    #[test]
    fn test_every_first_round_game_reaches_championship() {
        // Each of the 32 first-round games must chain to the championship
        // in exactly five hops, proving the graph is acyclic and convergent.
        for region in Region::ALL {
            for g in 0..8 {
                let mut round = Round::First;
                let mut reg = Some(region);
                let mut game_number = g;
                let mut hops = 0;
                while round != Round::Championship {
                    let dest = next_slot(round, reg, game_number).unwrap();
                    round = dest.round;
                    reg = dest.region;
                    game_number = dest.game_number;
                    hops += 1;
                    assert!(hops <= 5, "chain from {:?} game {} did not converge", region, g);
                }
                assert_eq!(hops, 5);
                assert_eq!(game_number, 0);
            }
        }
    }

    #[test]
    fn test_round_totals_cover_the_bracket() {
        let total: i32 = Round::ALL.iter().map(|r| r.total_games()).sum();
        assert_eq!(total as usize, GAME_COUNT);
    }

    #[test]
    fn test_round_round_trip() {
        for round in Round::ALL {
            assert_eq!(round.as_str().parse::<Round>().unwrap(), round);
        }
        for region in Region::ALL {
            assert_eq!(region.as_str().parse::<Region>().unwrap(), region);
        }
        assert!("mid-atlantic".parse::<Region>().is_err());
    }
}
