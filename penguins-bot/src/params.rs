//! Bot configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Weighted scan of the surroundings, see [`crate::BotState::rate_placement`].
    #[default]
    Smart,
    Random,
    /// First free tile in row-major order.
    FirstPossible,
    /// Tile with the most fish in its scan window.
    MostFish,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStrategy {
    /// Scored lookahead, see [`crate::BotState::rate_move`].
    #[default]
    Smart,
    Random,
    /// First legal move, also known as the dumb bot.
    FirstPossible,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("unknown bot option {0:?}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

impl FromStr for PlacementStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "smart" => Ok(PlacementStrategy::Smart),
            "random" => Ok(PlacementStrategy::Random),
            "first" => Ok(PlacementStrategy::FirstPossible),
            "fish" => Ok(PlacementStrategy::MostFish),
            _ => Err(()),
        }
    }
}

impl FromStr for MovementStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "smart" => Ok(MovementStrategy::Smart),
            "random" => Ok(MovementStrategy::Random),
            "first" => Ok(MovementStrategy::FirstPossible),
            _ => Err(()),
        }
    }
}

/// Read-only for the duration of a search, so one instance can be shared by
/// concurrent searches on different games.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BotParameters {
    pub placement_strategy: PlacementStrategy,
    /// Half-width of the square window [`crate::BotState::rate_placement`]
    /// looks at.
    pub placement_scan_area: i32,
    pub movement_strategy: MovementStrategy,
    /// Longest slide considered, in tiles. Must be positive.
    pub max_move_length: u32,
    /// Lookahead depth for follow-up moves, zero disables it.
    pub recursion_limit: u32,
    /// Deepest level at which junction checks run, -1 disables them.
    pub junction_check_recursion_limit: i32,
}

impl Default for BotParameters {
    fn default() -> Self {
        BotParameters {
            placement_strategy: PlacementStrategy::Smart,
            placement_scan_area: 6,
            movement_strategy: MovementStrategy::Smart,
            max_move_length: u32::MAX,
            recursion_limit: 2,
            junction_check_recursion_limit: 1,
        }
    }
}

impl BotParameters {
    /// Apply one `key=value` command line override. Keys carry the `bot-`
    /// prefix.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), ParamError> {
        let invalid = || ParamError::InvalidValue { key: key.to_owned(), value: value.to_owned() };
        match key {
            "bot-placement" => self.placement_strategy = value.parse().map_err(|_| invalid())?,
            "bot-movement" => self.movement_strategy = value.parse().map_err(|_| invalid())?,
            "bot-placement-scan-area" => {
                self.placement_scan_area = value.parse().ok().filter(|&n: &i32| n >= 0).ok_or_else(invalid)?
            }
            "bot-max-move-steps" => {
                self.max_move_length = value.parse().ok().filter(|&n: &u32| n > 0).ok_or_else(invalid)?
            }
            "bot-recursion" => self.recursion_limit = value.parse().map_err(|_| invalid())?,
            "bot-junction-check-recursion" => {
                self.junction_check_recursion_limit =
                    value.parse().ok().filter(|&n: &i32| n >= -1).ok_or_else(invalid)?
            }
            _ => return Err(ParamError::UnknownKey(key.to_owned())),
        }
        Ok(())
    }

    /// Whether junction checks run at the given search depth.
    #[inline]
    pub fn junction_checks_at(&self, depth: u32) -> bool {
        self.junction_check_recursion_limit >= 0 && depth as i32 <= self.junction_check_recursion_limit
    }
}
