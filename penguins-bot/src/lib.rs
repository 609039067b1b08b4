//! Penguins bot: picks placements and moves for the current player.
//!
//! The entry points below run the search on a private copy of the game, so
//! the caller's game is never touched and several searches can run at once.
//! Long searches are stopped through the shared cancellation flag; a
//! cancelled search returns `None`.
//!
//! ```text
//!   Game ──clone──▶ BotState ──▶ compute_placement / compute_move
//!                      │
//!                      ├─ scratch arena (moves + scores per depth)
//!                      └─ flood fill grids for junction analysis
//! ```

pub mod autonomous;
pub mod flood_fill;
pub mod params;
pub mod search;
pub mod stats;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use penguins_core::{Coords, Game, Rng};

pub use params::{BotParameters, MovementStrategy, ParamError, PlacementStrategy};
pub use search::{quick_junction_check, BotMove, BotState};
pub use stats::SearchStats;

/// Pick a tile for the current player's next penguin. The game must be in
/// the placement phase with a current player.
pub fn compute_placement(
    params: &BotParameters,
    game: &Game,
    rng: &mut dyn Rng,
    cancelled: Arc<AtomicBool>,
) -> Option<Coords> {
    let mut game = game.clone();
    BotState::new(params, &mut game, rng, cancelled).compute_placement()
}

/// Pick a move for the current player. The game must be in the movement
/// phase with a current player.
pub fn compute_move(
    params: &BotParameters,
    game: &Game,
    rng: &mut dyn Rng,
    cancelled: Arc<AtomicBool>,
) -> Option<BotMove> {
    let mut game = game.clone();
    BotState::new(params, &mut game, rng, cancelled).compute_move()
}
