//! One bot turn on a game loaded from a board file.
//!
//! The referee hands every player the same file in turn. We start the phase,
//! rotate the turn to ourselves and act only if the rules let us; anything
//! else is "no action", which the binary reports through its exit code.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::info;
use penguins_core::{Game, Rng};

use crate::params::BotParameters;
use crate::search::BotState;

/// Name used when the command line doesn't set one.
pub const DEFAULT_PLAYER_NAME: &str = "102D";

pub fn find_player_by_name(game: &Game, name: &str) -> Option<usize> {
    game.players().iter().position(|p| p.name.as_deref() == Some(name))
}

/// Hand the turn to `my_idx` if it is theirs by the rotation rules: position
/// the turn right before them and let the phase pick the next player.
fn take_turn(game: &mut Game, my_idx: usize, switch: impl FnOnce(&mut Game) -> Option<i16>) -> bool {
    game.set_current_player(my_idx.checked_sub(1));
    match switch(game) {
        Some(id) if id == game.player(my_idx).id => true,
        Some(id) => {
            info!("player {} is next, not us", id);
            false
        }
        None => false,
    }
}

/// Place one penguin for player `my_idx`. The game must be in `SetupDone` or
/// `PlacementDone`. Returns whether a penguin was placed.
pub fn run_placement_turn(
    game: &mut Game,
    my_idx: usize,
    params: &BotParameters,
    rng: &mut dyn Rng,
    cancelled: Arc<AtomicBool>,
) -> bool {
    game.placement_begin();
    let mut placed = false;
    let my_turn = take_turn(game, my_idx, |g| match g.placement_switch_player() {
        Ok(id) => Some(id),
        Err(e) => {
            info!("no placement possible: {}", e);
            None
        }
    });
    if my_turn {
        let mut search = game.clone();
        let target = BotState::new(params, &mut search, rng, cancelled).compute_placement();
        if let Some(target) = target {
            debug_assert_eq!(game.validate_placement(target), Ok(()));
            game.place_penguin(target);
            placed = true;
        }
    }
    game.placement_end();
    placed
}

/// Move one penguin of player `my_idx`. The game must be in `SetupDone`,
/// `PlacementDone` or `MovementDone`. Returns whether a move was made.
pub fn run_movement_turn(
    game: &mut Game,
    my_idx: usize,
    params: &BotParameters,
    rng: &mut dyn Rng,
    cancelled: Arc<AtomicBool>,
) -> bool {
    game.movement_begin();
    let mut moved = false;
    let my_turn = take_turn(game, my_idx, |g| match g.movement_switch_player() {
        Ok(id) => Some(id),
        Err(e) => {
            info!("no movement possible: {}", e);
            None
        }
    });
    if my_turn {
        let mut search = game.clone();
        let picked = BotState::new(params, &mut search, rng, cancelled).compute_move();
        if let Some(m) = picked {
            debug_assert_eq!(game.validate_movement(m.penguin, m.target), Ok(()));
            let fish = game.move_penguin(m.penguin, m.target);
            info!("captured {} fish", fish);
            moved = true;
        }
    }
    game.movement_end();
    moved
}
