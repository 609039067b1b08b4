//! Placement phase: turn rotation and where a penguin may be put down.
//!
//! Penguins may only start on ice with exactly one fish. The fish on the
//! chosen tile is awarded to the placing player.

use thiserror::Error;

use crate::game::{GamePhase, LogEntry, LogEntryKind};
use crate::{Coords, Game, Tile};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Error)]
pub enum PlacementError {
    #[error("can't place a penguin outside of the board")]
    OutOfBounds,
    #[error("can't place a penguin on water")]
    EmptyTile,
    #[error("this tile is occupied by another player's penguin")]
    EnemyPenguin,
    #[error("this tile is already occupied by your penguin")]
    OwnPenguin,
    #[error("penguins can only be placed on tiles with exactly one fish")]
    MultipleFish,
}

/// Why no player could be given the next placement turn. Both end the phase.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Error)]
pub enum PlacementSwitchError {
    #[error("all penguins have been placed")]
    AllPenguinsPlaced,
    #[error("there are no free tiles left to place a penguin on")]
    NoMoreFreeTiles,
}

impl Game {
    pub fn placement_begin(&mut self) {
        assert!(
            matches!(self.phase, GamePhase::SetupDone | GamePhase::PlacementDone),
            "cannot begin placement in {:?}",
            self.phase
        );
        self.set_phase(GamePhase::Placement);
        self.set_current_player(None);
    }

    pub fn placement_end(&mut self) {
        assert_eq!(self.phase, GamePhase::Placement);
        self.set_phase(GamePhase::PlacementDone);
    }

    /// Hand the turn to the next player, in order after the current one, who
    /// still has penguins to place. Returns that player's id.
    pub fn placement_switch_player(&mut self) -> Result<i16, PlacementSwitchError> {
        assert_eq!(self.phase, GamePhase::Placement);
        if !self.any_valid_placement_exists() {
            return Err(PlacementSwitchError::NoMoreFreeTiles);
        }

        let count = self.players.len();
        let quota = self.penguins_per_player();
        let mut idx = self.current_player_index;
        for _ in 0..count {
            let next = idx.map_or(0, |i| (i + 1) % count);
            idx = Some(next);
            let player = &self.players[next];
            if player.penguins.len() < quota {
                let id = player.id;
                self.set_current_player(Some(next));
                return Ok(id);
            }
        }
        Err(PlacementSwitchError::AllPenguinsPlaced)
    }

    pub fn any_valid_placement_exists(&self) -> bool {
        self.board.coords().any(|c| self.validate_placement_simple(c))
    }

    /// Cheap form of [`Game::validate_placement`] for exhaustive scans.
    #[inline]
    pub fn validate_placement_simple(&self, target: Coords) -> bool {
        self.board.in_bounds(target) && self.board.get(target) == Tile::fish(1)
    }

    /// Check a placement by the current player, reporting the first problem.
    pub fn validate_placement(&self, target: Coords) -> Result<(), PlacementError> {
        if !self.board.in_bounds(target) {
            return Err(PlacementError::OutOfBounds);
        }
        let tile = self.board.get(target);
        if tile.is_water() {
            return Err(PlacementError::EmptyTile);
        }
        if tile.is_penguin() {
            return Err(if tile.player_id() == self.current_player().id {
                PlacementError::OwnPenguin
            } else {
                PlacementError::EnemyPenguin
            });
        }
        if tile.fish_count() > 1 {
            return Err(PlacementError::MultipleFish);
        }
        Ok(())
    }

    /// Put a penguin of the current player on `target`. The placement must
    /// have been validated.
    pub fn place_penguin(&mut self, target: Coords) {
        assert_eq!(self.phase, GamePhase::Placement);
        debug_assert_eq!(self.validate_placement(target), Ok(()));
        let idx = self.current_player_index.expect("no current player");
        let quota = self.penguins_per_player();
        let undo_tile = self.board.get(target);

        self.log_push(LogEntry::Placement { target, undo_tile });
        let player = self.player_mut(idx);
        assert!(player.penguins.len() < quota, "player {} has no penguins left to place", player.id);
        let id = player.id;
        player.penguins.push(target);
        player.points += undo_tile.fish_count() as u32;
        player.moves_count += 1;
        self.board.set(target, Tile::penguin(id));
    }

    /// Revert the most recent placement recorded in the log.
    pub fn undo_place_penguin(&mut self) {
        assert_eq!(self.phase, GamePhase::Placement);
        let entry = self.log_pop(LogEntryKind::Placement);
        let LogEntry::Placement { target, undo_tile } = self.log[entry] else {
            unreachable!()
        };

        let idx = self.penguin_owner(target).expect("no penguin at the placement target");
        let player = self.player_mut(idx);
        let pos = player
            .penguins
            .iter()
            .rposition(|&p| p == target)
            .expect("penguin missing from its owner's list");
        player.penguins.remove(pos);
        player.points -= undo_tile.fish_count() as u32;
        player.moves_count -= 1;
        self.board.set(target, undo_tile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{fixture, fixture_with_quota};

    fn placing(rows: &[&str], players: usize, quota: usize) -> Game {
        let mut game = fixture_with_quota(rows, players, Some(quota));
        game.placement_begin();
        game.placement_switch_player().unwrap();
        game
    }

    #[test]
    fn test_validate_placement_errors() {
        let game = placing(&["12~", "AB1"], 2, 2);
        assert_eq!(game.current_player_index(), Some(0));
        assert_eq!(game.validate_placement(Coords::new(0, 0)), Ok(()));
        assert_eq!(game.validate_placement(Coords::new(1, 0)), Err(PlacementError::MultipleFish));
        assert_eq!(game.validate_placement(Coords::new(2, 0)), Err(PlacementError::EmptyTile));
        assert_eq!(game.validate_placement(Coords::new(0, 1)), Err(PlacementError::OwnPenguin));
        assert_eq!(game.validate_placement(Coords::new(1, 1)), Err(PlacementError::EnemyPenguin));
        assert_eq!(game.validate_placement(Coords::new(3, 0)), Err(PlacementError::OutOfBounds));
        assert_eq!(game.validate_placement(Coords::new(0, -1)), Err(PlacementError::OutOfBounds));
    }

    #[test]
    fn test_validate_placement_simple() {
        let game = placing(&["12~A"], 1, 2);
        assert!(game.validate_placement_simple(Coords::new(0, 0)));
        assert!(!game.validate_placement_simple(Coords::new(1, 0)));
        assert!(!game.validate_placement_simple(Coords::new(2, 0)));
        assert!(!game.validate_placement_simple(Coords::new(3, 0)));
        assert!(!game.validate_placement_simple(Coords::new(9, 9)));
    }

    #[test]
    fn test_place_and_undo() {
        let mut game = placing(&["11", "31"], 1, 1);
        let before = game.clone();
        game.place_penguin(Coords::new(1, 1));

        assert_eq!(game.board().get(Coords::new(1, 1)), Tile::penguin(1));
        assert_eq!(game.player(0).penguins, vec![Coords::new(1, 1)]);
        assert_eq!(game.player(0).points, 1);
        assert_eq!(game.player(0).moves_count, 1);
        assert_eq!(game.log_entries().last(), Some(&LogEntry::Placement { target: Coords::new(1, 1), undo_tile: Tile(1) }));

        game.undo_place_penguin();
        assert_eq!(game.board(), before.board());
        assert_eq!(game.players(), before.players());
        assert_eq!(game.log_current(), before.log_current());
    }

    #[test]
    fn test_switch_player_rotates_and_skips_finished() {
        let mut game = fixture(&["1111", "1111"], 3);
        game.placement_begin();
        assert_eq!(game.placement_switch_player(), Ok(1));
        game.place_penguin(Coords::new(0, 0));
        assert_eq!(game.placement_switch_player(), Ok(2));
        game.place_penguin(Coords::new(1, 0));
        assert_eq!(game.placement_switch_player(), Ok(3));
        game.place_penguin(Coords::new(2, 0));
        assert_eq!(game.placement_switch_player(), Err(PlacementSwitchError::AllPenguinsPlaced));
    }

    #[test]
    fn test_switch_player_without_free_tiles() {
        let mut game = fixture(&["2~1"], 2);
        game.placement_begin();
        assert_eq!(game.placement_switch_player(), Ok(1));
        game.place_penguin(Coords::new(2, 0));
        assert!(!game.any_valid_placement_exists());
        assert_eq!(game.placement_switch_player(), Err(PlacementSwitchError::NoMoreFreeTiles));
    }

    #[test]
    #[should_panic]
    fn test_undo_without_placement_panics() {
        let mut game = placing(&["1"], 1, 1);
        game.undo_place_penguin();
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PlacementError::MultipleFish.to_string(),
            "penguins can only be placed on tiles with exactly one fish"
        );
        assert_eq!(PlacementSwitchError::AllPenguinsPlaced.to_string(), "all penguins have been placed");
    }
}
