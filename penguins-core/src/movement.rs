//! Movement phase: turn rotation, move validation and execution.
//!
//! Penguins slide orthogonally over any number of fish tiles. Every tile
//! passed over, including the destination, is captured: its fish go to the
//! mover and the tiles behind the penguin turn into water.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{GamePhase, LogEntry, LogEntryKind};
use crate::{Coords, Direction, Game, Tile};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Error)]
pub enum MovementError {
    #[error("can't move outside of the board")]
    OutOfBounds,
    #[error("the penguin is already there")]
    CurrentLocation,
    #[error("penguins can't move diagonally")]
    Diagonal,
    #[error("choose a penguin to move")]
    NotAPenguin,
    #[error("choose your own penguin")]
    NotYourPenguin,
    #[error("can't move onto water at ({}, {})", at.x, at.y)]
    OntoEmptyTile { at: Coords },
    #[error("can't move onto another penguin at ({}, {})", at.x, at.y)]
    OntoPenguin { at: Coords },
    #[error("can't move over water at ({}, {})", at.x, at.y)]
    OverEmptyTile { at: Coords },
    #[error("can't move over another penguin at ({}, {})", at.x, at.y)]
    OverPenguin { at: Coords },
    #[error("this penguin has no moves left")]
    PenguinBlocked,
}

impl MovementError {
    /// The tile on the path where the move broke, if the failure happened
    /// past the start.
    pub fn fail_coords(&self) -> Option<Coords> {
        match *self {
            MovementError::OntoEmptyTile { at }
            | MovementError::OntoPenguin { at }
            | MovementError::OverEmptyTile { at }
            | MovementError::OverPenguin { at } => Some(at),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Error)]
pub enum MovementSwitchError {
    #[error("no player can make a move")]
    NoMovesLeft,
}

/// Longest legal slide in each [`Direction`], indexed by `Direction as usize`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct PossibleSteps(pub [u32; 4]);

impl PossibleSteps {
    #[inline]
    pub fn get(&self, dir: Direction) -> u32 {
        self.0[dir as usize]
    }

    /// Number of distinct destinations.
    #[inline]
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl Game {
    pub fn movement_begin(&mut self) {
        assert!(
            matches!(
                self.phase,
                GamePhase::SetupDone | GamePhase::PlacementDone | GamePhase::MovementDone
            ),
            "cannot begin movement in {:?}",
            self.phase
        );
        self.set_phase(GamePhase::Movement);
        self.set_current_player(None);
    }

    pub fn movement_end(&mut self) {
        assert_eq!(self.phase, GamePhase::Movement);
        self.set_phase(GamePhase::MovementDone);
    }

    /// Hand the turn to the next player, in order after the current one, who
    /// can still move at least one penguin. Returns that player's id.
    pub fn movement_switch_player(&mut self) -> Result<i16, MovementSwitchError> {
        assert_eq!(self.phase, GamePhase::Movement);
        let count = self.players.len();
        let mut idx = self.current_player_index;
        for _ in 0..count {
            let next = idx.map_or(0, |i| (i + 1) % count);
            idx = Some(next);
            if self.any_valid_player_move_exists(next) {
                let id = self.players[next].id;
                self.set_current_player(Some(next));
                return Ok(id);
            }
        }
        Err(MovementSwitchError::NoMovesLeft)
    }

    pub fn any_valid_player_move_exists(&self, player_idx: usize) -> bool {
        self.player(player_idx)
            .penguins
            .iter()
            .any(|&penguin| self.count_obstructed_directions(penguin) < 4)
    }

    /// Check that `start` selects a movable penguin of the current player.
    pub fn validate_movement_start(&self, start: Coords) -> Result<(), MovementError> {
        if !self.board.in_bounds(start) {
            return Err(MovementError::OutOfBounds);
        }
        let tile = self.board.get(start);
        if !tile.is_penguin() {
            return Err(MovementError::NotAPenguin);
        }
        if tile.player_id() != self.current_player().id {
            return Err(MovementError::NotYourPenguin);
        }
        if self.count_obstructed_directions(start) == 4 {
            return Err(MovementError::PenguinBlocked);
        }
        Ok(())
    }

    /// Check a move by the current player. Walks from `start` toward `target`
    /// and reports the first problem found.
    pub fn validate_movement(&self, start: Coords, target: Coords) -> Result<(), MovementError> {
        if !self.board.in_bounds(target) {
            return Err(MovementError::OutOfBounds);
        }
        if start == target {
            return Err(MovementError::CurrentLocation);
        }
        let dir = Direction::between(start, target).ok_or(MovementError::Diagonal)?;
        if !self.board.in_bounds(start) || !self.board.get(start).is_penguin() {
            return Err(MovementError::NotAPenguin);
        }
        if self.board.get(start).player_id() != self.current_player().id {
            return Err(MovementError::NotYourPenguin);
        }

        let mut at = start;
        while at != target {
            at = at.offset(dir.offset());
            let tile = self.board.get(at);
            let onto = at == target;
            if tile.is_water() {
                return Err(if onto {
                    MovementError::OntoEmptyTile { at }
                } else {
                    MovementError::OverEmptyTile { at }
                });
            }
            if tile.is_penguin() {
                return Err(if onto {
                    MovementError::OntoPenguin { at }
                } else {
                    MovementError::OverPenguin { at }
                });
            }
        }
        Ok(())
    }

    /// How many of the four orthogonal neighbors can't be stepped on.
    pub fn count_obstructed_directions(&self, penguin: Coords) -> u32 {
        assert!(self.board.in_bounds(penguin));
        Direction::ALL
            .iter()
            .filter(|dir| !self.board.is_fish_at(penguin.offset(dir.offset())))
            .count() as u32
    }

    pub fn calculate_penguin_possible_moves(&self, start: Coords) -> PossibleSteps {
        assert!(self.board.in_bounds(start));
        let mut steps = PossibleSteps::default();
        for dir in Direction::ALL {
            let mut at = start.offset(dir.offset());
            while self.board.is_fish_at(at) {
                steps.0[dir as usize] += 1;
                at = at.offset(dir.offset());
            }
        }
        steps
    }

    /// Slide the current player's penguin from `start` to `target`, capturing
    /// every tile on the way. The move must have been validated. Returns the
    /// number of fish captured.
    pub fn move_penguin(&mut self, start: Coords, target: Coords) -> u32 {
        assert_eq!(self.phase, GamePhase::Movement);
        debug_assert_eq!(self.validate_movement(start, target), Ok(()));
        let idx = self.current_player_index.expect("no current player");
        let dir = Direction::between(start, target).expect("move is not orthogonal");

        let mut path = Vec::new();
        let mut fish = 0u32;
        let mut at = start.offset(dir.offset());
        while at != target {
            let tile = self.board.get(at);
            fish += tile.fish_count() as u32;
            path.push(tile);
            self.board.set(at, Tile::WATER);
            at = at.offset(dir.offset());
        }
        let undo_tile = self.board.get(target);
        fish += undo_tile.fish_count() as u32;

        self.log_push(LogEntry::Movement { penguin: start, target, undo_tile, path });
        let player = self.player_mut(idx);
        let id = player.id;
        let slot = player
            .penguins
            .iter_mut()
            .find(|p| **p == start)
            .expect("penguin missing from its owner's list");
        *slot = target;
        player.points += fish;
        player.moves_count += 1;
        self.board.set(target, Tile::penguin(id));
        self.board.set(start, Tile::WATER);
        fish
    }

    /// Revert the most recent move recorded in the log.
    pub fn undo_move_penguin(&mut self) {
        assert_eq!(self.phase, GamePhase::Movement);
        let entry = self.log_pop(LogEntryKind::Movement);
        let LogEntry::Movement { penguin, target, undo_tile, ref mut path } = self.log[entry] else {
            unreachable!()
        };
        let path = std::mem::take(path);

        let idx = self.penguin_owner(target).expect("no penguin at the movement target");
        let dir = Direction::between(penguin, target).expect("logged move is not orthogonal");
        let mut fish = undo_tile.fish_count() as u32;
        let mut at = penguin.offset(dir.offset());
        for &tile in &path {
            fish += tile.fish_count() as u32;
            self.board.set(at, tile);
            at = at.offset(dir.offset());
        }
        self.board.set(target, undo_tile);

        let player = self.player_mut(idx);
        let id = player.id;
        let slot = player
            .penguins
            .iter_mut()
            .find(|p| **p == target)
            .expect("penguin missing from its owner's list");
        *slot = penguin;
        player.points -= fish;
        player.moves_count -= 1;
        self.board.set(penguin, Tile::penguin(id));

        if let LogEntry::Movement { path: slot, .. } = &mut self.log[entry] {
            *slot = path;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::fixture;

    fn moving(rows: &[&str], players: usize) -> Game {
        let mut game = fixture(rows, players);
        game.movement_begin();
        game.movement_switch_player().unwrap();
        game
    }

    #[test]
    fn test_validate_movement_errors() {
        let game = moving(&["A1~1", "1B11", "1111"], 2);
        let a = Coords::new(0, 0);
        assert_eq!(game.validate_movement(a, Coords::new(1, 0)), Ok(()));
        assert_eq!(game.validate_movement(a, Coords::new(0, 2)), Ok(()));
        assert_eq!(game.validate_movement(a, Coords::new(4, 0)), Err(MovementError::OutOfBounds));
        assert_eq!(game.validate_movement(a, a), Err(MovementError::CurrentLocation));
        assert_eq!(game.validate_movement(a, Coords::new(1, 1)), Err(MovementError::Diagonal));
        assert_eq!(
            game.validate_movement(Coords::new(2, 2), Coords::new(3, 2)),
            Err(MovementError::NotAPenguin)
        );
        assert_eq!(
            game.validate_movement(Coords::new(1, 1), Coords::new(1, 2)),
            Err(MovementError::NotYourPenguin)
        );
        assert_eq!(
            game.validate_movement(a, Coords::new(2, 0)),
            Err(MovementError::OntoEmptyTile { at: Coords::new(2, 0) })
        );
        assert_eq!(
            game.validate_movement(a, Coords::new(3, 0)),
            Err(MovementError::OverEmptyTile { at: Coords::new(2, 0) })
        );
    }

    #[test]
    fn test_validate_movement_penguin_in_the_way() {
        let game = moving(&["A1B1"], 2);
        let a = Coords::new(0, 0);
        assert_eq!(
            game.validate_movement(a, Coords::new(2, 0)),
            Err(MovementError::OntoPenguin { at: Coords::new(2, 0) })
        );
        let err = game.validate_movement(a, Coords::new(3, 0)).unwrap_err();
        assert_eq!(err, MovementError::OverPenguin { at: Coords::new(2, 0) });
        assert_eq!(err.fail_coords(), Some(Coords::new(2, 0)));
        assert_eq!(MovementError::Diagonal.fail_coords(), None);
    }

    #[test]
    fn test_validate_movement_start() {
        let game = moving(&["A1~", "~~B", "A~1"], 2);
        assert_eq!(game.validate_movement_start(Coords::new(0, 0)), Ok(()));
        assert_eq!(game.validate_movement_start(Coords::new(0, 2)), Err(MovementError::PenguinBlocked));
        assert_eq!(game.validate_movement_start(Coords::new(2, 1)), Err(MovementError::NotYourPenguin));
        assert_eq!(game.validate_movement_start(Coords::new(1, 0)), Err(MovementError::NotAPenguin));
        assert_eq!(game.validate_movement_start(Coords::new(5, 0)), Err(MovementError::OutOfBounds));
    }

    #[test]
    fn test_possible_moves_and_obstruction() {
        let game = moving(&["~1~~", "1A11", "~1~~", "~2~~"], 1);
        let a = Coords::new(1, 1);
        let steps = game.calculate_penguin_possible_moves(a);
        assert_eq!(steps.get(Direction::Right), 2);
        assert_eq!(steps.get(Direction::Down), 2);
        assert_eq!(steps.get(Direction::Left), 1);
        assert_eq!(steps.get(Direction::Up), 1);
        assert_eq!(steps.total(), 6);
        assert_eq!(game.count_obstructed_directions(a), 0);
        assert_eq!(game.count_obstructed_directions(Coords::new(3, 1)), 3);
        assert_eq!(game.count_obstructed_directions(Coords::new(0, 0)), 2);
    }

    #[test]
    fn test_move_captures_path_and_undo_restores() {
        let mut game = moving(&["A231", "1111"], 1);
        let before = game.clone();

        let fish = game.move_penguin(Coords::new(0, 0), Coords::new(3, 0));
        assert_eq!(fish, 6);
        assert_eq!(game.board().get(Coords::new(0, 0)), Tile::WATER);
        assert_eq!(game.board().get(Coords::new(1, 0)), Tile::WATER);
        assert_eq!(game.board().get(Coords::new(2, 0)), Tile::WATER);
        assert_eq!(game.board().get(Coords::new(3, 0)), Tile::penguin(1));
        assert_eq!(game.player(0).penguins, vec![Coords::new(3, 0)]);
        assert_eq!(game.player(0).points, 6);
        assert_eq!(game.player(0).moves_count, 1);

        game.undo_move_penguin();
        assert_eq!(game.board(), before.board());
        assert_eq!(game.players(), before.players());
        assert_eq!(game.log_current(), before.log_current());
        // The entry stays available for redo with its captured path intact.
        assert_eq!(
            game.log_entries()[game.log_current()],
            LogEntry::Movement {
                penguin: Coords::new(0, 0),
                target: Coords::new(3, 0),
                undo_tile: Tile(1),
                path: vec![Tile(2), Tile(3)],
            }
        );
    }

    #[test]
    fn test_switch_player_skips_blocked() {
        let mut game = fixture(&["A~B1", "~~~~", "C1~~"], 3);
        game.movement_begin();
        assert_eq!(game.movement_switch_player(), Ok(2));
        game.move_penguin(Coords::new(2, 0), Coords::new(3, 0));
        assert_eq!(game.movement_switch_player(), Ok(3));
        game.move_penguin(Coords::new(0, 2), Coords::new(1, 2));
        assert_eq!(game.movement_switch_player(), Err(MovementSwitchError::NoMovesLeft));
        assert!(!game.any_valid_player_move_exists(0));
    }

    #[test]
    fn test_error_message_includes_coords() {
        let err = MovementError::OverPenguin { at: Coords::new(3, 4) };
        assert_eq!(err.to_string(), "can't move over another penguin at (3, 4)");
    }
}
