//! The game state machine and its undo log.
//!
//! # Phases
//!
//! ```text
//! None -> Setup -> SetupDone -> Placement <-> PlacementDone
//!                                  -> Movement <-> MovementDone -> End
//! ```
//!
//! Players, the board and the penguin quota may only be changed in
//! [`GamePhase::Setup`]. After that every mutation goes through the
//! placement/movement rules, which record a [`LogEntry`] so the action can be
//! undone and redone with [`Game::rewind_to`].

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

use crate::{Board, Coords, Tile, TileAttribute};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    None,
    Setup,
    SetupDone,
    Placement,
    PlacementDone,
    Movement,
    MovementDone,
    End,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Player {
    /// Stable 1-based id, the penguin encoding on the board is `-id`.
    pub id: i16,
    pub name: Option<String>,
    /// Total fish captured.
    pub points: u32,
    /// Always equal to the set of board cells holding `-id`.
    pub penguins: Vec<Coords>,
    /// Completed placements and moves.
    pub moves_count: u32,
}

/// One reversible mutation. Each variant carries exactly what is needed to
/// invert it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LogEntry {
    PhaseChange { old: GamePhase, new: GamePhase },
    PlayerChange { old: Option<usize>, new: Option<usize> },
    Placement { target: Coords, undo_tile: Tile },
    Movement {
        penguin: Coords,
        target: Coords,
        undo_tile: Tile,
        /// Tiles captured between `penguin` and `target`, in walking order.
        path: Vec<Tile>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum LogEntryKind {
    PhaseChange,
    PlayerChange,
    Placement,
    Movement,
}

impl LogEntry {
    pub fn kind(&self) -> LogEntryKind {
        match self {
            LogEntry::PhaseChange { .. } => LogEntryKind::PhaseChange,
            LogEntry::PlayerChange { .. } => LogEntryKind::PlayerChange,
            LogEntry::Placement { .. } => LogEntryKind::Placement,
            LogEntry::Movement { .. } => LogEntryKind::Movement,
        }
    }
}

/// Complete state of one game. Cloning produces an independent deep copy,
/// which is what the bot searches on.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Game {
    pub(crate) phase: GamePhase,
    pub(crate) players: Vec<Player>,
    pub(crate) players_set: bool,
    pub(crate) penguins_per_player: Option<usize>,
    pub(crate) current_player_index: Option<usize>,
    pub(crate) board: Board,
    pub(crate) log: Vec<LogEntry>,
    pub(crate) log_current: usize,
    pub(crate) log_disabled: bool,
}

impl Game {
    pub fn new() -> Game {
        Game::default()
    }

    // ========== Accessors ==========

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[inline]
    pub fn players_count(&self) -> usize {
        self.players.len()
    }

    /// Quota of penguins each player places, zero until configured.
    #[inline]
    pub fn penguins_per_player(&self) -> usize {
        self.penguins_per_player.unwrap_or(0)
    }

    #[inline]
    pub fn current_player_index(&self) -> Option<usize> {
        self.current_player_index
    }

    /// Panics if `idx` does not name a player.
    #[inline]
    pub fn player(&self, idx: usize) -> &Player {
        assert!(idx < self.players.len(), "player index {} out of range", idx);
        &self.players[idx]
    }

    #[inline]
    pub(crate) fn player_mut(&mut self, idx: usize) -> &mut Player {
        assert!(idx < self.players.len(), "player index {} out of range", idx);
        &mut self.players[idx]
    }

    /// Panics if no player is currently active.
    #[inline]
    pub fn current_player(&self) -> &Player {
        let idx = self.current_player_index.expect("no current player");
        self.player(idx)
    }

    pub fn find_player_by_id(&self, id: i16) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Index of the player whose penguin stands on `coords`.
    pub fn penguin_owner(&self, coords: Coords) -> Option<usize> {
        let tile = self.board.get(coords);
        if !tile.is_penguin() {
            return None;
        }
        self.find_player_by_id(tile.player_id())
    }

    /// UIs may flip attribute bits in any phase, tile values are off limits
    /// outside of setup.
    pub fn set_tile_attr(&mut self, coords: Coords, attr: TileAttribute, value: bool) {
        self.board.set_attr(coords, attr, value);
    }

    pub fn set_all_tile_attr(&mut self, attr: TileAttribute, value: bool) {
        self.board.set_all_attr(attr, value);
    }

    // ========== Setup ==========

    pub fn begin_setup(&mut self) {
        assert_eq!(self.phase, GamePhase::None);
        self.set_phase(GamePhase::Setup);
    }

    /// Checks that the board, players, quota and every name are configured.
    /// Penguin lists are rebuilt from the board in row-major order.
    pub fn end_setup(&mut self) {
        assert_eq!(self.phase, GamePhase::Setup);
        assert!(self.board.is_allocated(), "board not set up");
        assert!(self.players_set, "players count not set");
        let quota = self.penguins_per_player.expect("penguins per player not set");
        for player in &self.players {
            assert!(player.name.is_some(), "player {} has no name", player.id);
        }

        for player in &mut self.players {
            player.penguins.clear();
        }
        for coords in self.board.coords() {
            let tile = self.board.get(coords);
            if tile.is_penguin() {
                let idx = self
                    .find_player_by_id(tile.player_id())
                    .unwrap_or_else(|| panic!("penguin of unknown player {} at {:?}", tile.player_id(), coords));
                self.players[idx].penguins.push(coords);
            }
        }
        for player in &self.players {
            assert!(player.penguins.len() <= quota, "player {} exceeds the penguin quota", player.id);
        }

        self.set_phase(GamePhase::SetupDone);
    }

    /// Create `count` unnamed players with ids `1..=count`. Allowed once.
    pub fn setup_players_count(&mut self, count: usize) {
        assert_eq!(self.phase, GamePhase::Setup);
        assert!(!self.players_set, "players already created");
        self.players = (1..=count)
            .map(|id| Player {
                id: id as i16,
                ..Player::default()
            })
            .collect();
        self.players_set = true;
    }

    pub fn setup_penguins_per_player(&mut self, value: usize) {
        assert_eq!(self.phase, GamePhase::Setup);
        self.penguins_per_player = Some(value);
    }

    pub fn setup_player_name(&mut self, idx: usize, name: &str) {
        assert_eq!(self.phase, GamePhase::Setup);
        self.player_mut(idx).name = Some(name.to_owned());
    }

    /// Override the default id, used when ids come from a saved board.
    pub fn setup_player_id(&mut self, idx: usize, id: i16) {
        assert_eq!(self.phase, GamePhase::Setup);
        assert!(id > 0, "player ids are positive");
        assert!(
            self.players.iter().enumerate().all(|(i, p)| i == idx || p.id != id),
            "duplicate player id {}",
            id
        );
        self.player_mut(idx).id = id;
    }

    pub fn setup_player_points(&mut self, idx: usize, points: u32) {
        assert_eq!(self.phase, GamePhase::Setup);
        self.player_mut(idx).points = points;
    }

    pub fn setup_board(&mut self, width: i32, height: i32) {
        assert_eq!(self.phase, GamePhase::Setup);
        self.board = Board::new(width, height);
    }

    /// Direct tile access for loaders and generators.
    pub fn board_mut(&mut self) -> &mut Board {
        assert_eq!(self.phase, GamePhase::Setup);
        &mut self.board
    }

    // ========== Phase progression ==========

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        if self.phase == phase {
            return;
        }
        self.log_push(LogEntry::PhaseChange { old: self.phase, new: phase });
        self.phase = phase;
    }

    /// Hand the turn to a specific player. The phase switchers normally do
    /// this, drivers use it to position the rotation before switching.
    pub fn set_current_player(&mut self, idx: Option<usize>) {
        if self.current_player_index == idx {
            return;
        }
        if let Some(idx) = idx {
            assert!(idx < self.players.len(), "player index {} out of range", idx);
        }
        self.log_push(LogEntry::PlayerChange { old: self.current_player_index, new: idx });
        self.current_player_index = idx;
    }

    /// Move the game forward until it needs external input: finishes setup,
    /// starts placement, rotates turns, and chains into movement and the end
    /// of the game as soon as a phase has nothing left to do.
    pub fn advance_state(&mut self) {
        if self.phase == GamePhase::Setup {
            self.end_setup();
        }
        if self.phase == GamePhase::SetupDone {
            self.placement_begin();
        }
        if self.phase == GamePhase::Placement && self.placement_switch_player().is_err() {
            self.placement_end();
            self.movement_begin();
        }
        if self.phase == GamePhase::Movement && self.movement_switch_player().is_err() {
            self.movement_end();
            self.game_end();
        }
    }

    pub fn game_end(&mut self) {
        assert!(
            matches!(self.phase, GamePhase::SetupDone | GamePhase::PlacementDone | GamePhase::MovementDone),
            "cannot end the game in {:?}",
            self.phase
        );
        self.set_current_player(None);
        self.set_phase(GamePhase::End);
    }

    // ========== Log ==========

    /// Reserve room for `capacity` entries. A smaller capacity than the
    /// current length truncates the log.
    pub fn set_log_capacity(&mut self, capacity: usize) {
        self.log.truncate(capacity);
        self.log_current = self.log_current.min(capacity);
        self.log.reserve(capacity - self.log.len());
    }

    #[inline]
    pub fn log_entries(&self) -> &[LogEntry] {
        &self.log
    }

    #[inline]
    pub fn log_current(&self) -> usize {
        self.log_current
    }

    #[inline]
    pub fn log_length(&self) -> usize {
        self.log.len()
    }

    /// Drop every entry past the cursor, i.e. everything that could be redone.
    pub fn discard_redo_log(&mut self) {
        self.log.truncate(self.log_current);
    }

    /// Append after the cursor, dropping any undone entries beyond it.
    pub(crate) fn log_push(&mut self, entry: LogEntry) {
        if self.log_disabled {
            return;
        }
        self.log.truncate(self.log_current);
        self.log.push(entry);
        self.log_current += 1;
    }

    /// Step the cursor back over the entry before it and return that entry's
    /// index. The entry stays in place for redo.
    pub(crate) fn log_pop(&mut self, kind: LogEntryKind) -> usize {
        assert!(self.log_current > 0, "log is empty");
        let idx = self.log_current - 1;
        assert_eq!(self.log[idx].kind(), kind, "unexpected log entry kind");
        self.log_current = idx;
        idx
    }

    /// Undo or redo entries until the cursor sits at `target_entry`.
    pub fn rewind_to(&mut self, target_entry: usize) {
        assert!(target_entry <= self.log.len(), "log index {} out of range", target_entry);
        let prev_disabled = self.log_disabled;
        // Redoing must not record the actions a second time.
        self.log_disabled = true;

        while self.log_current > target_entry {
            match self.log[self.log_current - 1].kind() {
                LogEntryKind::PhaseChange => {
                    let idx = self.log_pop(LogEntryKind::PhaseChange);
                    if let LogEntry::PhaseChange { old, new } = self.log[idx] {
                        assert_eq!(self.phase, new);
                        self.phase = old;
                    }
                }
                LogEntryKind::PlayerChange => {
                    let idx = self.log_pop(LogEntryKind::PlayerChange);
                    if let LogEntry::PlayerChange { old, new } = self.log[idx] {
                        assert_eq!(self.current_player_index, new);
                        self.current_player_index = old;
                    }
                }
                LogEntryKind::Placement => self.undo_place_penguin(),
                LogEntryKind::Movement => self.undo_move_penguin(),
            }
        }

        while self.log_current < target_entry {
            match self.log[self.log_current] {
                LogEntry::PhaseChange { old, new } => {
                    assert_eq!(self.phase, old);
                    self.phase = new;
                }
                LogEntry::PlayerChange { old, new } => {
                    assert_eq!(self.current_player_index, old);
                    self.current_player_index = new;
                }
                LogEntry::Placement { target, .. } => self.place_penguin(target),
                LogEntry::Movement { penguin, target, .. } => {
                    self.move_penguin(penguin, target);
                }
            }
            self.log_current += 1;
        }

        self.log_disabled = prev_disabled;
    }

    // ========== Hashing ==========

    /// Content hash of everything that affects play. The log, names and tile
    /// attributes are left out.
    pub fn compute_state_hash(&self) -> u64 {
        let mut data = Vec::with_capacity(64 + self.board.tiles().len() * 2);
        data.push(self.phase as u8);
        data.extend_from_slice(&(self.penguins_per_player() as u64).to_le_bytes());
        data.extend_from_slice(&self.current_player_index.map_or(-1, |i| i as i64).to_le_bytes());
        for player in &self.players {
            data.extend_from_slice(&player.id.to_le_bytes());
            data.extend_from_slice(&player.points.to_le_bytes());
            data.extend_from_slice(&player.moves_count.to_le_bytes());
            data.extend_from_slice(&(player.penguins.len() as u32).to_le_bytes());
            for penguin in &player.penguins {
                data.extend_from_slice(&penguin.x.to_le_bytes());
                data.extend_from_slice(&penguin.y.to_le_bytes());
            }
        }
        data.extend_from_slice(&self.board.width().to_le_bytes());
        data.extend_from_slice(&self.board.height().to_le_bytes());
        for tile in self.board.tiles() {
            data.extend_from_slice(&tile.0.to_le_bytes());
        }
        xxh64(&data, 0)
    }
}
