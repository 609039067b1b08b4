//! WASM bindings for penguins-core
//!
//! Provides a JavaScript-friendly API for the game logic.

use wasm_bindgen::prelude::*;

use crate::{Coords, Direction, Game, GamePhase, RandRng};

/// WASM-friendly wrapper around Game
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game with an island board generated from `seed`, with players
    /// named `names`, already advanced to the first placement turn.
    #[wasm_bindgen(constructor)]
    pub fn new(width: i32, height: i32, names: Vec<String>, penguins_per_player: usize, seed: u64) -> WasmGame {
        let mut inner = Game::new();
        inner.begin_setup();
        inner.setup_board(width.max(1), height.max(1));
        inner.board_mut().generate_island(&mut RandRng::seeded(seed));
        inner.setup_players_count(names.len());
        for (idx, name) in names.iter().enumerate() {
            inner.setup_player_name(idx, name);
        }
        inner.setup_penguins_per_player(penguins_per_player);
        inner.advance_state();
        WasmGame { inner }
    }

    pub fn width(&self) -> i32 {
        self.inner.board().width()
    }

    pub fn height(&self) -> i32 {
        self.inner.board().height()
    }

    /// Raw tile value: 0 water, fish count if positive, -player id if negative
    pub fn tile(&self, x: i32, y: i32) -> i16 {
        let coords = Coords::new(x, y);
        if self.inner.board().in_bounds(coords) {
            self.inner.board().get(coords).0
        } else {
            0
        }
    }

    /// "setup", "placement", "movement" or "end"
    pub fn phase(&self) -> String {
        match self.inner.phase() {
            GamePhase::None | GamePhase::Setup | GamePhase::SetupDone => "setup",
            GamePhase::Placement | GamePhase::PlacementDone => "placement",
            GamePhase::Movement | GamePhase::MovementDone => "movement",
            GamePhase::End => "end",
        }
        .to_string()
    }

    /// Index of the player to move, -1 if nobody is
    #[wasm_bindgen(js_name = currentPlayer)]
    pub fn current_player(&self) -> i32 {
        self.inner.current_player_index().map_or(-1, |i| i as i32)
    }

    /// Scores of all players in order
    pub fn scores(&self) -> Vec<u32> {
        self.inner.players().iter().map(|p| p.points).collect()
    }

    #[wasm_bindgen(js_name = advanceState)]
    pub fn advance_state(&mut self) {
        self.inner.advance_state();
    }

    /// Returns an error message, or an empty string if the placement is legal
    #[wasm_bindgen(js_name = validatePlacement)]
    pub fn validate_placement(&self, x: i32, y: i32) -> String {
        if self.inner.phase() != GamePhase::Placement {
            return "not in the placement phase".to_string();
        }
        match self.inner.validate_placement(Coords::new(x, y)) {
            Ok(()) => String::new(),
            Err(err) => err.to_string(),
        }
    }

    /// Place a penguin and pass the turn. Returns true if successful.
    #[wasm_bindgen(js_name = placePenguin)]
    pub fn place_penguin(&mut self, x: i32, y: i32) -> bool {
        if !self.validate_placement(x, y).is_empty() {
            return false;
        }
        self.inner.place_penguin(Coords::new(x, y));
        self.inner.advance_state();
        true
    }

    /// Returns an error message, or an empty string if the move is legal
    #[wasm_bindgen(js_name = validateMovement)]
    pub fn validate_movement(&self, from_x: i32, from_y: i32, to_x: i32, to_y: i32) -> String {
        if self.inner.phase() != GamePhase::Movement {
            return "not in the movement phase".to_string();
        }
        match self.inner.validate_movement(Coords::new(from_x, from_y), Coords::new(to_x, to_y)) {
            Ok(()) => String::new(),
            Err(err) => err.to_string(),
        }
    }

    /// Move a penguin and pass the turn. Returns the captured fish, or -1 if
    /// the move is illegal.
    #[wasm_bindgen(js_name = movePenguin)]
    pub fn move_penguin(&mut self, from_x: i32, from_y: i32, to_x: i32, to_y: i32) -> i32 {
        if !self.validate_movement(from_x, from_y, to_x, to_y).is_empty() {
            return -1;
        }
        let fish = self.inner.move_penguin(Coords::new(from_x, from_y), Coords::new(to_x, to_y));
        self.inner.advance_state();
        fish as i32
    }

    /// Legal moves of the current player as an array of { from, to } objects
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> JsValue {
        let mut moves = Vec::new();
        if self.inner.phase() == GamePhase::Movement && self.inner.current_player_index().is_some() {
            for &penguin in &self.inner.current_player().penguins {
                let steps = self.inner.calculate_penguin_possible_moves(penguin);
                for dir in Direction::ALL {
                    let mut to = penguin;
                    for _ in 0..steps.get(dir) {
                        to = to.offset(dir.offset());
                        moves.push(WasmMove { from: penguin, to });
                    }
                }
            }
        }
        serde_wasm_bindgen::to_value(&moves).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = logLength)]
    pub fn log_length(&self) -> usize {
        self.inner.log_length()
    }

    #[wasm_bindgen(js_name = logCurrent)]
    pub fn log_current(&self) -> usize {
        self.inner.log_current()
    }

    /// Undo or redo up to the given log index. Returns false if out of range.
    #[wasm_bindgen(js_name = rewindTo)]
    pub fn rewind_to(&mut self, entry: usize) -> bool {
        if entry > self.inner.log_length() {
            return false;
        }
        self.inner.rewind_to(entry);
        true
    }

    #[wasm_bindgen(js_name = stateHash)]
    pub fn state_hash(&self) -> u64 {
        self.inner.compute_state_hash()
    }

    #[wasm_bindgen(js_name = clone)]
    pub fn clone_game(&self) -> WasmGame {
        WasmGame { inner: self.inner.clone() }
    }
}

/// Serializable move for JavaScript
#[derive(serde::Serialize)]
struct WasmMove {
    from: Coords,
    to: Coords,
}
