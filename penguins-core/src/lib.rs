//! Penguins game logic: the board model, the phase state machine with its
//! undo log, and the placement and movement rules.
//!
//! # Tile Encoding
//!
//! ```text
//! Each tile is a signed 16-bit value:
//!   0      water
//!   n > 0  ice with n fish
//!   n < 0  ice occupied by a penguin of the player with id -n
//! ```
//!
//! # Grid Layout
//!
//! ```text
//! Tiles are stored row-major in a single Vec, index = y * width + x:
//!   (0,0) (1,0) (2,0)
//!   (0,1) (1,1) (2,1)      ->  [ (0,0) (1,0) (2,0) (0,1) (1,1) ... ]
//! ```
//!
//! A second grid of the same shape holds per-tile attribute bits (see
//! [`TileAttribute`]). Only [`TileAttribute::DIRTY`] is used by the library
//! itself; UIs reserve the higher bits for their own flags.

pub mod board_file;
#[cfg(any(test, feature = "test-util"))]
#[doc(hidden)]
pub mod fixtures;
pub mod game;
pub mod movement;
pub mod placement;
pub mod rng;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use game::{Game, GamePhase, LogEntry, LogEntryKind, Player};
pub use movement::{MovementError, MovementSwitchError, PossibleSteps};
pub use placement::{PlacementError, PlacementSwitchError};
pub use rng::{RandRng, Rng};

use serde::{Deserialize, Serialize};

/// A pair of board coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Coords {
        Coords { x, y }
    }

    /// Shift by a relative offset.
    #[inline]
    pub const fn offset(self, d: Coords) -> Coords {
        Coords { x: self.x + d.x, y: self.y + d.y }
    }

    /// Axis-aligned (taxicab) distance, the only one that matters for
    /// orthogonal moves.
    #[inline]
    pub fn distance(self, other: Coords) -> i32 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }
}

/// The four orthogonal directions, ordered clockwise starting from the right.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum Direction {
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];

    /// Relative coordinates of one step in this direction.
    #[inline]
    pub const fn offset(self) -> Coords {
        match self {
            Direction::Right => Coords::new(1, 0),
            Direction::Down => Coords::new(0, 1),
            Direction::Left => Coords::new(-1, 0),
            Direction::Up => Coords::new(0, -1),
        }
    }

    /// The matching entry of [`Neighbor`].
    #[inline]
    pub const fn neighbor(self) -> Neighbor {
        match self {
            Direction::Right => Neighbor::Right,
            Direction::Down => Neighbor::Bottom,
            Direction::Left => Neighbor::Left,
            Direction::Up => Neighbor::Top,
        }
    }

    /// Direction of a straight orthogonal line from `start` to `target`, or
    /// `None` if the two are equal or not on the same row/column.
    pub fn between(start: Coords, target: Coords) -> Option<Direction> {
        let dx = (target.x - start.x).signum();
        let dy = (target.y - start.y).signum();
        match (dx, dy) {
            (1, 0) => Some(Direction::Right),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (0, -1) => Some(Direction::Up),
            _ => None,
        }
    }
}

/// All eight surrounding tiles, ordered clockwise starting from the right.
/// Orthogonal neighbors sit at even indexes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum Neighbor {
    Right = 0,
    BottomRight = 1,
    Bottom = 2,
    BottomLeft = 3,
    Left = 4,
    TopLeft = 5,
    Top = 6,
    TopRight = 7,
}

impl Neighbor {
    pub const ALL: [Neighbor; 8] = [
        Neighbor::Right,
        Neighbor::BottomRight,
        Neighbor::Bottom,
        Neighbor::BottomLeft,
        Neighbor::Left,
        Neighbor::TopLeft,
        Neighbor::Top,
        Neighbor::TopRight,
    ];

    #[inline]
    pub const fn offset(self) -> Coords {
        match self {
            Neighbor::Right => Coords::new(1, 0),
            Neighbor::BottomRight => Coords::new(1, 1),
            Neighbor::Bottom => Coords::new(0, 1),
            Neighbor::BottomLeft => Coords::new(-1, 1),
            Neighbor::Left => Coords::new(-1, 0),
            Neighbor::TopLeft => Coords::new(-1, -1),
            Neighbor::Top => Coords::new(0, -1),
            Neighbor::TopRight => Coords::new(1, -1),
        }
    }

    #[inline]
    pub const fn is_orthogonal(self) -> bool {
        (self as u8) % 2 == 0
    }
}

/// One board cell. See the module documentation for the encoding.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub struct Tile(pub i16);

impl Tile {
    pub const WATER: Tile = Tile(0);

    /// An ice tile with `fish` fish. Non-positive counts produce water.
    #[inline]
    pub const fn fish(fish: i16) -> Tile {
        Tile(if fish > 0 { fish } else { 0 })
    }

    /// A tile occupied by a penguin of the player with the given id.
    #[inline]
    pub const fn penguin(player_id: i16) -> Tile {
        Tile(if player_id > 0 { -player_id } else { 0 })
    }

    #[inline]
    pub const fn is_water(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_fish(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_penguin(self) -> bool {
        self.0 < 0
    }

    /// Number of fish on the tile, zero for water and penguins.
    #[inline]
    pub const fn fish_count(self) -> i16 {
        if self.0 > 0 { self.0 } else { 0 }
    }

    /// Id of the player whose penguin stands here, zero if there is none.
    #[inline]
    pub const fn player_id(self) -> i16 {
        if self.0 < 0 { -self.0 } else { 0 }
    }
}

/// Index of a bit in the per-tile attribute bitfield.
///
/// UIs extend the set by defining their own indexes starting at
/// [`TileAttribute::MAX`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct TileAttribute(pub u8);

impl TileAttribute {
    /// Set by [`Board::set`]. Every tile starts dirty; UIs clear it once they
    /// have redrawn the tile.
    pub const DIRTY: TileAttribute = TileAttribute(0);
    /// First index available to consumers.
    pub const MAX: TileAttribute = TileAttribute(1);

    #[inline]
    const fn mask(self) -> u16 {
        1 << self.0
    }
}

/// The rectangular tile grid plus its attribute grid.
///
/// Every accessor panics on out-of-bounds coordinates: callers holding
/// untrusted input must check [`Board::in_bounds`] first.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Board {
    width: i32,
    height: i32,
    grid: Vec<Tile>,
    attributes: Vec<u16>,
}

impl Board {
    /// Allocate a `width × height` board of water with every tile dirty.
    pub fn new(width: i32, height: i32) -> Board {
        assert!(width > 0 && height > 0, "board dimensions must be positive: {}x{}", width, height);
        let len = (width * height) as usize;
        Board {
            width,
            height,
            grid: vec![Tile::WATER; len],
            attributes: vec![TileAttribute::DIRTY.mask(); len],
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether the board has been allocated.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        !self.grid.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, coords: Coords) -> bool {
        0 <= coords.x && coords.x < self.width && 0 <= coords.y && coords.y < self.height
    }

    #[inline]
    fn index(&self, coords: Coords) -> usize {
        assert!(self.in_bounds(coords), "coordinates out of bounds: {:?}", coords);
        (coords.y * self.width + coords.x) as usize
    }

    #[inline]
    pub fn get(&self, coords: Coords) -> Tile {
        self.grid[self.index(coords)]
    }

    /// Write a tile and mark it [`TileAttribute::DIRTY`].
    #[inline]
    pub fn set(&mut self, coords: Coords, tile: Tile) {
        let idx = self.index(coords);
        self.grid[idx] = tile;
        self.attributes[idx] |= TileAttribute::DIRTY.mask();
    }

    /// Whether `coords` is in bounds and holds fish. The movement rules and
    /// the bot treat everything else as an obstruction.
    #[inline]
    pub fn is_fish_at(&self, coords: Coords) -> bool {
        self.in_bounds(coords) && self.get(coords).is_fish()
    }

    #[inline]
    pub fn attr(&self, coords: Coords, attr: TileAttribute) -> bool {
        self.attributes[self.index(coords)] & attr.mask() != 0
    }

    #[inline]
    pub fn set_attr(&mut self, coords: Coords, attr: TileAttribute, value: bool) {
        let idx = self.index(coords);
        let bits = &mut self.attributes[idx];
        *bits = (*bits & !attr.mask()) | if value { attr.mask() } else { 0 };
    }

    pub fn set_all_attr(&mut self, attr: TileAttribute, value: bool) {
        for bits in &mut self.attributes {
            *bits = (*bits & !attr.mask()) | if value { attr.mask() } else { 0 };
        }
    }

    /// Raw row-major tiles.
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.grid
    }

    /// Iterate over all coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coords> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| Coords::new(x, y)))
    }

    // ========== Generators ==========

    /// Fill every tile with 0..=3 fish picked uniformly, zero being water.
    /// The result looks like a maze.
    pub fn generate_random(&mut self, rng: &mut dyn Rng) {
        for idx in 0..self.grid.len() {
            let coords = Coords::new(idx as i32 % self.width, idx as i32 / self.width);
            let fish = rng.random_range(0, 3) as i16;
            self.set(coords, Tile::fish(fish));
        }
    }

    /// Carve an icy island out of water with random walks from the centre.
    pub fn generate_island(&mut self, rng: &mut dyn Rng) {
        let (w, h) = (self.width, self.height);
        for idx in 0..self.grid.len() {
            let coords = Coords::new(idx as i32 % w, idx as i32 / w);
            self.set(coords, Tile::WATER);
        }
        for _ in 0..w + h {
            let mut coords = Coords::new(w / 2, h / 2);
            for _ in 0..w + h {
                let dir = Direction::ALL[rng.random_range(0, 3) as usize];
                coords = coords.offset(dir.offset());
                if !self.in_bounds(coords) {
                    break;
                }
                let fish = rng.random_range(1, 3) as i16;
                self.set(coords, Tile::fish(fish));
            }
        }
    }
}
