//! Span-based flood fill.
//!
//! The "combined-scan-and-fill" variant from
//! <https://en.wikipedia.org/wiki/Flood_fill#Span_filling>: horizontal runs are
//! filled in one go and only the spans above and below are pushed on an
//! explicit stack, so large open areas never touch the call stack.

use penguins_core::{Board, Coords};

/// A horizontal run `x1..=x2` on row `y` whose neighbors in row `y + dy`
/// still need scanning.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FillSpan {
    pub x1: i32,
    pub x2: i32,
    pub y: i32,
    pub dy: i32,
}

pub trait FillTarget {
    /// Whether the cell should be filled. Must return false for filled cells
    /// and for anything outside of the area.
    fn inside(&self, x: i32, y: i32) -> bool;
    fn set(&mut self, x: i32, y: i32);
}

/// Fill the 4-connected region containing `(x, y)`. `stack` is scratch space
/// and is left empty.
pub fn flood_fill<T: FillTarget>(x: i32, y: i32, target: &mut T, stack: &mut Vec<FillSpan>) {
    stack.clear();
    if !target.inside(x, y) {
        return;
    }
    stack.push(FillSpan { x1: x, x2: x, y, dy: 1 });
    stack.push(FillSpan { x1: x, x2: x, y: y - 1, dy: -1 });

    while let Some(FillSpan { mut x1, x2, y, dy }) = stack.pop() {
        let mut x = x1;
        if target.inside(x, y) {
            while target.inside(x - 1, y) {
                target.set(x - 1, y);
                x -= 1;
            }
            if x < x1 {
                stack.push(FillSpan { x1: x, x2: x1 - 1, y: y - dy, dy: -dy });
            }
        }
        while x1 <= x2 {
            while target.inside(x1, y) {
                target.set(x1, y);
                x1 += 1;
            }
            if x1 > x {
                stack.push(FillSpan { x1: x, x2: x1 - 1, y: y + dy, dy });
            }
            if x1 - 1 > x2 {
                stack.push(FillSpan { x1: x2 + 1, x2: x1 - 1, y: y - dy, dy: -dy });
            }
            x1 += 1;
            while x1 < x2 && !target.inside(x1, y) {
                x1 += 1;
            }
            x = x1;
        }
    }
}

/// Fills unvisited fish tiles. `grid` holds one marker per tile, zero meaning
/// unvisited.
pub struct FishFill<'a> {
    pub board: &'a Board,
    pub grid: &'a mut [i16],
    pub marker: i16,
    pub fish: u32,
    pub tiles: u32,
}

impl<'a> FishFill<'a> {
    pub fn new(board: &'a Board, grid: &'a mut [i16], marker: i16) -> Self {
        assert_ne!(marker, 0, "zero marks unvisited tiles");
        assert_eq!(grid.len(), board.tiles().len());
        FishFill { board, grid, marker, fish: 0, tiles: 0 }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.board.width() + x) as usize
    }
}

impl FillTarget for FishFill<'_> {
    #[inline]
    fn inside(&self, x: i32, y: i32) -> bool {
        let coords = Coords::new(x, y);
        self.board.is_fish_at(coords) && self.grid[self.index(x, y)] == 0
    }

    #[inline]
    fn set(&mut self, x: i32, y: i32) {
        let idx = self.index(x, y);
        self.grid[idx] = self.marker;
        self.fish += self.board.get(Coords::new(x, y)).fish_count() as u32;
        self.tiles += 1;
    }
}

/// Mark the fish region around `start` with `marker` and return the number
/// of fish in it.
pub fn count_fish(board: &Board, grid: &mut [i16], stack: &mut Vec<FillSpan>, start: Coords, marker: i16) -> u32 {
    let mut fill = FishFill::new(board, grid, marker);
    flood_fill(start.x, start.y, &mut fill, stack);
    fill.fish
}

/// Zero the grid, resizing it to the board while keeping its allocation.
pub fn reset_grid(board: &Board, grid: &mut Vec<i16>) {
    grid.clear();
    grid.resize(board.tiles().len(), 0);
}
