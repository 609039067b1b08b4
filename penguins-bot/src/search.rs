//! Placement and move search.
//!
//! # Move rating
//!
//! ```text
//! score = 64 / length - 8                  short moves first
//!       + 10 * fish^2                      fish captured along the path
//!       + 1000   (depth 0) escaping a tile with 3 blocked sides
//!       - 10000  (depth 0) moving onto a tile that will be boxed in
//!       - 1000   one-tile move next to an opponent
//!       + 2000 / 1000 / 300 per opponent boxed in by the move
//!       - 1000   per own penguin next to the target
//!       - 200    the move cuts the remaining ice in two
//!       + 3/4 of the best follow-up move of the same penguin
//! ```
//!
//! Follow-ups are evaluated by applying the move on the searched game and
//! undoing it afterwards, so the search needs exclusive access to that game
//! for its whole lifetime. Per-depth move and score buffers are kept in an
//! arena and reused across the whole search.
//!
//! # Cancellation
//!
//! The shared flag is polled before each candidate at the root and at the top
//! of every root-level rating call. Follow-up evaluations below the root
//! don't poll it, so a cancelled search finishes the subtree of the root move
//! it is working on before returning.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, log_enabled, Level};
use penguins_core::{Board, Coords, Direction, Game, Neighbor, Rng};
use serde::{Deserialize, Serialize};

use crate::flood_fill::{self, FillSpan};
use crate::params::{BotParameters, MovementStrategy, PlacementStrategy};
use crate::stats::SearchStats;

/// A `penguin -> target` pair.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct BotMove {
    pub penguin: Coords,
    pub target: Coords,
}

/// Reusable buffers of one recursion level.
#[derive(Default)]
struct Scratch {
    moves: Vec<BotMove>,
    scores: Vec<i64>,
}

pub struct BotState<'a> {
    params: &'a BotParameters,
    game: &'a mut Game,
    rng: &'a mut dyn Rng,
    cancelled: Arc<AtomicBool>,

    /// Indexed by recursion depth, grown on demand.
    scratch: Vec<Scratch>,
    tile_coords: Vec<Coords>,
    tile_scores: Vec<i64>,
    /// Direction regions of the root junction bonus.
    fill_grid1: Vec<i16>,
    /// Region split checks inside the lookahead.
    fill_grid2: Vec<i16>,
    fill_stack: Vec<FillSpan>,

    pub stats: SearchStats,
}

impl<'a> BotState<'a> {
    /// The game is restored to its original state once each search returns,
    /// except that entries past its log cursor are discarded.
    pub fn new(
        params: &'a BotParameters,
        game: &'a mut Game,
        rng: &'a mut dyn Rng,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        BotState {
            params,
            game,
            rng,
            cancelled,
            scratch: Vec::new(),
            tile_coords: Vec::new(),
            tile_scores: Vec::new(),
            fill_grid1: Vec::new(),
            fill_grid2: Vec::new(),
            fill_stack: Vec::new(),
            stats: SearchStats::new(),
        }
    }

    #[inline]
    pub fn game(&self) -> &Game {
        self.game
    }

    /// Setting the returned flag makes the running search return `None`.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn take_scratch(&mut self, depth: usize) -> Scratch {
        if self.scratch.len() <= depth {
            self.scratch.resize_with(depth + 1, Scratch::default);
        }
        mem::take(&mut self.scratch[depth])
    }

    fn put_scratch(&mut self, depth: usize, scratch: Scratch) {
        self.scratch[depth] = scratch;
    }

    // ========== Placement ==========

    /// Pick a tile for the current player's next penguin. `None` if there is
    /// no free tile or the search was cancelled.
    pub fn compute_placement(&mut self) -> Option<Coords> {
        self.stats.reset();
        if self.is_cancelled() {
            return None;
        }

        let mut tiles = mem::take(&mut self.tile_coords);
        tiles.clear();
        let game = &*self.game;
        tiles.extend(game.board().coords().filter(|&c| game.validate_placement_simple(c)));

        let picked = self.pick_placement(&tiles);
        self.tile_coords = tiles;
        self.stats.log_summary();
        if let Some(target) = picked {
            info!("placing a penguin at ({}, {})", target.x, target.y);
        }
        picked
    }

    fn pick_placement(&mut self, tiles: &[Coords]) -> Option<Coords> {
        if tiles.is_empty() {
            return None;
        }
        match self.params.placement_strategy {
            PlacementStrategy::FirstPossible => return Some(tiles[0]),
            PlacementStrategy::Random => {
                let idx = self.rng.random_range(0, tiles.len() as i32 - 1);
                return Some(tiles[idx as usize]);
            }
            PlacementStrategy::Smart | PlacementStrategy::MostFish => {}
        }

        let mut scores = mem::take(&mut self.tile_scores);
        scores.clear();
        for &tile in tiles {
            if self.is_cancelled() {
                break;
            }
            scores.push(self.rate_placement(tile));
        }

        let picked = if self.is_cancelled() {
            None
        } else {
            log_placement_scores(tiles, &scores);
            pick_best(&scores).map(|idx| tiles[idx])
        };
        self.tile_scores = scores;
        picked
    }

    /// Score a placement of the current player on `penguin`.
    ///
    /// `MostFish` sums the fish in the scan window. `Smart` weighs every other
    /// cell of the window (fish +10 each, own penguin -500, opponent -600,
    /// water -40, off the board +10), dampened by the squared distance, then
    /// subtracts 1000 per blocked side of the tile.
    pub fn rate_placement(&mut self, penguin: Coords) -> i64 {
        if self.is_cancelled() {
            return 0;
        }
        self.stats.placements_rated += 1;
        let game = &*self.game;
        let board = game.board();
        let area = self.params.placement_scan_area;

        if self.params.placement_strategy == PlacementStrategy::MostFish {
            let mut total: i64 = 0;
            for y in penguin.y - area..=penguin.y + area {
                for x in penguin.x - area..=penguin.x + area {
                    let at = Coords::new(x, y);
                    if board.in_bounds(at) {
                        total += board.get(at).fish_count() as i64;
                    }
                }
            }
            return total;
        }

        let my_id = game.current_player().id;
        let mut score: i64 = 0;
        for dy in -area..=area {
            if self.is_cancelled() {
                return score;
            }
            for dx in -area..=area {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let at = Coords::new(penguin.x + dx, penguin.y + dy);
                let tile_score = if !board.in_bounds(at) {
                    10
                } else {
                    let tile = board.get(at);
                    if tile.is_fish() {
                        10 * tile.fish_count() as i64
                    } else if tile.is_penguin() {
                        if tile.player_id() == my_id {
                            -500
                        } else {
                            -600
                        }
                    } else {
                        -40
                    }
                };
                score += tile_score * 4 / (dx * dx + dy * dy) as i64;
            }
        }

        score -= 1000 * game.count_obstructed_directions(penguin) as i64;
        score
    }

    // ========== Movement ==========

    /// Pick a move for the current player. `None` if none of their penguins
    /// can move or the search was cancelled.
    pub fn compute_move(&mut self) -> Option<BotMove> {
        self.stats.reset();
        if self.is_cancelled() {
            return None;
        }
        let player_idx = self.game.current_player_index()?;

        let mut scratch = self.take_scratch(0);
        scratch.moves.clear();
        for &penguin in &self.game.player(player_idx).penguins {
            push_penguin_moves(self.game, self.params, penguin, &mut scratch.moves);
        }

        let picked = self.pick_move(&mut scratch);
        self.put_scratch(0, scratch);
        if self.stats.follow_ups > 0 {
            self.game.discard_redo_log();
        }
        self.stats.log_summary();
        if let Some(m) = picked {
            info!(
                "moving ({}, {}) -> ({}, {})",
                m.penguin.x, m.penguin.y, m.target.x, m.target.y
            );
        }
        picked
    }

    fn pick_move(&mut self, scratch: &mut Scratch) -> Option<BotMove> {
        let Scratch { moves, scores } = scratch;
        if moves.is_empty() {
            return None;
        }
        match self.params.movement_strategy {
            MovementStrategy::FirstPossible => return Some(moves[0]),
            MovementStrategy::Random => {
                let idx = self.rng.random_range(0, moves.len() as i32 - 1);
                return Some(moves[idx as usize]);
            }
            MovementStrategy::Smart => {}
        }

        self.rate_moves(moves, scores, 0);
        if self.is_cancelled() {
            return None;
        }
        if self.params.junction_checks_at(0) {
            self.apply_junction_bonus(moves, scores);
        }
        if self.is_cancelled() {
            return None;
        }

        log_move_scores(moves, scores);
        pick_best(scores).map(|idx| moves[idx])
    }

    fn rate_moves(&mut self, moves: &[BotMove], scores: &mut Vec<i64>, depth: u32) {
        scores.clear();
        for &m in moves {
            if depth == 0 && self.is_cancelled() {
                break;
            }
            scores.push(self.rate_move(m, depth));
        }
    }

    /// Score a move of the current player at the given lookahead depth, see
    /// the module documentation. Only depth 0 observes cancellation.
    pub fn rate_move(&mut self, m: BotMove, depth: u32) -> i64 {
        if depth == 0 && self.is_cancelled() {
            return 0;
        }
        self.stats.moves_rated += 1;
        self.stats.record_depth(depth);

        let mut score = self.rate_move_position(m, depth);
        if depth < self.params.recursion_limit {
            score += self.rate_follow_ups(m, depth);
        }
        score
    }

    fn rate_move_position(&self, m: BotMove, depth: u32) -> i64 {
        let game = &*self.game;
        let board = game.board();
        let BotMove { penguin, target } = m;
        let my_id = game.current_player().id;
        let len = penguin.distance(target);
        let dir = Direction::between(penguin, target).expect("bot moves are orthogonal");

        let mut score = (64 / len - 8) as i64;

        let mut fish: i64 = 0;
        let mut at = penguin;
        while at != target {
            at = at.offset(dir.offset());
            fish += board.get(at).fish_count() as i64;
        }
        score += 10 * fish * fish;

        if depth == 0 {
            if game.count_obstructed_directions(penguin) == 3 {
                score += 1000;
            }
            // The tile right behind the target turns into water unless it is
            // the start, which is already counted as blocked.
            let behind = if len > 1 { 1 } else { 0 };
            if game.count_obstructed_directions(target) + behind == 4 {
                score -= 10000;
            }
        }

        let mut chasing = false;
        for d in Direction::ALL {
            let neighbor = target.offset(d.offset());
            if neighbor == penguin || !board.in_bounds(neighbor) {
                continue;
            }
            let tile = board.get(neighbor);
            if !tile.is_penguin() {
                continue;
            }
            if tile.player_id() == my_id {
                score -= 1000;
                continue;
            }
            if len == 1 && !chasing {
                score -= 1000;
                chasing = true;
            }
            // The target is fish now, so the opponent loses one more side.
            let obstructed = game.count_obstructed_directions(neighbor) + 1;
            if obstructed >= 4 {
                score += 2000;
            } else if obstructed == 3 {
                score += 1000;
            } else if len == 1 {
                score += 300;
            }
        }

        score
    }

    /// Apply the move, look at what the same penguin can do next and undo it.
    fn rate_follow_ups(&mut self, m: BotMove, depth: u32) -> i64 {
        self.stats.follow_ups += 1;
        self.game.move_penguin(m.penguin, m.target);

        let mut score = 0;
        if self.params.junction_checks_at(depth) && self.splits_region(m.target) {
            score -= 200;
        }

        let next = depth as usize + 1;
        let mut scratch = self.take_scratch(next);
        scratch.moves.clear();
        push_penguin_moves(self.game, self.params, m.target, &mut scratch.moves);
        {
            let Scratch { moves, scores } = &mut scratch;
            self.rate_moves(moves, scores, depth + 1);
            if let Some(best) = scores.iter().copied().max() {
                score += best * 3 / 4;
            }
        }
        self.put_scratch(next, scratch);

        self.game.undo_move_penguin();
        score
    }

    /// Whether the ice around `coords` falls apart into regions that are only
    /// connected through `coords` itself.
    fn splits_region(&mut self, coords: Coords) -> bool {
        self.stats.junction_checks += 1;
        let board = self.game.board();
        if !quick_junction_check(board, coords) {
            return false;
        }

        flood_fill::reset_grid(board, &mut self.fill_grid2);
        let mut filled = false;
        for d in Direction::ALL {
            let neighbor = coords.offset(d.offset());
            if !board.is_fish_at(neighbor) {
                continue;
            }
            if !filled {
                self.stats.flood_fills += 1;
                flood_fill::count_fish(board, &mut self.fill_grid2, &mut self.fill_stack, neighbor, 1);
                filled = true;
            } else if self.fill_grid2[grid_index(board, neighbor)] == 0 {
                return true;
            }
        }
        false
    }

    /// Bias moves from a junction toward the direction with the most fish
    /// reachable: `10 * sum(fish[chosen] - fish[other])`.
    fn apply_junction_bonus(&mut self, moves: &[BotMove], scores: &mut [i64]) {
        let mut start = 0;
        while start < moves.len() {
            if self.is_cancelled() {
                return;
            }
            let penguin = moves[start].penguin;
            let end = start + moves[start..].iter().take_while(|m| m.penguin == penguin).count();

            if let Some(fish) = self.direction_fish(penguin) {
                for idx in start..end.min(scores.len()) {
                    let Some(chosen) = Direction::between(penguin, moves[idx].target) else {
                        continue;
                    };
                    let mine = fish[chosen as usize];
                    let bonus: i64 = Direction::ALL
                        .iter()
                        .filter(|&&other| other != chosen)
                        .map(|&other| mine - fish[other as usize])
                        .sum();
                    scores[idx] += 10 * bonus;
                }
            }
            start = end;
        }
    }

    /// Fish reachable through each side of a junction tile, `None` if the
    /// tile is not a junction.
    fn direction_fish(&mut self, penguin: Coords) -> Option<[i64; 4]> {
        self.stats.junction_checks += 1;
        let board = self.game.board();
        if !quick_junction_check(board, penguin) {
            return None;
        }

        flood_fill::reset_grid(board, &mut self.fill_grid1);
        let mut fish = [0i64; 4];
        for d in Direction::ALL {
            let neighbor = penguin.offset(d.offset());
            if !board.is_fish_at(neighbor) {
                continue;
            }
            let marker = self.fill_grid1[grid_index(board, neighbor)];
            fish[d as usize] = if marker != 0 {
                // Already reached from an earlier side.
                fish[(marker - 1) as usize]
            } else {
                self.stats.flood_fills += 1;
                let marker = d as i16 + 1;
                flood_fill::count_fish(board, &mut self.fill_grid1, &mut self.fill_stack, neighbor, marker) as i64
            };
        }
        debug!("junction at ({}, {}): fish per direction {:?}", penguin.x, penguin.y, fish);
        Some(fish)
    }
}

/// Cheap necessary condition for a junction. Walks the ring of eight
/// neighbors both ways from the first orthogonal fish tile; if every
/// orthogonal fish tile is reached without crossing a gap, the tile can't
/// split the ice.
pub fn quick_junction_check(board: &Board, coords: Coords) -> bool {
    let fish = Neighbor::ALL.map(|n| board.is_fish_at(coords.offset(n.offset())));
    let Some(first) = (0..8).step_by(2).find(|&i| fish[i]) else {
        return false;
    };

    let mut connected = [false; 8];
    connected[first] = true;
    let mut i = (first + 1) % 8;
    while i != first && fish[i] {
        connected[i] = true;
        i = (i + 1) % 8;
    }
    let mut i = (first + 7) % 8;
    while i != first && fish[i] {
        connected[i] = true;
        i = (i + 7) % 8;
    }

    (0..8).step_by(2).any(|i| fish[i] && !connected[i])
}

/// Every destination of one penguin, direction by direction, nearest first.
fn push_penguin_moves(game: &Game, params: &BotParameters, penguin: Coords, out: &mut Vec<BotMove>) {
    let steps = game.calculate_penguin_possible_moves(penguin);
    for dir in Direction::ALL {
        let mut target = penguin;
        for _ in 0..steps.get(dir).min(params.max_move_length) {
            target = target.offset(dir.offset());
            out.push(BotMove { penguin, target });
        }
    }
}

/// Index of the highest score, the later one on ties.
fn pick_best(scores: &[i64]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, b)| score >= b) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

#[inline]
fn grid_index(board: &Board, coords: Coords) -> usize {
    (coords.y * board.width() + coords.x) as usize
}

fn log_placement_scores(tiles: &[Coords], scores: &[i64]) {
    if !log_enabled!(Level::Debug) {
        return;
    }
    let mut row = String::new();
    let mut row_y = None;
    for (c, score) in tiles.iter().zip(scores) {
        if row_y != Some(c.y) {
            if !row.is_empty() {
                debug!("row {:2}: {}", row_y.unwrap_or(0), row);
                row.clear();
            }
            row_y = Some(c.y);
        }
        row.push_str(&format!("({:2}, {:2}) = {:5}   ", c.x, c.y, score));
    }
    if !row.is_empty() {
        debug!("row {:2}: {}", row_y.unwrap_or(0), row);
    }
}

fn log_move_scores(moves: &[BotMove], scores: &[i64]) {
    if !log_enabled!(Level::Debug) {
        return;
    }
    for (m, score) in moves.iter().zip(scores) {
        debug!(
            "({}, {}) -> ({}, {}) = {}",
            m.penguin.x, m.penguin.y, m.target.x, m.target.y, score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penguins_core::fixtures::fixture as game;
    use penguins_core::RandRng;

    fn moving(rows: &[&str], players: usize) -> Game {
        let mut g = game(rows, players);
        g.movement_begin();
        g.movement_switch_player().unwrap();
        g
    }

    fn board(rows: &[&str]) -> Board {
        game(rows, 1).board().clone()
    }

    #[test]
    fn test_pick_best_prefers_later_on_ties() {
        assert_eq!(pick_best(&[]), None);
        assert_eq!(pick_best(&[3, 7, 7, 1]), Some(2));
        assert_eq!(pick_best(&[i64::MIN, i64::MIN]), Some(1));
    }

    #[test]
    fn test_quick_junction_check() {
        // Surrounded by fish without gaps.
        assert!(!quick_junction_check(&board(&["111", "111", "111"]), Coords::new(1, 1)));
        // A corridor: left and right can only meet through the centre.
        assert!(quick_junction_check(&board(&["~~~", "111", "~~~"]), Coords::new(1, 1)));
        // Left and right connect around the top.
        assert!(!quick_junction_check(&board(&["111", "111", "~~~"]), Coords::new(1, 1)));
        // Dead end.
        assert!(!quick_junction_check(&board(&["~~~", "~11", "~~~"]), Coords::new(1, 1)));
        // Nothing around at all.
        assert!(!quick_junction_check(&board(&["~~~", "~1~", "~~~"]), Coords::new(1, 1)));
    }

    #[test]
    fn test_push_penguin_moves_respects_max_length() {
        let g = moving(&["A111", "1~~~"], 1);
        let mut params = BotParameters::default();
        let mut moves = Vec::new();
        push_penguin_moves(&g, &params, Coords::new(0, 0), &mut moves);
        assert_eq!(moves.len(), 4);
        assert_eq!(moves[0].target, Coords::new(1, 0));
        assert_eq!(moves[2].target, Coords::new(3, 0));
        assert_eq!(moves[3].target, Coords::new(0, 1));

        params.max_move_length = 1;
        moves.clear();
        push_penguin_moves(&g, &params, Coords::new(0, 0), &mut moves);
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn test_rate_placement_prefers_open_ice() {
        let mut g = game(&["1~~~~~", "~~~~~~", "~~~~~~", "~~~111", "~~~111", "~~~111"], 1);
        g.placement_begin();
        g.placement_switch_player().unwrap();
        let params = BotParameters::default();
        let mut rng = RandRng::seeded(0);
        let mut bot = BotState::new(&params, &mut g, &mut rng, Arc::new(AtomicBool::new(false)));
        let lonely = bot.rate_placement(Coords::new(0, 0));
        let centre = bot.rate_placement(Coords::new(4, 4));
        assert!(centre > lonely, "{} <= {}", centre, lonely);
        assert_eq!(bot.compute_placement(), Some(Coords::new(4, 4)));
    }

    #[test]
    fn test_rate_placement_most_fish() {
        let mut g = game(&["1~3", "~~~", "1~~"], 1);
        g.placement_begin();
        g.placement_switch_player().unwrap();
        let params = BotParameters {
            placement_strategy: PlacementStrategy::MostFish,
            placement_scan_area: 1,
            ..BotParameters::default()
        };
        let mut rng = RandRng::seeded(0);
        let mut bot = BotState::new(&params, &mut g, &mut rng, Arc::new(AtomicBool::new(false)));
        assert_eq!(bot.rate_placement(Coords::new(0, 0)), 1);
        assert_eq!(bot.rate_placement(Coords::new(0, 2)), 1);
        // Equal scores, the later tile wins.
        assert_eq!(bot.compute_placement(), Some(Coords::new(0, 2)));
    }

    fn placement_score(rows: &[&str], at: Coords) -> i64 {
        let mut g = game(rows, 2);
        g.placement_begin();
        g.set_current_player(Some(0));
        let params = BotParameters { placement_scan_area: 1, ..BotParameters::default() };
        let mut rng = RandRng::seeded(0);
        let mut bot = BotState::new(&params, &mut g, &mut rng, Arc::new(AtomicBool::new(false)));
        bot.rate_placement(at)
    }

    #[test]
    fn test_rate_placement_penguin_penalties() {
        // Fish: four sides at 40 and three corners at 20. The corner penguin
        // weighs half as well.
        assert_eq!(placement_score(&["A11", "111", "111"], Coords::new(1, 1)), 220 - 1000);
        assert_eq!(placement_score(&["B11", "111", "111"], Coords::new(1, 1)), 220 - 1200);
    }

    #[test]
    fn test_rate_move_rewards_fish() {
        let g = &mut moving(&["A13", "1~~"], 1);
        let params = BotParameters { recursion_limit: 0, ..BotParameters::default() };
        let mut rng = RandRng::seeded(0);
        let mut bot = BotState::new(&params, g, &mut rng, Arc::new(AtomicBool::new(false)));
        let long = BotMove { penguin: Coords::new(0, 0), target: Coords::new(2, 0) };
        let short = BotMove { penguin: Coords::new(0, 0), target: Coords::new(0, 1) };
        // 64/2 - 8 + 10 * 4^2, and the tile behind the target melts: boxed in.
        assert_eq!(bot.rate_move(long, 0), 24 + 160 - 10000);
        // 64 - 8 + 10, boxed in as well.
        assert_eq!(bot.rate_move(short, 0), 56 + 10 - 10000);
    }

    #[test]
    fn test_rate_move_boxing_in_opponent() {
        let g = &mut moving(&["A1B~", "~~~~"], 2);
        let params = BotParameters { recursion_limit: 0, ..BotParameters::default() };
        let mut rng = RandRng::seeded(0);
        let mut bot = BotState::new(&params, g, &mut rng, Arc::new(AtomicBool::new(false)));
        let m = BotMove { penguin: Coords::new(0, 0), target: Coords::new(1, 0) };
        // 56 + 10 fish, escape from three blocked sides, boxed-in target,
        // chase penalty, opponent fully trapped.
        assert_eq!(bot.rate_move(m, 0), 56 + 10 + 1000 - 10000 - 1000 + 2000);
    }

    #[test]
    fn test_search_restores_game() {
        let mut g = moving(&["A1211", "12131", "11B21", "31112"], 2);
        let before = g.clone();
        let params = BotParameters::default();
        let mut rng = RandRng::seeded(0);
        let mut bot = BotState::new(&params, &mut g, &mut rng, Arc::new(AtomicBool::new(false)));
        let picked = bot.compute_move().unwrap();
        assert!(bot.stats.follow_ups > 0);
        assert_eq!(bot.game().validate_movement(picked.penguin, picked.target), Ok(()));
        drop(bot);
        assert_eq!(g.board().tiles(), before.board().tiles());
        assert_eq!(g.players(), before.players());
        assert_eq!(g.log_length(), before.log_length());
        assert_eq!(g.log_current(), before.log_current());
    }

    #[test]
    fn test_junction_bonus_prefers_bigger_side() {
        // Left: a single fish. Right: a big field.
        let mut g = moving(&["~~~~~~", "1A1111", "~~1111"], 1);
        let params = BotParameters { recursion_limit: 0, ..BotParameters::default() };
        let mut rng = RandRng::seeded(0);
        let mut bot = BotState::new(&params, &mut g, &mut rng, Arc::new(AtomicBool::new(false)));
        assert_eq!(bot.direction_fish(Coords::new(1, 1)), Some([8, 0, 1, 0]));
        let picked = bot.compute_move().unwrap();
        assert_eq!(picked.penguin, Coords::new(1, 1));
        assert!(picked.target.x > 1);
    }

    #[test]
    fn test_follow_ups_split_penalty_and_discount() {
        // After the step right the penguin sits in a corridor crossing.
        let m = BotMove { penguin: Coords::new(0, 1), target: Coords::new(1, 1) };
        let rows = ["~1~", "A11", "~1~"];
        let mut rng = RandRng::seeded(0);

        let mut g = moving(&rows, 1);
        let params = BotParameters { recursion_limit: 1, ..BotParameters::default() };
        let mut bot = BotState::new(&params, &mut g, &mut rng, Arc::new(AtomicBool::new(false)));
        assert_eq!(bot.rate_move(m, 1), 56 + 10);

        // Every follow-up is a one-tile step worth 66.
        let mut g = moving(&rows, 1);
        let params = BotParameters::default();
        let mut bot = BotState::new(&params, &mut g, &mut rng, Arc::new(AtomicBool::new(false)));
        assert_eq!(bot.rate_move(m, 1), 66 - 200 + 66 * 3 / 4);
        assert_eq!(bot.stats.junction_checks, 1);

        let mut g = moving(&rows, 1);
        let params = BotParameters { junction_check_recursion_limit: -1, ..BotParameters::default() };
        let mut bot = BotState::new(&params, &mut g, &mut rng, Arc::new(AtomicBool::new(false)));
        assert_eq!(bot.rate_move(m, 1), 66 + 49);
        assert_eq!(bot.stats.junction_checks, 0);
    }

    #[test]
    fn test_splits_region() {
        let mut g = moving(&["~1~", "1A1", "~1~"], 1);
        let params = BotParameters::default();
        let mut rng = RandRng::seeded(0);
        let mut bot = BotState::new(&params, &mut g, &mut rng, Arc::new(AtomicBool::new(false)));
        assert!(bot.splits_region(Coords::new(1, 1)));
        assert!(!bot.splits_region(Coords::new(0, 1)));
    }
}
