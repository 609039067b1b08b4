//! Whole-game rule checks through the public API.

use penguins_core::fixtures::fixture_with_quota;
use penguins_core::{Coords, Game, GamePhase, MovementError, PlacementError, RandRng, Tile};

fn game_from_ascii(rows: &[&str], players: usize, quota: usize) -> Game {
    fixture_with_quota(rows, players, Some(quota))
}

fn start_movement(game: &mut Game) {
    game.movement_begin();
    game.movement_switch_player().unwrap();
}

#[test]
fn test_one_by_three_slide() {
    let mut game = game_from_ascii(&["A13"], 1, 1);
    start_movement(&mut game);

    let (start, target) = (Coords::new(0, 0), Coords::new(2, 0));
    assert_eq!(game.validate_movement(start, target), Ok(()));
    assert_eq!(game.move_penguin(start, target), 4);
    assert_eq!(game.board().get(Coords::new(0, 0)), Tile::WATER);
    assert_eq!(game.board().get(Coords::new(1, 0)), Tile::WATER);
    assert_eq!(game.board().get(Coords::new(2, 0)), Tile::penguin(1));
    assert_eq!(game.player(0).points, 4);
}

#[test]
fn test_diagonal_rejected_regardless_of_board() {
    for rows in [&["A1", "11"][..], &["~~", "~~"][..], &["AB", "BA"][..]] {
        let mut game = game_from_ascii(rows, 2, 2);
        game.placement_begin();
        game.placement_end();
        game.movement_begin();
        game.set_current_player(Some(0));
        assert_eq!(
            game.validate_movement(Coords::new(0, 0), Coords::new(1, 1)),
            Err(MovementError::Diagonal)
        );
    }
}

#[test]
fn test_multi_fish_placement_rejected() {
    let mut game = game_from_ascii(&["21"], 1, 1);
    game.advance_state();
    assert_eq!(game.phase(), GamePhase::Placement);
    assert_eq!(game.validate_placement(Coords::new(0, 0)), Err(PlacementError::MultipleFish));
    assert_eq!(game.validate_placement(Coords::new(1, 0)), Ok(()));
}

#[test]
fn test_fully_boxed_penguin() {
    let game = game_from_ascii(&["~A~", "B~~"], 2, 1);
    assert_eq!(game.count_obstructed_directions(Coords::new(1, 0)), 4);
    assert_eq!(game.count_obstructed_directions(Coords::new(0, 1)), 4);
}

#[test]
fn test_round_trip_every_move() {
    let mut game = game_from_ascii(&["1213", "A3B1", "2112", "1~31"], 2, 1);
    start_movement(&mut game);
    let before = game.clone();

    let penguin = Coords::new(0, 1);
    let steps = game.calculate_penguin_possible_moves(penguin);
    assert!(steps.total() > 0);
    for dir in penguins_core::Direction::ALL {
        for n in 1..=steps.get(dir) as i32 {
            let d = dir.offset();
            let target = Coords::new(penguin.x + d.x * n, penguin.y + d.y * n);
            assert_eq!(game.validate_movement(penguin, target), Ok(()));
            game.move_penguin(penguin, target);
            game.undo_move_penguin();
            assert_eq!(game.board().tiles(), before.board().tiles());
            assert_eq!(game.players(), before.players());
        }
    }
}

#[test]
fn test_full_game_rewinds_to_start_and_back() {
    let mut game = game_from_ascii(&["1111", "1231", "1111"], 2, 2);
    let mut rng = RandRng::seeded(3);
    game.advance_state();
    let start_hash = game.compute_state_hash();
    let start_entry = game.log_current();

    // Play the whole game by picking random legal actions.
    while game.phase() != GamePhase::End {
        match game.phase() {
            GamePhase::Placement => {
                let free: Vec<Coords> =
                    game.board().coords().filter(|&c| game.validate_placement_simple(c)).collect();
                let pick = free[penguins_core::Rng::random_range(&mut rng, 0, free.len() as i32 - 1) as usize];
                game.place_penguin(pick);
            }
            GamePhase::Movement => {
                let mut moves = Vec::new();
                for &p in &game.current_player().penguins {
                    for dir in penguins_core::Direction::ALL {
                        let target = p.offset(dir.offset());
                        if game.validate_movement(p, target).is_ok() {
                            moves.push((p, target));
                        }
                    }
                }
                let (p, t) = moves[penguins_core::Rng::random_range(&mut rng, 0, moves.len() as i32 - 1) as usize];
                game.move_penguin(p, t);
            }
            phase => panic!("unexpected phase {:?}", phase),
        }
        game.advance_state();
    }

    let end_hash = game.compute_state_hash();
    let end_entry = game.log_current();
    let total: u32 = game.players().iter().map(|p| p.points).sum();
    assert!(total > 0);

    game.rewind_to(start_entry);
    assert_eq!(game.compute_state_hash(), start_hash);
    assert_eq!(game.phase(), GamePhase::Placement);
    assert!(game.players().iter().all(|p| p.penguins.is_empty() && p.points == 0));

    game.rewind_to(end_entry);
    assert_eq!(game.compute_state_hash(), end_hash);
    assert_eq!(game.phase(), GamePhase::End);
}

#[test]
fn test_game_snapshot_serializes() {
    let game = game_from_ascii(&["A1"], 1, 1);
    let json = serde_json::to_string(game.player(0)).unwrap();
    let player: penguins_core::Player = serde_json::from_str(&json).unwrap();
    assert_eq!(&player, game.player(0));
    let entries = serde_json::to_string(game.log_entries()).unwrap();
    assert!(entries.contains("PhaseChange"));
}
