//! ASCII boards for unit tests: `~` water, `1`-`9` fish, `A`-`Z` a penguin of
//! player index 0-25. Other crates get them through the `test-util` feature.

use crate::{Game, Tile};

/// Build a game in `SetupDone` from rows of ASCII tiles. The quota is the
/// largest number of penguins any player already has, at least one.
pub fn fixture(rows: &[&str], players: usize) -> Game {
    fixture_with_quota(rows, players, None)
}

/// Like [`fixture`], with an explicit quota when `quota` is set.
pub fn fixture_with_quota(rows: &[&str], players: usize, quota: Option<usize>) -> Game {
    let height = rows.len() as i32;
    let width = rows[0].len() as i32;
    let mut game = Game::new();
    game.begin_setup();
    game.setup_players_count(players);
    game.setup_board(width, height);

    let mut counts = vec![0usize; players];
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.len() as i32, width, "ragged fixture row {}", y);
        for (x, ch) in row.chars().enumerate() {
            let tile = match ch {
                '~' => Tile::WATER,
                '1'..='9' => Tile::fish(ch as i16 - '0' as i16),
                'A'..='Z' => {
                    let idx = (ch as u8 - b'A') as usize;
                    counts[idx] += 1;
                    Tile::penguin(idx as i16 + 1)
                }
                _ => panic!("bad fixture tile {:?}", ch),
            };
            game.board_mut().set(crate::Coords::new(x as i32, y as i32), tile);
        }
    }

    let quota = quota.unwrap_or_else(|| counts.iter().copied().max().unwrap_or(0).max(1));
    game.setup_penguins_per_player(quota);
    for idx in 0..players {
        game.setup_player_name(idx, &format!("p{}", idx + 1));
    }
    game.end_setup();
    game
}
