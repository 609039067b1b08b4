//! Text board format used to exchange turns between independent programs.
//!
//! ```text
//! 3 4              <- height width
//! 10 00 20 01      <- `F0` is a tile with F fish (`00` is water),
//! 30 02 10 10         `0P` is a penguin of the player with id P
//! 10 10 10 10
//! alice 1 3        <- name id score, one line per player
//! bob 2 0
//! ```

use std::io::{self, BufRead, Write};

use log::warn;
use thiserror::Error;

use crate::game::GamePhase;
use crate::{Coords, Game, Tile};

pub const MAX_PLAYERS: usize = 9;
pub const MIN_PLAYER_ID: i16 = 1;
pub const MAX_PLAYER_ID: i16 = 9;

#[derive(Debug, Error)]
pub enum BoardFileError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse the board size line: {0:?}")]
    SizeLine(String),
    #[error("invalid board size: {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("invalid tile at x={x} y={y}: {text:?}")]
    InvalidTile { x: i32, y: i32, text: String },
    #[error("failed to parse the player on line {line}: {text:?}")]
    PlayerLine { line: usize, text: String },
    #[error("player id on line {line} is out of range: {id}")]
    IdOutOfRange { line: usize, id: i32 },
    #[error("player id on line {line} is a duplicate: {id}")]
    DuplicateId { line: usize, id: i16 },
    #[error("player name on line {line} is empty")]
    EmptyName { line: usize },
    #[error("no ids left to assign to our own player")]
    NoFreeId,
    #[error("penguin at x={x} y={y} belongs to player {id} who is not listed")]
    UnknownPenguinOwner { x: i32, y: i32, id: i16 },
    #[error("tile at x={x} y={y} can't be written: {tile}")]
    UnwritableTile { x: i32, y: i32, tile: i16 },
}

struct PlayerRecord {
    id: i16,
    name: String,
    points: u32,
}

/// Fill a game that is in [`GamePhase::Setup`] from a board file. Our own
/// player `my_name` is added with the lowest free id if the file doesn't list
/// them yet. The quota becomes the largest of `penguins_arg`, one and the
/// penguin count of any player on the board.
pub fn load_game_state<R: BufRead>(
    game: &mut Game,
    reader: R,
    penguins_arg: usize,
    my_name: &str,
) -> Result<(), BoardFileError> {
    assert_eq!(game.phase(), GamePhase::Setup);
    let mut lines = reader.lines();

    let size_line = lines.next().transpose()?.unwrap_or_default();
    let mut size = size_line.split_whitespace().map(str::parse::<i32>);
    let (height, width) = match (size.next(), size.next()) {
        (Some(Ok(h)), Some(Ok(w))) => (h, w),
        _ => return Err(BoardFileError::SizeLine(size_line)),
    };
    if width <= 0 || height <= 0 {
        return Err(BoardFileError::InvalidSize { width, height });
    }
    game.setup_board(width, height);

    let mut penguins_by_id = [0usize; MAX_PLAYER_ID as usize + 1];
    for y in 0..height {
        let line = lines.next().transpose()?.unwrap_or_default();
        let cells: Vec<&str> = line.split_whitespace().collect();
        if cells.len() < width as usize {
            warn!("row {} has {} of {} tiles, padding with water", y, cells.len(), width);
        }
        for x in 0..width {
            let tile = match cells.get(x as usize) {
                Some(cell) => parse_tile(cell).ok_or_else(|| BoardFileError::InvalidTile {
                    x,
                    y,
                    text: cell.to_string(),
                })?,
                None => Tile::WATER,
            };
            if tile.is_penguin() {
                penguins_by_id[tile.player_id() as usize] += 1;
            }
            game.board_mut().set(Coords::new(x, y), tile);
        }
    }

    let mut players: Vec<PlayerRecord> = Vec::new();
    for (line_nr, line) in lines.enumerate().take(MAX_PLAYERS) {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        let bad_line = || BoardFileError::PlayerLine { line: line_nr, text: line.clone() };
        let mut fields = line.split_whitespace();
        let name = fields.next().ok_or_else(bad_line)?;
        let id: i32 = fields.next().and_then(|s| s.parse().ok()).ok_or_else(bad_line)?;
        let points: u32 = fields.next().and_then(|s| s.parse().ok()).ok_or_else(bad_line)?;

        if !(MIN_PLAYER_ID as i32..=MAX_PLAYER_ID as i32).contains(&id) {
            return Err(BoardFileError::IdOutOfRange { line: line_nr, id });
        }
        let id = id as i16;
        if players.iter().any(|p| p.id == id) {
            return Err(BoardFileError::DuplicateId { line: line_nr, id });
        }
        if name.is_empty() {
            return Err(BoardFileError::EmptyName { line: line_nr });
        }
        players.push(PlayerRecord { id, name: name.to_owned(), points });
    }

    if !players.iter().any(|p| p.name == my_name) {
        let free_id = (MIN_PLAYER_ID..=MAX_PLAYER_ID).find(|id| players.iter().all(|p| p.id != *id));
        match free_id {
            Some(id) if players.len() < MAX_PLAYERS => {
                players.push(PlayerRecord { id, name: my_name.to_owned(), points: 0 })
            }
            _ => return Err(BoardFileError::NoFreeId),
        }
    }

    for coords in game.board().coords() {
        let tile = game.board().get(coords);
        if tile.is_penguin() && players.iter().all(|p| p.id != tile.player_id()) {
            return Err(BoardFileError::UnknownPenguinOwner { x: coords.x, y: coords.y, id: tile.player_id() });
        }
    }

    let quota = players
        .iter()
        .map(|p| penguins_by_id[p.id as usize])
        .fold(penguins_arg.max(1), usize::max);
    game.setup_penguins_per_player(quota);
    game.setup_players_count(players.len());
    // Ids are assigned in two passes so a file listing "2, 1" doesn't clash
    // with the default ids mid-way.
    for idx in 0..players.len() {
        game.setup_player_id(idx, MAX_PLAYER_ID + 1 + idx as i16);
    }
    for (idx, record) in players.iter().enumerate() {
        game.setup_player_id(idx, record.id);
        game.setup_player_name(idx, &record.name);
        game.setup_player_points(idx, record.points);
    }
    Ok(())
}

/// Write the game back in the format read by [`load_game_state`].
pub fn save_game_state<W: Write>(game: &Game, mut writer: W) -> Result<(), BoardFileError> {
    let board = game.board();
    writeln!(writer, "{} {}", board.height(), board.width())?;
    for y in 0..board.height() {
        for x in 0..board.width() {
            if x != 0 {
                write!(writer, " ")?;
            }
            let tile = board.get(Coords::new(x, y));
            match tile.0 {
                0..=9 => write!(writer, "{}0", tile.0)?,
                -9..=-1 => write!(writer, "0{}", -tile.0)?,
                _ => return Err(BoardFileError::UnwritableTile { x, y, tile: tile.0 }),
            }
        }
        writeln!(writer)?;
    }
    for player in game.players() {
        writeln!(writer, "{} {} {}", player.name.as_deref().unwrap_or(""), player.id, player.points)?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_tile(cell: &str) -> Option<Tile> {
    let &[c1, c2] = cell.as_bytes() else {
        return None;
    };
    match (c1, c2) {
        (b'0'..=b'9', b'0') => Some(Tile::fish((c1 - b'0') as i16)),
        (b'0', b'1'..=b'9') => Some(Tile::penguin((c2 - b'0') as i16)),
        _ => None,
    }
}
