//! Penguins bot, autonomous mode.
//!
//! ```text
//! penguins-bot phase=placement penguins=N [name=NAME] [bot-*=...] IN OUT
//! penguins-bot phase=movement [name=NAME] [bot-*=...] IN OUT
//! penguins-bot name
//! penguins-bot generate=random|island width=W height=H OUT
//! ```
//!
//! Exit codes: 0 when a penguin was placed or moved, 1 when there was nothing
//! to do, 2 when the input file is unusable, 3 on any other error.

use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use log::{error, info};

use penguins_bot::autonomous::{find_player_by_name, run_movement_turn, run_placement_turn, DEFAULT_PLAYER_NAME};
use penguins_bot::BotParameters;
use penguins_core::board_file::{load_game_state, save_game_state, BoardFileError};
use penguins_core::{Game, RandRng};

const EXIT_ACTION_MADE: u8 = 0;
const EXIT_NO_ACTION: u8 = 1;
const EXIT_INPUT_ERROR: u8 = 2;
const EXIT_INTERNAL_ERROR: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Generator {
    Random,
    Island,
}

#[derive(Debug)]
enum Action {
    Placement { penguins: usize },
    Movement,
    PrintName,
    Generate { kind: Generator, width: i32, height: i32 },
}

#[derive(Debug)]
struct Options {
    action: Action,
    name: String,
    params: BotParameters,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| anyhow!("invalid value for {}: {:?}", key, value))
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut phase = None;
    let mut penguins = None;
    let mut print_name = false;
    let mut generate = None;
    let mut width = 20;
    let mut height = 20;
    let mut name = DEFAULT_PLAYER_NAME.to_owned();
    let mut params = BotParameters::default();
    let mut overrides = Vec::new();
    let mut paths = Vec::new();

    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            if arg == "name" {
                print_name = true;
            } else {
                paths.push(PathBuf::from(arg));
            }
            continue;
        };
        match key {
            "phase" => phase = Some(value.to_owned()),
            "penguins" => penguins = Some(parse_number::<usize>(key, value)?),
            "name" => name = value.to_owned(),
            "generate" => {
                generate = Some(match value {
                    "random" => Generator::Random,
                    "island" => Generator::Island,
                    _ => bail!("unknown generator {:?}", value),
                })
            }
            "width" => width = parse_number(key, value)?,
            "height" => height = parse_number(key, value)?,
            "bot-config" => {
                let file = File::open(value).with_context(|| format!("failed to open bot config {}", value))?;
                params = serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("failed to parse bot config {}", value))?;
            }
            _ if key.starts_with("bot-") => overrides.push((key, value)),
            _ => bail!("unknown argument {:?}", arg),
        }
    }

    // Single options win over the config file, whatever their order.
    for (key, value) in overrides {
        params.set_option(key, value)?;
    }

    let action = if print_name {
        Action::PrintName
    } else if let Some(kind) = generate {
        if width <= 0 || height <= 0 {
            bail!("invalid board size {}x{}", width, height);
        }
        Action::Generate { kind, width, height }
    } else {
        match phase.as_deref() {
            Some("placement") => Action::Placement {
                penguins: penguins.context("phase=placement needs penguins=N")?,
            },
            Some("movement") => Action::Movement,
            Some(other) => bail!("unknown phase {:?}", other),
            None => bail!("no action given, expected phase=..., name or generate=..."),
        }
    };

    let mut paths = paths.into_iter();
    let (input, output) = match action {
        Action::PrintName => (None, None),
        Action::Generate { .. } => (None, Some(paths.next().context("missing output file")?)),
        _ => (
            Some(paths.next().context("missing input file")?),
            Some(paths.next().context("missing output file")?),
        ),
    };
    if let Some(extra) = paths.next() {
        bail!("unexpected argument {:?}", extra);
    }

    Ok(Options { action, name, params, input, output })
}

fn save(game: &Game, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    save_game_state(game, BufWriter::new(file)).with_context(|| format!("failed to write {}", path.display()))
}

fn generate(kind: Generator, width: i32, height: i32, output: &Path) -> Result<()> {
    let mut rng = RandRng::fast();
    let mut game = Game::new();
    game.begin_setup();
    game.setup_board(width, height);
    match kind {
        Generator::Random => game.board_mut().generate_random(&mut rng),
        Generator::Island => game.board_mut().generate_island(&mut rng),
    }
    save(&game, output)?;
    info!("generated a {}x{} board into {}", width, height, output.display());
    Ok(())
}

/// Returns whether an action was made.
fn run(options: Options, cancelled: Arc<AtomicBool>) -> Result<bool> {
    let (input, output) = match (&options.action, &options.input, &options.output) {
        (Action::PrintName, _, _) => {
            println!("{}", options.name);
            return Ok(true);
        }
        (Action::Generate { kind, width, height }, _, Some(output)) => {
            generate(*kind, *width, *height, output)?;
            return Ok(true);
        }
        (_, Some(input), Some(output)) => (input, output),
        _ => bail!("missing input or output file"),
    };

    let penguins = match options.action {
        Action::Placement { penguins } => penguins,
        _ => 0,
    };
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let mut game = Game::new();
    game.begin_setup();
    load_game_state(&mut game, BufReader::new(file), penguins, &options.name)
        .with_context(|| format!("failed to load {}", input.display()))?;
    game.end_setup();

    let me = find_player_by_name(&game, &options.name)
        .with_context(|| format!("player {} missing after load", options.name))?;
    let mut rng = RandRng::fast();
    let acted = match options.action {
        Action::Placement { .. } => run_placement_turn(&mut game, me, &options.params, &mut rng, cancelled),
        _ => run_movement_turn(&mut game, me, &options.params, &mut rng, cancelled),
    };

    save(&game, output)?;
    Ok(acted)
}

fn is_input_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<BoardFileError>() || cause.is::<io::Error>())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_INTERNAL_ERROR);
        }
    };

    // Ctrl-C stops the search; the bot then gives up on its turn.
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    }) {
        error!("failed to set the Ctrl-C handler: {}", e);
        return ExitCode::from(EXIT_INTERNAL_ERROR);
    }

    match run(options, cancelled) {
        Ok(true) => ExitCode::from(EXIT_ACTION_MADE),
        Ok(false) => ExitCode::from(EXIT_NO_ACTION),
        Err(e) => {
            error!("{:#}", e);
            if is_input_error(&e) {
                ExitCode::from(EXIT_INPUT_ERROR)
            } else {
                ExitCode::from(EXIT_INTERNAL_ERROR)
            }
        }
    }
}
