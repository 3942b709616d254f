use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use sweeper_core::{Game, Level, LevelRequest, Preset};

use command::Command;

mod command;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Terminal mine-clearing game", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Named level to start with
    #[arg(short, long, value_parser = parse_preset, conflicts_with = "width")]
    level: Option<Preset>,

    /// Custom board width
    #[arg(long, requires_all = ["height", "mines"])]
    width: Option<i64>,

    /// Custom board height
    #[arg(long, requires = "width")]
    height: Option<i64>,

    /// Custom mine count
    #[arg(long, requires = "width")]
    mines: Option<i64>,
}

impl Args {
    fn initial_level(&self) -> anyhow::Result<Level> {
        if let (Some(width), Some(height), Some(mines)) = (self.width, self.height, self.mines) {
            let request = LevelRequest {
                width,
                height,
                mines,
            };
            return Level::try_from(request).context("invalid custom level");
        }
        Ok(self.level.map(Level::from).unwrap_or_default())
    }
}

fn parse_preset(name: &str) -> Result<Preset, String> {
    Preset::from_name(name).ok_or_else(|| {
        let names: Vec<_> = Preset::ALL.iter().map(|preset| preset.name()).collect();
        format!("expected one of: {}", names.join(", "))
    })
}

/// Runs a command, returns whether the board or the round changed.
fn apply(game: &mut Game, command: Command) -> anyhow::Result<bool> {
    Ok(match command {
        Command::Reveal(coords) => {
            if game.press(coords).is_some() {
                log::info!("timer started");
            }
            let outcome = game.reveal(coords)?;
            log::debug!("reveal {:?}: {:?}", coords, outcome);
            outcome.has_update()
        }
        Command::Flag(coords) => {
            let outcome = game.cycle_flag(coords)?;
            log::debug!("flag {:?}: {:?}", coords, outcome);
            outcome.has_update()
        }
        Command::New => {
            game.restart();
            true
        }
        Command::Stop => {
            game.stop();
            true
        }
        Command::SetLevel(level) => {
            game.set_level(level);
            true
        }
        Command::Help | Command::Quit => false,
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("seed: {:?}", args.seed);

    let level = args.initial_level()?;
    let mut game = match args.seed {
        Some(seed) => Game::with_level_and_seed(level, seed),
        None => Game::with_level(level),
    };

    let mut stdout = io::stdout().lock();
    render::render(&game, &mut stdout)?;

    for line in io::stdin().lock().lines() {
        let line = line?;

        // the prompt loop stands in for the host's one-second interval
        if let Some(token) = game.timer_token() {
            game.tick(token);
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => writeln!(stdout, "{}", command::HELP)?,
            Ok(command) => match apply(&mut game, command) {
                Ok(true) => {
                    render::render(&game, &mut stdout)?;
                    if game.state().is_finished() {
                        writeln!(stdout, "type n for a new round")?;
                    }
                }
                Ok(false) => writeln!(stdout, "nothing changed")?,
                Err(err) => writeln!(stdout, "error: {err:#}")?,
            },
            Err(err) => writeln!(stdout, "error: {err:#}")?,
        }
    }

    log::debug!("exiting");
    Ok(())
}
