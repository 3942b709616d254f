use anyhow::{Context, bail};
use std::str::FromStr;
use sweeper_core::{Coord, Coord2, Level, LevelRequest, Preset};

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    New,
    Stop,
    SetLevel(Level),
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
commands:
  r X Y            reveal the cell at column X, row Y
  f X Y            cycle the flag on a cell
  n                new game
  s                stop the current game
  l NAME           beginner, intermediate or expert
  l WIDTH HEIGHT MINES
  h                this help
  q                quit";

fn parse_coords<'a>(mut args: impl Iterator<Item = &'a str>) -> anyhow::Result<Coord2> {
    let mut next = |axis: &str| -> anyhow::Result<Coord> {
        let arg = args.next().with_context(|| format!("missing {axis} coordinate"))?;
        arg.parse()
            .with_context(|| format!("invalid {axis} coordinate {arg:?}"))
    };
    let x = next("x")?;
    let y = next("y")?;
    Ok((x, y))
}

fn parse_level<'a>(args: impl Iterator<Item = &'a str>) -> anyhow::Result<Level> {
    let args: Vec<_> = args.collect();
    match args.as_slice() {
        [name] => Preset::from_name(name)
            .map(Level::from)
            .with_context(|| format!("unknown level {name:?}")),
        [width, height, mines] => {
            let request = LevelRequest {
                width: width.parse().context("invalid width")?,
                height: height.parse().context("invalid height")?,
                mines: mines.parse().context("invalid mine count")?,
            };
            Ok(Level::try_from(request)?)
        }
        _ => bail!("expected a level name or WIDTH HEIGHT MINES"),
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command, try h");
        };

        Ok(match verb {
            "r" | "reveal" => Self::Reveal(parse_coords(words)?),
            "f" | "flag" => Self::Flag(parse_coords(words)?),
            "n" | "new" => Self::New,
            "s" | "stop" => Self::Stop,
            "l" | "level" => Self::SetLevel(parse_level(words)?),
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => bail!("unknown command {other:?}, try h"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_core::GameError;

    #[test]
    fn parses_cell_commands() {
        assert_eq!("r 3 4".parse::<Command>().unwrap(), Command::Reveal((3, 4)));
        assert_eq!(" flag 0 12 ".parse::<Command>().unwrap(), Command::Flag((0, 12)));
    }

    #[test]
    fn rejects_bad_coordinates() {
        assert!("r 3".parse::<Command>().is_err());
        assert!("r -1 2".parse::<Command>().is_err());
        assert!("f 300 2".parse::<Command>().is_err());
    }

    #[test]
    fn parses_levels() {
        assert_eq!(
            "l expert".parse::<Command>().unwrap(),
            Command::SetLevel(Level::EXPERT)
        );
        assert_eq!(
            "level 5 4 3".parse::<Command>().unwrap(),
            Command::SetLevel(Level::new(5, 4, 3).unwrap())
        );
    }

    #[test]
    fn invalid_custom_level_reports_game_error() {
        let err = "l 2 2 4".parse::<Command>().unwrap_err();
        assert_eq!(
            err.downcast_ref::<GameError>(),
            Some(&GameError::TooManyMines { mines: 4, cells: 4 })
        );
    }

    #[test]
    fn rejects_unknown_input() {
        assert!("".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
        assert!("l hard".parse::<Command>().is_err());
    }
}
