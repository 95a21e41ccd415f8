use core::str::FromStr;

use minefield_core::{Coord, Difficulty, Position};

/// One line of player input. Coordinates are typed 1-based and stored 0-based.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Command {
    Open(Position),
    Flag(Position),
    New,
    Level(Difficulty),
    Help,
    Quit,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("type a command, or h for help")]
    Empty,
    #[error("unknown command {0:?}, type h for help")]
    UnknownCommand(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("{0:?} is not a row or column number")]
    InvalidCoordinate(String),
    #[error("{0}")]
    UnknownLevel(String),
    #[error("unexpected {0:?} at the end")]
    Unexpected(String),
}

pub(crate) const HELP: &str = "\
commands:
  o <row> <column>   open a field
  f <row> <column>   flag or unflag a field
  n                  new game
  l <level>          casual level: easy, medium or hard
  h                  this help
  q                  quit";

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let word = words.next().ok_or(ParseError::Empty)?;

        let command = match word.to_ascii_lowercase().as_str() {
            "o" | "open" => Command::Open(position(&mut words)?),
            "f" | "flag" => Command::Flag(position(&mut words)?),
            "n" | "new" => Command::New,
            "l" | "level" => {
                let level = words.next().ok_or(ParseError::MissingArgument("level"))?;
                Command::Level(level.parse().map_err(ParseError::UnknownLevel)?)
            }
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => return Err(ParseError::UnknownCommand(word.to_owned())),
        };

        match words.next() {
            Some(extra) => Err(ParseError::Unexpected(extra.to_owned())),
            None => Ok(command),
        }
    }
}

fn position<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<Position, ParseError> {
    let row = coordinate(words, "row")?;
    let column = coordinate(words, "column")?;
    Ok(Position::new(row, column))
}

fn coordinate<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<Coord, ParseError> {
    let word = words.next().ok_or(ParseError::MissingArgument(name))?;
    match word.parse::<Coord>() {
        Ok(number) if number >= 1 => Ok(number - 1),
        _ => Err(ParseError::InvalidCoordinate(word.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_are_one_based() {
        assert_eq!("o 1 1".parse(), Ok(Command::Open(Position::new(0, 0))));
        assert_eq!("flag 3 7".parse(), Ok(Command::Flag(Position::new(2, 6))));
        assert_eq!("  O   2 4  ".parse(), Ok(Command::Open(Position::new(1, 3))));
    }

    #[test]
    fn plain_commands() {
        assert_eq!("n".parse(), Ok(Command::New));
        assert_eq!("quit".parse(), Ok(Command::Quit));
        assert_eq!("?".parse(), Ok(Command::Help));
        assert_eq!("l hard".parse(), Ok(Command::Level(Difficulty::Hard)));
    }

    #[test]
    fn bad_input_explains_itself() {
        assert_eq!("".parse::<Command>(), Err(ParseError::Empty));
        assert_eq!("o 2".parse::<Command>(), Err(ParseError::MissingArgument("column")));
        assert_eq!(
            "o 0 1".parse::<Command>(),
            Err(ParseError::InvalidCoordinate("0".into()))
        );
        assert_eq!(
            "f 1 300".parse::<Command>(),
            Err(ParseError::InvalidCoordinate("300".into()))
        );
        assert_eq!("n now".parse::<Command>(), Err(ParseError::Unexpected("now".into())));
        assert_eq!(
            "dig 1 1".parse::<Command>(),
            Err(ParseError::UnknownCommand("dig".into()))
        );
        assert!(matches!(
            "l insane".parse::<Command>(),
            Err(ParseError::UnknownLevel(_))
        ));
    }
}
