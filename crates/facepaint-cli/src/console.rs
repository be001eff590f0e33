//! Line commands accepted on stdin during `facepaint live`.

use std::str::FromStr;

use facepaint_core::FilterId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Retry the camera after it was lost.
    Start,
    Filter(FilterId),
    Capture,
    /// Save a photo; the latest when no index is given.
    Save(Option<usize>),
    Toggle,
    Pause,
    Resume,
    Status,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("unknown command {0:?} (try \"help\")")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "commands: start, filter <id>, capture, save [index], toggle, pause, resume, status, quit";

impl FromStr for ConsoleCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(ConsoleError::Usage(HELP));
        };
        let argument = words.next();

        match (command.to_ascii_lowercase().as_str(), argument) {
            ("start", _) => Ok(Self::Start),
            ("filter", Some(id)) => Ok(Self::Filter(FilterId::new(id))),
            ("filter", None) => Err(ConsoleError::Usage("filter <id>")),
            ("capture" | "snap", _) => Ok(Self::Capture),
            ("save", None) => Ok(Self::Save(None)),
            ("save", Some(index)) => index
                .parse()
                .map(|index| Self::Save(Some(index)))
                .map_err(|_| ConsoleError::Usage("save [index]")),
            ("toggle" | "flip", _) => Ok(Self::Toggle),
            ("pause", _) => Ok(Self::Pause),
            ("resume", _) => Ok(Self::Resume),
            ("status", _) => Ok(Self::Status),
            ("help" | "?", _) => Ok(Self::Help),
            ("quit" | "exit", _) => Ok(Self::Quit),
            _ => Err(ConsoleError::Unknown(command.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "filter heart-eyes".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Filter(FilterId::new("heart-eyes"))
        );
        assert_eq!("  capture ".parse::<ConsoleCommand>().unwrap(), ConsoleCommand::Capture);
        assert_eq!("save".parse::<ConsoleCommand>().unwrap(), ConsoleCommand::Save(None));
        assert_eq!("save 2".parse::<ConsoleCommand>().unwrap(), ConsoleCommand::Save(Some(2)));
        assert_eq!("TOGGLE".parse::<ConsoleCommand>().unwrap(), ConsoleCommand::Toggle);
        assert_eq!("quit".parse::<ConsoleCommand>().unwrap(), ConsoleCommand::Quit);
        assert_eq!("start".parse::<ConsoleCommand>().unwrap(), ConsoleCommand::Start);
    }

    #[test]
    fn test_unknown_filter_id_is_still_a_command() {
        // Unrecognised ids are passed through and render as no filter.
        assert_eq!(
            "filter not-a-filter".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Filter(FilterId::new("not-a-filter"))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("filter".parse::<ConsoleCommand>(), Err(ConsoleError::Usage("filter <id>")));
        assert_eq!("save last".parse::<ConsoleCommand>(), Err(ConsoleError::Usage("save [index]")));
        assert!(matches!("dance".parse::<ConsoleCommand>(), Err(ConsoleError::Unknown(_))));
        assert!(matches!("".parse::<ConsoleCommand>(), Err(ConsoleError::Usage(_))));
    }
}
