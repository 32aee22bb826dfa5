use crate::cue::timecode::TimecodeError;
use crate::cue::tokenizer::TokenizeError;
use std::fmt;
use thiserror::Error;

/// Scope a command has to be issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    File,
    Track,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::File => f.write_str("FILE"),
            Scope::Track => f.write_str("TRACK"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CueError {
    #[error("error reading input: {0}")]
    IoError(#[from] std::io::Error),

    #[error("line {line}: invalid quoting: {source}")]
    QuotingError { line: usize, source: TokenizeError },

    #[error("line {line}: {command} command found outside of a {scope} context")]
    MissingContext {
        line: usize,
        command: &'static str,
        scope: Scope,
    },

    #[error("line {line}: {command} command requires {expected}")]
    MissingArgument {
        line: usize,
        command: &'static str,
        expected: &'static str,
    },

    #[error("line {line}: invalid {field} number: {value:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: invalid timecode for {command}: {source}")]
    InvalidTimecode {
        line: usize,
        command: &'static str,
        source: TimecodeError,
    },
}

impl CueError {
    /// 1-based line the error was raised on, `None` for read failures.
    pub fn line(&self) -> Option<usize> {
        match self {
            CueError::IoError(_) => None,
            CueError::QuotingError { line, .. }
            | CueError::MissingContext { line, .. }
            | CueError::MissingArgument { line, .. }
            | CueError::InvalidNumber { line, .. }
            | CueError::InvalidTimecode { line, .. } => Some(*line),
        }
    }
}

pub type CueResult<T> = Result<T, CueError>;
