use crate::cue::CueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error("audio file '{0}' not found, and no alternatives could be found")]
    AudioFileNotFound(String),
}

pub type SplitResult<T> = Result<T, SplitError>;
