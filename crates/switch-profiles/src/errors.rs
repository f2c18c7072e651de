use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Position of a token in Go source, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{pos}: {message}")]
pub struct ParseError {
    pub pos: Pos,
    pub message: String,
}

impl ParseError {
    pub fn new(pos: Pos, message: impl Into<String>) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }
}

/// Failure to turn one Go source text into a valid profile.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error("{}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Invalid input pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Failed to enumerate {}: {source}", dir.display())]
    Enumerate { dir: PathBuf, source: io::Error },

    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error("{} does not describe a switch profile: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid switch profile in {}: {}", path.display(), problems.join("; "))]
    Invalid { path: PathBuf, problems: Vec<String> },

    #[error("Failed to serialize profile from {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

pub type ConvertResult<T> = Result<T, ConvertError>;
