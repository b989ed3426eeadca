use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to callers of the composer and the game loader.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid diagram token '{token}': {reason}")]
    InvalidTrigger { token: String, reason: &'static str },

    #[error("Invalid rank {rank_index} '{rank}': {reason}")]
    InvalidRank {
        rank_index: usize,
        rank: String,
        reason: String,
    },

    #[error("Failed to open file '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to read PGN input: {0}")]
    Read(#[from] io::Error),

    #[error("No game found in PGN input")]
    NoGame,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Collects diagnostics that are reported but do not abort rendering.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        match &mut self.0 {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(msg);
            }
            None => {
                self.0 = Some(msg.to_string());
            }
        }
    }

    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}
