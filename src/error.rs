//! Error types for the game engine.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// The board would have no cells.
    InvalidBoard {
        width: i32,
        height: i32,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidBoard { width, height } => {
                write!(f, "invalid board size {width}x{height}, both sides must be at least 1")
            }
        }
    }
}

impl std::error::Error for GameError {}
