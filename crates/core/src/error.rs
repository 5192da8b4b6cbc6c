//! Error types for board-oracle-core

use thiserror::Error;

use crate::xiangqi::{FenError, MoveParseError};

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("API settings are incomplete")]
    IncompleteSettings,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid position: {0}")]
    Fen(#[from] FenError),

    #[error("Invalid move: {0}")]
    Move(#[from] MoveParseError),

    #[error("Chess error: {0}")]
    Chess(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
