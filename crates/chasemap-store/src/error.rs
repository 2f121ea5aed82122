//! Error types for snapshot loading.

use chasemap_model::{GameId, ModelError};

/// Errors that can occur while loading a game snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The id can never name a game (zero or negative).
    #[error("invalid game id {0}")]
    InvalidGameId(i64),

    /// No snapshot exists for this game, or the file is empty.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// The file exists but could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file was read but is not a usable game document.
    #[error("snapshot for game {0} is malformed: {1}")]
    Malformed(GameId, ModelError),
}
