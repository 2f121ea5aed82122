//! Snapshot loading for Chasemap.
//!
//! The game bot exports one JSON file per game. This crate turns a game
//! id into a parsed [`GameDocument`](chasemap_model::GameDocument):
//!
//! - [`GameStore`]: the async loading hook the server calls.
//! - [`FileStore`]: reads `ChaseBotGame_{id}.json` from a directory.
//! - [`MemoryStore`]: documents held in memory, for tests and embedding.
//!
//! Load failures are fatal for the request that triggered them: the core
//! never sees a half-loaded document.

mod error;
mod file;
mod memory;
mod store;

pub use error::StoreError;
pub use file::{snapshot_file_name, FileStore};
pub use memory::MemoryStore;
pub use store::GameStore;
