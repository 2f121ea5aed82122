//! Game snapshot model for Chasemap.
//!
//! This crate defines the shape of one game's exported state and how it
//! is read from bytes:
//!
//! - **Types** ([`GameDocument`], [`Player`], [`Poi`], [`TeamToken`], ...)
//!  : the snapshot the other crates borrow from.
//! - **Timestamps** ([`timestamp`]): the naive wall-clock format the
//!   exporter writes.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes to types and back.
//! - **Errors** ([`ModelError`]).
//!
//! # Architecture
//!
//! ```text
//! Store (bytes) → Model (GameDocument) → Access / Clock (core) → View
//! ```

mod codec;
mod error;
pub mod timestamp;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ModelError;
pub use timestamp::{parse_timestamp, Timestamp};
pub use types::{
    Coordinate, Field, FieldCorners, FinishLine, FinishLinePoints, Game,
    GameDocument, GameId, Location, MapData, Player, Poi, PoiKind, Role,
    TeamId, TeamToken, UserId,
};
