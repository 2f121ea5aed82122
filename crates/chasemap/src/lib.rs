//! # Chasemap
//!
//! Live, role-filtered map views for location-based chase games.
//!
//! A client presents an opaque token for a game. Chasemap works out who
//! the token belongs to (the gamemaster, one runner, or a whole hunter
//! team), narrows the game snapshot to what that viewer may see, and
//! adds the time-derived fields: elapsed and remaining minutes, the game
//! phase, and how stale each player's position is.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chasemap::prelude::*;
//!
//! # async fn run() -> Result<(), ChasemapError> {
//! let server = ChasemapServerBuilder::new()
//!     .config(ServerConfig::from_env())
//!     .build_with_files()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! One-off views without a server go through [`MapView::build`].

mod config;
mod error;
mod handler;
mod protocol;
mod server;
mod transport;
mod view;

pub use config::ServerConfig;
pub use error::ChasemapError;
pub use protocol::{ClientMessage, ServerMessage};
pub use server::{ChasemapServer, ChasemapServerBuilder};
pub use transport::TransportError;
pub use view::{GameInfo, MapView, PlayerView, Roster, TeamGroup, UNKNOWN_GAMEMASTER};

/// Everything needed to run a server or build views.
pub mod prelude {
    pub use chasemap_access::{AccessError, Identity};
    pub use chasemap_clock::{GamePhase, RefreshConfig, Staleness};
    pub use chasemap_model::{GameDocument, GameId, TeamId, Timestamp, UserId};
    pub use chasemap_store::{FileStore, GameStore, MemoryStore, StoreError};

    pub use crate::{
        ChasemapError, ChasemapServer, ChasemapServerBuilder, ClientMessage, MapView,
        ServerConfig, ServerMessage,
    };
}
