//! Time for Chasemap: how far a game has run and how fresh each player is.
//!
//! Two halves:
//!
//! - [`temporal`]: pure functions over timestamps: elapsed and remaining
//!   game minutes, the three-level [`Staleness`] of a player's last
//!   report, and the derived [`GamePhase`]. Callers pass `now` in; nothing
//!   here reads the system clock.
//! - [`RefreshScheduler`]: a Tokio timer that tells a live map
//!   subscription when to rebuild its view (every 30 s by default).
//!
//! # Integration
//!
//! The scheduler sits inside a connection's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         msg = conn.recv() => { /* Refresh / Unwatch */ }
//!         _ = scheduler.wait_for_refresh() => { send(build_view(now())?).await?; }
//!     }
//! }
//! ```

mod refresh;
pub mod temporal;

pub use refresh::{RefreshConfig, RefreshInfo, RefreshScheduler};
pub use temporal::{
    display_remaining, elapsed_minutes, minutes_since, phase, remaining_minutes,
    staleness, GameClock, GamePhase, Staleness,
};
