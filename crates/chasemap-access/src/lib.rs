//! Access control for Chasemap map views.
//!
//! This crate answers two questions about a presented token, in order:
//!
//! 1. **Who is this?**: [`resolve`] maps the token to an [`Identity`]
//!    (gamemaster, runner, or hunter team) or [`AccessError::Unauthorized`].
//! 2. **What may they see?**: [`filter`] narrows the roster and the
//!    points of interest to what that identity is allowed to observe.
//!
//! # How it fits in the stack
//!
//! ```text
//! View assembler (above)  ← turns the visible subset into a MapView
//!     ↕
//! Access layer (this crate)  ← identity + visibility policy
//!     ↕
//! Model layer (below)  ← Player, Poi, TeamToken
//! ```
//!
//! Both steps are pure functions over a borrowed snapshot: no I/O, no
//! locking, safe to call from any number of tasks at once.

mod error;
mod identity;
mod resolver;
mod visibility;

pub use error::AccessError;
pub use identity::Identity;
pub use resolver::{resolve, resolve_in};
pub use visibility::{filter, filter_in, Visible};
