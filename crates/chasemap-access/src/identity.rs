//! Who a token belongs to.

use std::fmt;

use chasemap_model::{TeamId, UserId};
use serde::{Deserialize, Serialize};

/// The resolved owner of a token.
///
/// A tagged enum instead of a loose `(role, user_id, team)` triple: a
/// gamemaster or runner identity always carries a user id and never a
/// team, a hunter-team identity always carries a team and never a user.
/// "Unauthorized" is not a variant; it is the `Err` side of
/// [`resolve`](crate::resolve), so an unresolved token can't reach the
/// visibility filter.
///
/// Serialized internally tagged:
/// `{ "type": "hunter_team", "team": "Red" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Identity {
    /// The game's overseer. Sees everything.
    Gamemaster { user_id: UserId },

    /// A single runner. Sees only themself.
    Runner { user_id: UserId },

    /// A whole hunter team, via the team's shared token. Hunters have no
    /// personal map access.
    HunterTeam { team: TeamId },
}

impl Identity {
    /// The user behind a personal token, `None` for a team token.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Gamemaster { user_id } | Self::Runner { user_id } => Some(*user_id),
            Self::HunterTeam { .. } => None,
        }
    }

    /// The bound team, `None` for personal tokens.
    pub fn team(&self) -> Option<&TeamId> {
        match self {
            Self::HunterTeam { team } => Some(team),
            _ => None,
        }
    }

    /// Whether the gamemaster's own coin balance may be shown.
    ///
    /// Only the gamemaster sees it. Runner and hunter balances are not
    /// affected by this flag; they stay on every roster entry a viewer
    /// can see.
    pub fn reveals_own_budget(&self) -> bool {
        matches!(self, Self::Gamemaster { .. })
    }

    /// Short lowercase label for logs: `gamemaster`, `runner`, `hunter_team`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gamemaster { .. } => "gamemaster",
            Self::Runner { .. } => "runner",
            Self::HunterTeam { .. } => "hunter_team",
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gamemaster { user_id } => write!(f, "gamemaster {user_id}"),
            Self::Runner { user_id } => write!(f, "runner {user_id}"),
            Self::HunterTeam { team } => write!(f, "hunter_team {team}"),
        }
    }
}
