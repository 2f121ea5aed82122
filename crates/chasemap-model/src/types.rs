//! Core data types for a Chasemap game snapshot.
//!
//! These structures mirror the JSON document the game bot exports for
//! every running game (`ChaseBotGame_{id}.json`). Everything downstream
//! (access resolution, visibility filtering, time evaluation) borrows
//! from one parsed [`GameDocument`] and never mutates it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::timestamp::Timestamp;
use crate::ModelError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a game.
///
/// Newtype over the bot's integer game id so it can't be confused with a
/// [`UserId`]. `#[serde(transparent)]` keeps it a plain number in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub i64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// A player's user id (the messenger account id), unique within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A hunter team identifier, e.g. `"Red"`.
///
/// Teams are free-form strings chosen when the game is set up. Equality
/// is exact (case-sensitive), matching how the exporter groups hunters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl TeamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TeamId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Roles and players
// ---------------------------------------------------------------------------

/// What a player does in the game.
///
/// Serialized lowercase (`"gamemaster"`, `"runner"`, `"hunter"`), as the
/// exporter writes it. Players who joined but haven't been given a role
/// yet are exported as `"none"`; they and any role this crate doesn't
/// know decode as [`Role::Unassigned`], which only the gamemaster sees
/// and which no token resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Gamemaster,
    Runner,
    Hunter,
    #[serde(rename = "none", other)]
    Unassigned,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gamemaster => write!(f, "gamemaster"),
            Self::Runner => write!(f, "runner"),
            Self::Hunter => write!(f, "hunter"),
            Self::Unassigned => write!(f, "none"),
        }
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A player's last reported position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    /// When the position was reported. Older exports leave this null.
    #[serde(default, with = "crate::timestamp::option")]
    pub timestamp: Option<Timestamp>,
}

/// One entry of the game's roster.
///
/// Role-specific data is optional rather than split into per-role types:
/// `team` is only meaningful for hunters and `location` is absent until
/// the player has shared a position. Absence is always `None`, never an
/// empty string or `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: UserId,
    pub role: Role,

    /// Hunter team. `None` for runners and the gamemaster, and tolerated
    /// as `None` on a hunter (the hunter then belongs to no team).
    #[serde(default)]
    pub team: Option<TeamId>,

    /// Personal access token. The exporter writes `null` for players who
    /// were never issued one; such players can't be resolved by token.
    #[serde(default)]
    pub token: Option<String>,

    pub first_name: String,

    /// Messenger handle without the `@`. Not every account has one.
    #[serde(default)]
    pub username: Option<String>,

    /// Coin balance. For hunters this mirrors the team wallet.
    #[serde(default)]
    pub budget: i64,

    #[serde(with = "crate::timestamp")]
    pub last_seen: Timestamp,

    #[serde(default)]
    pub location: Option<Location>,
}

impl Player {
    pub fn is_gamemaster(&self) -> bool {
        self.role == Role::Gamemaster
    }

    pub fn is_runner(&self) -> bool {
        self.role == Role::Runner
    }

    pub fn is_hunter(&self) -> bool {
        self.role == Role::Hunter
    }

    /// Returns `true` if this player is a hunter on `team`.
    pub fn hunts_for(&self, team: &TeamId) -> bool {
        self.is_hunter() && self.team.as_ref() == Some(team)
    }

    /// Returns `true` if the player's personal token equals `token`.
    ///
    /// An empty candidate never matches, and neither does a player
    /// without a token.
    pub fn has_token(&self, token: &str) -> bool {
        !token.is_empty() && self.token.as_deref() == Some(token)
    }

    /// `"Anna (@anna_k)"`, or just the first name when there is no handle.
    pub fn display_name(&self) -> String {
        match self.username.as_deref() {
            Some(handle) if !handle.is_empty() => {
                format!("{} (@{})", self.first_name, handle)
            }
            _ => self.first_name.clone(),
        }
    }
}

/// A credential shared by every hunter on one team.
///
/// The exporter also writes `"type": "hunter_team"`; unknown fields are
/// ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamToken {
    pub token: String,
    pub team: TeamId,
}

impl TeamToken {
    pub fn matches(&self, token: &str) -> bool {
        !token.is_empty() && self.token == token
    }
}

// ---------------------------------------------------------------------------
// Points of interest
// ---------------------------------------------------------------------------

/// What kind of object a team placed on the map.
///
/// Kinds the shop adds later decode as [`PoiKind::Other`] instead of
/// failing the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoiKind {
    Trap,
    Watchtower,
    #[serde(other)]
    Other,
}

/// A point of interest placed by a hunter team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(rename = "type")]
    pub kind: PoiKind,

    pub lat: f64,
    pub lon: f64,

    /// Effect radius in meters. Zero means the POI has no area.
    #[serde(default)]
    pub range_meters: f64,

    /// Owning team. A POI without a team is visible to the gamemaster only.
    #[serde(default)]
    pub team: Option<TeamId>,

    #[serde(default)]
    pub creator_id: Option<UserId>,

    #[serde(default, with = "crate::timestamp::option")]
    pub timestamp: Option<Timestamp>,
}

impl Poi {
    pub fn owned_by(&self, team: &TeamId) -> bool {
        self.team.as_ref() == Some(team)
    }
}

// ---------------------------------------------------------------------------
// Map geometry
// ---------------------------------------------------------------------------

/// The playable area as exported: four corners, any of which may be null
/// while the gamemaster is still setting the game up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldCorners {
    #[serde(default)]
    pub corner1: Option<Coordinate>,
    #[serde(default)]
    pub corner2: Option<Coordinate>,
    #[serde(default)]
    pub corner3: Option<Coordinate>,
    #[serde(default)]
    pub corner4: Option<Coordinate>,
}

impl FieldCorners {
    /// Returns the field only if all four corners are set.
    pub fn complete(&self) -> Option<Field> {
        Some(Field {
            corners: [self.corner1?, self.corner2?, self.corner3?, self.corner4?],
        })
    }
}

/// A complete playable polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub corners: [Coordinate; 4],
}

/// The finish line as exported: two endpoints, either may be null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinishLinePoints {
    #[serde(default)]
    pub point1: Option<Coordinate>,
    #[serde(default)]
    pub point2: Option<Coordinate>,
}

impl FinishLinePoints {
    /// Returns the line only if both endpoints are set.
    pub fn complete(&self) -> Option<FinishLine> {
        Some(FinishLine {
            points: [self.point1?, self.point2?],
        })
    }
}

/// A complete finish line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishLine {
    pub points: [Coordinate; 2],
}

/// The `map` section of a game document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub field: FieldCorners,
    #[serde(default)]
    pub finish_line: FinishLinePoints,
    #[serde(default)]
    pub pois: Vec<Poi>,
}

// ---------------------------------------------------------------------------
// Game and document
// ---------------------------------------------------------------------------

/// Game metadata and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,

    /// Free-form status label written by the bot ("headstart", "running",
    /// "ended", ...). Shown as-is; timing decisions use the clock instead.
    pub status: String,

    /// `None` while the game hasn't been started by the gamemaster.
    #[serde(default, with = "crate::timestamp::option")]
    pub start_time: Option<Timestamp>,

    /// `null` and a missing field both read as `0`, as for the headstart.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub duration_minutes: u32,

    #[serde(default, deserialize_with = "null_as_zero")]
    pub runner_headstart_minutes: u32,

    #[serde(default)]
    pub gamemaster_id: Option<UserId>,
}

/// Games created but never configured carry `null` durations.
fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_default())
}

/// A full game snapshot, exactly as exported.
///
/// ```text
/// {
///   "game":         { id, name, status, start_time, ... },
///   "map":          { field, finish_line, pois },
///   "players":      [ ... ],
///   "teams_budget": { "Red": 120, ... },
///   "team_tokens":  [ { team, token, type }, ... ],
///   "timestamp":    "2025-06-01T14:05:00"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDocument {
    pub game: Game,

    #[serde(default)]
    pub map: MapData,

    pub players: Vec<Player>,

    #[serde(default)]
    pub teams_budget: HashMap<TeamId, i64>,

    #[serde(default)]
    pub team_tokens: Vec<TeamToken>,

    /// When the bot exported this snapshot.
    #[serde(default, with = "crate::timestamp::option")]
    pub timestamp: Option<Timestamp>,
}

impl GameDocument {
    /// The first player with the gamemaster role, if any.
    pub fn gamemaster(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_gamemaster())
    }

    /// The team's wallet balance, `0` if the team has no entry.
    pub fn team_budget(&self, team: &TeamId) -> i64 {
        self.teams_budget.get(team).copied().unwrap_or(0)
    }

    pub fn pois(&self) -> &[Poi] {
        &self.map.pois
    }

    /// Checks the structural rules serde can't express.
    ///
    /// # Errors
    /// Returns [`ModelError::Invalid`] when two players share a
    /// `user_id` or a POI has a negative or non-finite range.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::with_capacity(self.players.len());
        for player in &self.players {
            if !seen.insert(player.user_id) {
                return Err(ModelError::Invalid(format!(
                    "duplicate player {}",
                    player.user_id
                )));
            }
        }
        for poi in &self.map.pois {
            if !poi.range_meters.is_finite() || poi.range_meters < 0.0 {
                return Err(ModelError::Invalid(format!(
                    "poi range must be a non-negative number, got {}",
                    poi.range_meters
                )));
            }
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
