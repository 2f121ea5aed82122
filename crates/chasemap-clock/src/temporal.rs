//! Derived time values: elapsed/remaining minutes, staleness, phase.
//!
//! All minute counts are *total whole minutes* between two instants,
//! truncated toward zero. 1 h 5 min is 65, never 5, and a difference that
//! spans midnight or several days counts every minute in between.

use chasemap_model::{Game, Timestamp};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Staleness
// ---------------------------------------------------------------------------

/// Upper bound (inclusive) in minutes for [`Staleness::Green`].
pub const GREEN_MAX_MINUTES: i64 = 3;

/// Upper bound (inclusive) in minutes for [`Staleness::Orange`].
pub const ORANGE_MAX_MINUTES: i64 = 6;

/// How fresh a player's last report is.
///
/// Fixed policy, the same for every game:
///
/// ```text
///   0 ─── 3 │ 4 ─── 6 │ 7 ───→   minutes since last_seen
///    green  │  orange │  red
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Staleness {
    Green,
    Orange,
    Red,
}

impl Staleness {
    pub fn from_minutes(minutes: i64) -> Self {
        if minutes <= GREEN_MAX_MINUTES {
            Self::Green
        } else if minutes <= ORANGE_MAX_MINUTES {
            Self::Orange
        } else {
            Self::Red
        }
    }
}

/// Whole minutes since `last_seen`. A `last_seen` in the future counts as 0.
pub fn minutes_since(last_seen: Timestamp, now: Timestamp) -> i64 {
    (now - last_seen).num_minutes().max(0)
}

/// Staleness of a report made at `last_seen`, as of `now`.
pub fn staleness(last_seen: Timestamp, now: Timestamp) -> Staleness {
    Staleness::from_minutes(minutes_since(last_seen, now))
}

// ---------------------------------------------------------------------------
// Elapsed / remaining
// ---------------------------------------------------------------------------

/// Whole minutes the game has been running.
///
/// Clamped at zero when `now` is before `start_time` (clock skew or a
/// start scheduled in the future).
pub fn elapsed_minutes(start_time: Timestamp, now: Timestamp) -> i64 {
    (now - start_time).num_minutes().max(0)
}

/// `duration_minutes - elapsed`. Negative once the game is over time;
/// use [`display_remaining`] to show it.
pub fn remaining_minutes(elapsed: i64, duration_minutes: u32) -> i64 {
    i64::from(duration_minutes) - elapsed
}

/// Remaining minutes as shown to players: never below zero.
pub fn display_remaining(remaining: i64) -> i64 {
    remaining.max(0)
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a game is in its lifecycle, derived purely from time.
///
/// ```text
///   NotStarted ──start──→ Headstart ──start+headstart──→ Running ──start+duration──→ Ended
/// ```
///
/// The bot's own `status` label can lag behind (it is updated by a
/// scheduler that runs every few seconds); the phase never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// No start time yet, or the start lies in the future.
    NotStarted,
    /// Runners are moving; hunters must wait.
    Headstart,
    /// Hunters are out.
    Running,
    /// Strictly past `start_time + duration`.
    Ended,
}

/// Phase of a game as of `now`.
///
/// A headstart longer than the game simply means the game ends during
/// the headstart.
pub fn phase(
    start_time: Option<Timestamp>,
    headstart_minutes: u32,
    duration_minutes: u32,
    now: Timestamp,
) -> GamePhase {
    let Some(start) = start_time else {
        return GamePhase::NotStarted;
    };
    if now < start {
        return GamePhase::NotStarted;
    }
    let since_start = now - start;
    if since_start > TimeDelta::minutes(i64::from(duration_minutes)) {
        GamePhase::Ended
    } else if since_start < TimeDelta::minutes(i64::from(headstart_minutes)) {
        GamePhase::Headstart
    } else {
        GamePhase::Running
    }
}

// ---------------------------------------------------------------------------
// GameClock
// ---------------------------------------------------------------------------

/// The timing fields of a [`Game`], bundled so callers evaluate
/// everything against one `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    pub start_time: Option<Timestamp>,
    pub duration_minutes: u32,
    pub headstart_minutes: u32,
}

impl GameClock {
    /// Elapsed minutes; `0` for a game without a start time.
    pub fn elapsed(&self, now: Timestamp) -> i64 {
        self.start_time
            .map_or(0, |start| elapsed_minutes(start, now))
    }

    /// Unclamped remaining minutes.
    pub fn remaining(&self, now: Timestamp) -> i64 {
        remaining_minutes(self.elapsed(now), self.duration_minutes)
    }

    pub fn phase(&self, now: Timestamp) -> GamePhase {
        phase(
            self.start_time,
            self.headstart_minutes,
            self.duration_minutes,
            now,
        )
    }
}

impl From<&Game> for GameClock {
    fn from(game: &Game) -> Self {
        Self {
            start_time: game.start_time,
            duration_minutes: game.duration_minutes,
            headstart_minutes: game.runner_headstart_minutes,
        }
    }
}
