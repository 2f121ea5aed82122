//! The map view: everything one viewer may see, with derived fields.
//!
//! [`MapView::build`] is the whole pipeline for one request:
//!
//! ```text
//!   token ──resolve──→ Identity ──filter──→ Visible ──clock──→ MapView
//! ```
//!
//! The view is structured data only. Rendering (markers, colours, the
//! field polygon) is the client's business.

use chasemap_access::{filter_in, resolve_in, Identity, Visible};
use chasemap_clock::{display_remaining, minutes_since, GameClock, GamePhase, Staleness};
use chasemap_model::{
    Field, FinishLine, GameDocument, GameId, Location, Player, Poi, Role, TeamId, Timestamp,
    UserId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ChasemapError;

/// Label used when a game has no gamemaster on its roster.
pub const UNKNOWN_GAMEMASTER: &str = "unknown";

/// One viewer's map of one game at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub game: GameInfo,
    pub identity: Identity,

    /// Who runs the game, taken from the full roster so every viewer
    /// sees it, even those who can't see the gamemaster's marker.
    pub gamemaster_label: String,

    /// Visible players in roster order.
    pub players: Vec<PlayerView>,
    pub roster: Roster,
    pub pois: Vec<Poi>,

    /// Only present once all four corners are set.
    pub field: Option<Field>,
    /// Only present once both endpoints are set.
    pub finish_line: Option<FinishLine>,

    /// The `now` every derived field was computed against.
    #[serde(with = "chasemap_model::timestamp")]
    pub generated_at: Timestamp,
}

/// Game header with derived timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: GameId,
    pub name: String,
    pub status: String,
    pub phase: GamePhase,
    #[serde(default, with = "chasemap_model::timestamp::option")]
    pub start_time: Option<Timestamp>,
    pub elapsed_minutes: i64,
    /// Negative once the game runs over.
    pub remaining_minutes: i64,
    /// `remaining_minutes` floored at zero.
    pub remaining_display: i64,
    pub headstart_minutes: u32,
    pub duration_minutes: u32,
}

/// A player as a viewer sees them. Carries no token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub user_id: UserId,
    pub role: Role,
    pub team: Option<TeamId>,
    pub first_name: String,
    pub username: Option<String>,
    pub display_name: String,

    /// `None` when hidden: the gamemaster's balance, for anyone but the
    /// gamemaster.
    pub budget: Option<i64>,

    pub location: Option<Location>,
    #[serde(with = "chasemap_model::timestamp")]
    pub last_seen: Timestamp,
    pub minutes_since_seen: i64,
    pub staleness: Staleness,
}

impl PlayerView {
    fn project(player: &Player, reveal_own_budget: bool, now: Timestamp) -> Self {
        let minutes = minutes_since(player.last_seen, now);
        let budget = if player.is_gamemaster() && !reveal_own_budget {
            None
        } else {
            Some(player.budget)
        };
        Self {
            user_id: player.user_id,
            role: player.role,
            team: player.team.clone(),
            first_name: player.first_name.clone(),
            username: player.username.clone(),
            display_name: player.display_name(),
            budget,
            location: player.location.clone(),
            last_seen: player.last_seen,
            minutes_since_seen: minutes,
            staleness: Staleness::from_minutes(minutes),
        }
    }
}

/// The visible players grouped the way the player list shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub gamemaster: Option<UserId>,
    pub runners: Vec<UserId>,
    /// Hunter teams in order of first appearance on the roster.
    pub teams: Vec<TeamGroup>,
    /// Hunters with no team. Kept out of every team group.
    pub unassigned: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamGroup {
    pub team: TeamId,
    /// The team's wallet; `0` when the snapshot has no entry for it.
    pub budget: i64,
    pub hunters: Vec<UserId>,
}

impl Roster {
    fn group(players: &[&Player], doc: &GameDocument) -> Self {
        let mut roster = Self::default();
        for player in players {
            match player.role {
                Role::Gamemaster => {
                    roster.gamemaster.get_or_insert(player.user_id);
                }
                Role::Runner => roster.runners.push(player.user_id),
                Role::Hunter => match &player.team {
                    Some(team) => {
                        let index = match roster.teams.iter().position(|g| &g.team == team) {
                            Some(i) => i,
                            None => {
                                roster.teams.push(TeamGroup {
                                    team: team.clone(),
                                    budget: doc.team_budget(team),
                                    hunters: Vec::new(),
                                });
                                roster.teams.len() - 1
                            }
                        };
                        roster.teams[index].hunters.push(player.user_id);
                    }
                    None => roster.unassigned.push(player.user_id),
                },
                // Joined without a role: on the map for the gamemaster,
                // not on the player list.
                Role::Unassigned => {}
            }
        }
        roster
    }
}

impl MapView {
    /// Resolves `token`, filters the snapshot, and evaluates every
    /// time-derived field against `now`.
    ///
    /// # Errors
    /// [`ChasemapError::Access`] if the token resolves to nobody. Nothing
    /// from the snapshot is included in that case.
    pub fn build(doc: &GameDocument, token: &str, now: Timestamp) -> Result<Self, ChasemapError> {
        let identity = resolve_in(doc, token)?;
        let visible = filter_in(&identity, doc);
        let view = Self::assemble(doc, identity.clone(), &visible, now);
        debug!(
            game_id = %doc.game.id,
            %identity,
            players = view.players.len(),
            pois = view.pois.len(),
            "view built"
        );
        Ok(view)
    }

    fn assemble(
        doc: &GameDocument,
        identity: Identity,
        visible: &Visible<'_>,
        now: Timestamp,
    ) -> Self {
        let clock = GameClock::from(&doc.game);
        let elapsed = clock.elapsed(now);
        let remaining = clock.remaining(now);

        let game = GameInfo {
            id: doc.game.id,
            name: doc.game.name.clone(),
            status: doc.game.status.clone(),
            phase: clock.phase(now),
            start_time: doc.game.start_time,
            elapsed_minutes: elapsed,
            remaining_minutes: remaining,
            remaining_display: display_remaining(remaining),
            headstart_minutes: doc.game.runner_headstart_minutes,
            duration_minutes: doc.game.duration_minutes,
        };

        let gamemaster_label = doc
            .gamemaster()
            .map(Player::display_name)
            .unwrap_or_else(|| UNKNOWN_GAMEMASTER.to_string());

        Self {
            game,
            identity,
            gamemaster_label,
            players: visible
                .players
                .iter()
                .map(|p| PlayerView::project(p, visible.reveal_own_budget, now))
                .collect(),
            roster: Roster::group(&visible.players, doc),
            pois: visible.pois.iter().map(|p| (*p).clone()).collect(),
            field: doc.map.field.complete(),
            finish_line: doc.map.finish_line.complete(),
            generated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone, Utc};

    use super::*;

    const DOC: &str = r#"{
        "game": {"id": 3, "name": "Harbour", "status": "running",
                 "start_time": "2025-06-01T12:00:00", "duration_minutes": 60,
                 "runner_headstart_minutes": 10},
        "map": {
            "field": {"corner1": {"lat": 1.0, "lon": 1.0}, "corner2": {"lat": 1.0, "lon": 2.0},
                      "corner3": {"lat": 2.0, "lon": 2.0}, "corner4": null},
            "finish_line": {"point1": {"lat": 1.5, "lon": 1.0}, "point2": {"lat": 1.5, "lon": 2.0}},
            "pois": [{"type": "trap", "lat": 1.2, "lon": 1.2, "range_meters": 0, "team": "Red"}]
        },
        "players": [
            {"user_id": 1, "first_name": "Gert", "username": "gert", "role": "gamemaster",
             "team": null, "token": "GM", "budget": 999, "last_seen": "2025-06-01T12:44:00"},
            {"user_id": 2, "first_name": "Runa", "username": null, "role": "runner",
             "team": null, "token": "R2", "budget": 15, "last_seen": "2025-06-01T12:41:00",
             "location": {"lat": 1.4, "lon": 1.6, "timestamp": "2025-06-01T12:41:00"}},
            {"user_id": 3, "first_name": "Henk", "username": "henk", "role": "hunter",
             "team": "Red", "token": null, "budget": 80, "last_seen": "2025-06-01T12:30:00"}
        ],
        "teams_budget": {"Red": 80},
        "team_tokens": [{"team": "Red", "token": "TR", "type": "hunter_team"}]
    }"#;

    fn doc() -> GameDocument {
        serde_json::from_str(DOC).unwrap()
    }

    fn at(h: u32, m: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_timing_fields() {
        let view = MapView::build(&doc(), "TR", at(12, 45)).unwrap();
        assert_eq!(view.game.elapsed_minutes, 45);
        assert_eq!(view.game.remaining_minutes, 15);
        assert_eq!(view.game.remaining_display, 15);
        assert_eq!(view.game.phase, GamePhase::Running);
        assert_eq!(view.generated_at, at(12, 45));
    }

    #[test]
    fn test_over_time_game() {
        let view = MapView::build(&doc(), "GM", at(13, 20)).unwrap();
        assert_eq!(view.game.remaining_minutes, -20);
        assert_eq!(view.game.remaining_display, 0);
        assert_eq!(view.game.phase, GamePhase::Ended);
    }

    #[test]
    fn test_staleness_per_player() {
        let view = MapView::build(&doc(), "TR", at(12, 45)).unwrap();
        let runner = &view.players[0];
        assert_eq!(runner.minutes_since_seen, 4);
        assert_eq!(runner.staleness, Staleness::Orange);
        let hunter = &view.players[1];
        assert_eq!(hunter.staleness, Staleness::Red);
    }

    #[test]
    fn test_gamemaster_budget_hidden_from_others() {
        let gm_view = MapView::build(&doc(), "GM", at(12, 45)).unwrap();
        assert_eq!(gm_view.players[0].budget, Some(999));

        // A runner never sees the gamemaster entry at all, but budgets of
        // visible non-gamemaster players stay.
        let team_view = MapView::build(&doc(), "TR", at(12, 45)).unwrap();
        assert!(team_view.players.iter().all(|p| p.role != Role::Gamemaster));
        assert_eq!(team_view.players[0].budget, Some(15));
    }

    #[test]
    fn test_gamemaster_label_from_full_roster() {
        let view = MapView::build(&doc(), "R2", at(12, 45)).unwrap();
        assert_eq!(view.gamemaster_label, "Gert (@gert)");
        assert_eq!(view.players.len(), 1);

        let mut no_gm = doc();
        no_gm.players.remove(0);
        let view = MapView::build(&no_gm, "R2", at(12, 45)).unwrap();
        assert_eq!(view.gamemaster_label, UNKNOWN_GAMEMASTER);
    }

    #[test]
    fn test_geometry_only_when_complete() {
        let view = MapView::build(&doc(), "GM", at(12, 45)).unwrap();
        assert!(view.field.is_none());
        assert!(view.finish_line.is_some());
    }

    #[test]
    fn test_roster_grouping() {
        let view = MapView::build(&doc(), "GM", at(12, 45)).unwrap();
        assert_eq!(view.roster.gamemaster, Some(UserId(1)));
        assert_eq!(view.roster.runners, vec![UserId(2)]);
        assert_eq!(view.roster.teams.len(), 1);
        assert_eq!(view.roster.teams[0].budget, 80);
        assert_eq!(view.roster.teams[0].hunters, vec![UserId(3)]);
    }

    #[test]
    fn test_offset_timestamps_share_the_local_clock() {
        // Runner reports in CEST, hunter in UTC, both at 12:41 UTC.
        let raw = DOC
            .replace("\"start_time\": \"2025-06-01T12:00:00\"", "\"start_time\": \"2025-06-01T14:00:00+02:00\"")
            .replace("\"last_seen\": \"2025-06-01T12:41:00\"", "\"last_seen\": \"2025-06-01T14:41:00+02:00\"")
            .replace("\"last_seen\": \"2025-06-01T12:30:00\"", "\"last_seen\": \"2025-06-01T12:41:00Z\"");
        let doc: GameDocument = serde_json::from_str(&raw).unwrap();
        let now = Utc
            .with_ymd_and_hms(2025, 6, 1, 12, 45, 0)
            .unwrap()
            .with_timezone(&Local)
            .naive_local();

        let view = MapView::build(&doc, "TR", now).unwrap();
        assert_eq!(view.game.elapsed_minutes, 45);
        assert_eq!(view.game.remaining_minutes, 15);
        for player in &view.players {
            assert_eq!(player.minutes_since_seen, 4, "{}", player.display_name);
            assert_eq!(player.staleness, Staleness::Orange);
        }
    }

    #[test]
    fn test_roleless_player_on_gamemaster_map_only() {
        let mut doc = doc();
        let mut joined = doc.players[1].clone();
        joined.user_id = UserId(4);
        joined.role = Role::Unassigned;
        joined.token = Some("U4".into());
        doc.players.push(joined);

        let gm_view = MapView::build(&doc, "GM", at(12, 45)).unwrap();
        assert_eq!(gm_view.players.len(), 4);
        assert_eq!(gm_view.roster.runners, vec![UserId(2)]);
        assert!(gm_view.roster.unassigned.is_empty());

        let team_view = MapView::build(&doc, "TR", at(12, 45)).unwrap();
        assert!(team_view.players.iter().all(|p| p.user_id != UserId(4)));

        assert_eq!(MapView::build(&doc, "U4", at(12, 45)).unwrap_err().code(), 401);
    }

    #[test]
    fn test_unknown_token_builds_nothing() {
        let err = MapView::build(&doc(), "nope", at(12, 45)).unwrap_err();
        assert_eq!(err.code(), 401);
    }

    #[test]
    fn test_view_json_never_contains_tokens() {
        let view = MapView::build(&doc(), "GM", at(12, 45)).unwrap();
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("\"token\""));
        assert!(!json.contains("\"TR\""));
    }
}
