//! Token → identity resolution.
//!
//! The bot issues three kinds of tokens per game: one for the
//! gamemaster, one per runner, and one per hunter team. They live in two
//! places in the snapshot (on the players, and in `team_tokens`), so
//! resolution is a fixed sequence of scans:
//!
//! ```text
//!   gamemaster players ──no match──→ runner players ──no match──→ team tokens ──no match──→ Unauthorized
//! ```
//!
//! The order is the tie-break. Tokens are random, but if one string ever
//! appears in two places the earlier scan wins, always.

use chasemap_model::{GameDocument, Player, TeamToken};
use tracing::debug;

use crate::{AccessError, Identity};

/// Resolves `token` against one game's roster and team tokens.
///
/// Players and team tokens are scanned in their given order; within a
/// scan the first match wins. Hunters' personal tokens are never
/// consulted: hunters reach the map through their team token only.
///
/// # Errors
/// Returns [`AccessError::Unauthorized`] if the token is empty or matches
/// nothing.
///
/// # Example
///
/// ```rust
/// use chasemap_access::{resolve, AccessError};
///
/// assert_eq!(resolve("", &[], &[]), Err(AccessError::Unauthorized));
/// ```
pub fn resolve(
    token: &str,
    players: &[Player],
    team_tokens: &[TeamToken],
) -> Result<Identity, AccessError> {
    if token.is_empty() {
        debug!("empty token rejected");
        return Err(AccessError::Unauthorized);
    }

    let identity = players
        .iter()
        .find(|p| p.is_gamemaster() && p.has_token(token))
        .map(|p| Identity::Gamemaster { user_id: p.user_id })
        .or_else(|| {
            players
                .iter()
                .find(|p| p.is_runner() && p.has_token(token))
                .map(|p| Identity::Runner { user_id: p.user_id })
        })
        .or_else(|| {
            team_tokens
                .iter()
                .find(|t| t.matches(token))
                .map(|t| Identity::HunterTeam {
                    team: t.team.clone(),
                })
        });

    match identity {
        Some(identity) => {
            debug!(kind = identity.kind(), %identity, "token resolved");
            Ok(identity)
        }
        None => {
            // Never log the token itself.
            debug!(token_len = token.len(), "token matched nothing");
            Err(AccessError::Unauthorized)
        }
    }
}

/// [`resolve`] against a whole document.
pub fn resolve_in(
    doc: &GameDocument,
    token: &str,
) -> Result<Identity, AccessError> {
    resolve(token, &doc.players, &doc.team_tokens)
}

#[cfg(test)]
mod tests {
    use chasemap_model::{Role, TeamId, UserId};
    use chrono::NaiveDate;

    use super::*;

    fn player(id: i64, role: Role, team: Option<&str>, token: Option<&str>) -> Player {
        Player {
            user_id: UserId(id),
            role,
            team: team.map(TeamId::from),
            token: token.map(str::to_string),
            first_name: format!("p{id}"),
            username: None,
            budget: 0,
            last_seen: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            location: None,
        }
    }

    fn team_token(team: &str, token: &str) -> TeamToken {
        TeamToken {
            token: token.to_string(),
            team: TeamId::from(team),
        }
    }

    #[test]
    fn test_gamemaster_token_resolves() {
        let players = vec![
            player(1, Role::Gamemaster, None, Some("GM")),
            player(2, Role::Runner, None, Some("R2")),
        ];
        assert_eq!(
            resolve("GM", &players, &[]),
            Ok(Identity::Gamemaster { user_id: UserId(1) })
        );
    }

    #[test]
    fn test_runner_token_resolves() {
        let players = vec![
            player(1, Role::Gamemaster, None, Some("GM")),
            player(2, Role::Runner, None, Some("R2")),
        ];
        assert_eq!(
            resolve("R2", &players, &[]),
            Ok(Identity::Runner { user_id: UserId(2) })
        );
    }

    #[test]
    fn test_team_token_resolves() {
        let tokens = vec![team_token("Red", "TR"), team_token("Blue", "TB")];
        assert_eq!(
            resolve("TB", &[], &tokens),
            Ok(Identity::HunterTeam {
                team: TeamId::from("Blue")
            })
        );
    }

    #[test]
    fn test_hunter_personal_token_does_not_resolve() {
        let players = vec![player(3, Role::Hunter, Some("Red"), Some("H3"))];
        assert_eq!(resolve("H3", &players, &[]), Err(AccessError::Unauthorized));
    }

    #[test]
    fn test_empty_token_never_resolves() {
        // A player whose token is an empty string must not be reachable
        // with an empty token.
        let players = vec![player(1, Role::Gamemaster, None, Some(""))];
        let tokens = vec![team_token("Red", "")];
        assert_eq!(resolve("", &players, &tokens), Err(AccessError::Unauthorized));
    }

    #[test]
    fn test_unknown_token_is_unauthorized() {
        let players = vec![player(1, Role::Gamemaster, None, Some("GM"))];
        let tokens = vec![team_token("Red", "TR")];
        assert_eq!(resolve("nope", &players, &tokens), Err(AccessError::Unauthorized));
    }

    #[test]
    fn test_token_match_is_case_sensitive() {
        let players = vec![player(2, Role::Runner, None, Some("ABCD1234"))];
        assert_eq!(resolve("abcd1234", &players, &[]), Err(AccessError::Unauthorized));
    }
}
