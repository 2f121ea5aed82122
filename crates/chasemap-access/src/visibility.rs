//! Visibility policy: what each identity may observe.
//!
//! | identity          | players                                   | POIs            |
//! |-------------------|-------------------------------------------|-----------------|
//! | gamemaster        | everyone                                  | all             |
//! | hunter team `T`   | all runners + hunters on `T`              | owned by `T`    |
//! | runner `u`        | only `u`, while `u` is a runner           | none            |
//!
//! Players without a role yet are part of "everyone" and nothing else.
//!
//! Runners are blind to POIs by role, not by team: even a POI whose team
//! happens to equal some runner attribute stays hidden.

use chasemap_model::{GameDocument, Player, Poi};
use tracing::trace;

use crate::Identity;

/// The subset of a snapshot one identity may observe.
///
/// Borrows from the snapshot; entries keep the snapshot's order.
#[derive(Debug, Clone, PartialEq)]
pub struct Visible<'a> {
    pub players: Vec<&'a Player>,
    pub pois: Vec<&'a Poi>,

    /// Whether the gamemaster's own budget may be displayed. Budgets are
    /// never stripped here; this flag travels with the result so the view
    /// layer can decide.
    pub reveal_own_budget: bool,
}

/// Narrows `players` and `pois` to what `identity` may see.
///
/// Order-preserving and idempotent: filtering an already filtered list
/// with the same identity yields the same list. Every returned reference
/// points into the input slices.
pub fn filter<'a>(
    identity: &Identity,
    players: &'a [Player],
    pois: &'a [Poi],
) -> Visible<'a> {
    let (players, pois): (Vec<&Player>, Vec<&Poi>) = match identity {
        Identity::Gamemaster { .. } => (players.iter().collect(), pois.iter().collect()),
        Identity::HunterTeam { team } => (
            players
                .iter()
                .filter(|p| p.is_runner() || p.hunts_for(team))
                .collect(),
            pois.iter().filter(|poi| poi.owned_by(team)).collect(),
        ),
        Identity::Runner { user_id } => (
            players
                .iter()
                .find(|p| p.is_runner() && p.user_id == *user_id)
                .into_iter()
                .collect(),
            Vec::new(),
        ),
    };

    trace!(
        %identity,
        players = players.len(),
        pois = pois.len(),
        "visibility applied"
    );

    Visible {
        players,
        pois,
        reveal_own_budget: identity.reveals_own_budget(),
    }
}

/// [`filter`] against a whole document.
pub fn filter_in<'a>(identity: &Identity, doc: &'a GameDocument) -> Visible<'a> {
    filter(identity, &doc.players, doc.pois())
}
