//! In-memory snapshots.

use std::collections::HashMap;

use chasemap_model::{GameDocument, GameId};
use tokio::sync::RwLock;

use crate::store::check_id;
use crate::{GameStore, StoreError};

/// A [`GameStore`] backed by a map of documents.
///
/// Documents can be replaced while subscribers are watching, which makes
/// it the store of choice for exercising live refresh in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<GameId, GameDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the snapshot for the document's own game id.
    pub async fn put(&self, doc: GameDocument) {
        self.games.write().await.insert(doc.game.id, doc);
    }

    /// Removes a game. Returns the previous snapshot, if any.
    pub async fn remove(&self, game_id: GameId) -> Option<GameDocument> {
        self.games.write().await.remove(&game_id)
    }

    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.games.read().await.is_empty()
    }
}

impl FromIterator<GameDocument> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = GameDocument>>(iter: I) -> Self {
        Self {
            games: RwLock::new(iter.into_iter().map(|d| (d.game.id, d)).collect()),
        }
    }
}

impl GameStore for MemoryStore {
    async fn load(&self, game_id: GameId) -> Result<GameDocument, StoreError> {
        check_id(game_id)?;
        self.games
            .read()
            .await
            .get(&game_id)
            .cloned()
            .ok_or(StoreError::NotFound(game_id))
    }
}
