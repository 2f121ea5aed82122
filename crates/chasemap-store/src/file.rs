//! Snapshot files written by the game bot.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chasemap_model::{Codec, GameDocument, GameId, JsonCodec};
use tracing::{debug, warn};

use crate::store::check_id;
use crate::{GameStore, StoreError};

/// File name of a game's snapshot: `ChaseBotGame_{id}.json`.
pub fn snapshot_file_name(game_id: GameId) -> String {
    format!("ChaseBotGame_{}.json", game_id.0)
}

/// Loads snapshots from a directory of exported files.
///
/// The file is re-read on every [`load`](GameStore::load); the exporter
/// overwrites it in place while a game runs.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    codec: JsonCodec,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            codec: JsonCodec,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the snapshot for `game_id`.
    pub fn path_for(&self, game_id: GameId) -> PathBuf {
        self.root.join(snapshot_file_name(game_id))
    }
}

impl GameStore for FileStore {
    async fn load(&self, game_id: GameId) -> Result<GameDocument, StoreError> {
        check_id(game_id)?;
        let path = self.path_for(game_id);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(%game_id, path = %path.display(), "snapshot file missing");
                return Err(StoreError::NotFound(game_id));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        // The exporter truncates before writing; an empty read is "no data yet".
        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!(%game_id, "snapshot file empty");
            return Err(StoreError::NotFound(game_id));
        }

        let doc: GameDocument = self.codec.decode(&bytes).map_err(|e| {
            warn!(%game_id, error = %e, "snapshot failed to decode");
            StoreError::Malformed(game_id, e)
        })?;
        doc.validate().map_err(|e| {
            warn!(%game_id, error = %e, "snapshot failed validation");
            StoreError::Malformed(game_id, e)
        })?;

        debug!(
            %game_id,
            players = doc.players.len(),
            pois = doc.pois().len(),
            "snapshot loaded"
        );
        Ok(doc)
    }
}
