//! The loading hook.

use chasemap_model::{GameDocument, GameId};

use crate::StoreError;

/// Produces the current snapshot of a game.
///
/// Called once per view build, so every refresh sees the latest export.
/// Implementations must reject ids `<= 0` with
/// [`StoreError::InvalidGameId`] before touching any backing storage.
///
/// # Example
///
/// ```rust
/// use chasemap_model::{GameDocument, GameId};
/// use chasemap_store::{GameStore, StoreError};
///
/// /// A store that has no games at all.
/// struct EmptyStore;
///
/// impl GameStore for EmptyStore {
///     async fn load(&self, game_id: GameId) -> Result<GameDocument, StoreError> {
///         if game_id.0 <= 0 {
///             return Err(StoreError::InvalidGameId(game_id.0));
///         }
///         Err(StoreError::NotFound(game_id))
///     }
/// }
/// ```
pub trait GameStore: Send + Sync + 'static {
    fn load(
        &self,
        game_id: GameId,
    ) -> impl std::future::Future<Output = Result<GameDocument, StoreError>> + Send;
}

/// Shared check for the id guard every store applies first.
pub(crate) fn check_id(game_id: GameId) -> Result<(), StoreError> {
    if game_id.0 <= 0 {
        Err(StoreError::InvalidGameId(game_id.0))
    } else {
        Ok(())
    }
}

impl<T: GameStore> GameStore for std::sync::Arc<T> {
    fn load(
        &self,
        game_id: GameId,
    ) -> impl std::future::Future<Output = Result<GameDocument, StoreError>> + Send {
        (**self).load(game_id)
    }
}
