//! Unified error type for Chasemap.

use chasemap_access::AccessError;
use chasemap_model::ModelError;
use chasemap_store::StoreError;

use crate::transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes let `?` lift sub-crate errors, so view
/// building and the connection handler deal in this one type.
#[derive(Debug, thiserror::Error)]
pub enum ChasemapError {
    /// The snapshot could not be decoded or is structurally invalid.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The token resolved to nobody.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The snapshot could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The WebSocket failed underneath us.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The client broke the message protocol.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ChasemapError {
    /// The error code sent to the client in an `Error` message.
    ///
    /// | code | meaning                                      |
    /// |------|----------------------------------------------|
    /// | 400  | bad request (bad message, invalid game id)   |
    /// | 401  | token resolved to nobody                     |
    /// | 404  | no snapshot for the game                     |
    /// | 500  | snapshot unreadable or malformed             |
    pub fn code(&self) -> u16 {
        match self {
            Self::Protocol(_) | Self::Store(StoreError::InvalidGameId(_)) => 400,
            Self::Access(AccessError::Unauthorized) => 401,
            Self::Store(StoreError::NotFound(_)) => 404,
            Self::Model(_)
            | Self::Store(StoreError::Io(_) | StoreError::Malformed(..))
            | Self::Transport(_) => 500,
        }
    }

    /// Whether an established watch must end on this error.
    ///
    /// A bad message is answered and forgotten. A missing, unreadable or
    /// malformed snapshot is skipped until the exporter's next write. A
    /// rejected token, a bad game id, or a broken socket ends the watch.
    /// Before the first view is sent every error is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::Protocol(_)
                | Self::Store(StoreError::NotFound(_) | StoreError::Malformed(..) | StoreError::Io(_))
        )
    }

    /// Text safe to show the client. Never contains a token.
    pub fn client_message(&self) -> String {
        match self {
            Self::Access(_) => "unauthorized".to_string(),
            Self::Store(StoreError::NotFound(id)) => format!("game {} not found", id.0),
            Self::Store(StoreError::InvalidGameId(id)) => format!("invalid game id {id}"),
            Self::Store(StoreError::Malformed(id, _)) => {
                format!("snapshot for game {} is unreadable", id.0)
            }
            Self::Protocol(reason) => reason.clone(),
            Self::Model(_) | Self::Store(StoreError::Io(_)) | Self::Transport(_) => {
                "internal error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chasemap_model::GameId;

    use super::*;

    #[test]
    fn test_from_access_error() {
        let err: ChasemapError = AccessError::Unauthorized.into();
        assert!(matches!(err, ChasemapError::Access(_)));
        assert_eq!(err.code(), 401);
        assert!(err.is_terminal());
    }

    #[test]
    fn test_from_store_error() {
        let err: ChasemapError = StoreError::NotFound(GameId(4)).into();
        assert_eq!(err.code(), 404);
        assert_eq!(err.client_message(), "game 4 not found");

        let err: ChasemapError = StoreError::InvalidGameId(0).into();
        assert_eq!(err.code(), 400);
        assert!(err.is_terminal());
    }

    #[test]
    fn test_snapshot_gaps_do_not_end_a_watch() {
        let missing: ChasemapError = StoreError::NotFound(GameId(4)).into();
        assert!(!missing.is_terminal());

        let io: ChasemapError = StoreError::Io(std::io::Error::other("busy")).into();
        assert!(!io.is_terminal());

        let malformed: ChasemapError =
            StoreError::Malformed(GameId(4), ModelError::Invalid("half written".into())).into();
        assert_eq!(malformed.code(), 500);
        assert!(!malformed.is_terminal());
    }

    #[test]
    fn test_from_model_error() {
        let err: ChasemapError = ModelError::Invalid("duplicate player U-1".into()).into();
        assert_eq!(err.code(), 500);
        assert_eq!(err.client_message(), "internal error");
    }

    #[test]
    fn test_protocol_error_is_recoverable() {
        let err = ChasemapError::Protocol("expected Watch".into());
        assert_eq!(err.code(), 400);
        assert!(!err.is_terminal());
    }
}
