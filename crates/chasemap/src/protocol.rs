//! Messages exchanged over a live map connection.
//!
//! JSON text frames, internally tagged by `type`:
//!
//! ```text
//! client                                   server
//!   │ {"type":"watch","game_id":7,"token":"…"} │
//!   │ ───────────────────────────────────────→ │
//!   │ ←─────────────────── {"type":"view",…}   │   immediately
//!   │ ←─────────────────── {"type":"view",…}   │   every refresh period
//!   │ {"type":"refresh"}                       │
//!   │ ───────────────────────────────────────→ │
//!   │ ←─────────────────── {"type":"view",…}   │
//!   │ {"type":"unwatch"}                       │
//!   │ ───────────────────────────────────────→ │   connection closes
//! ```

use chasemap_model::GameId;
use serde::{Deserialize, Serialize};

use crate::view::MapView;

/// Client → server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to a game's map. Must be the first message.
    Watch {
        game_id: GameId,
        /// A missing token is treated like an empty one: unauthorized.
        #[serde(default)]
        token: Option<String>,
    },

    /// Rebuild and resend the view now.
    Refresh,

    /// End the subscription and close.
    Unwatch,
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    View { view: Box<MapView> },
    Error { code: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_decodes() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"watch","game_id":7,"token":"ABC"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Watch {
                game_id: GameId(7),
                token: Some("ABC".into())
            }
        );
    }

    #[test]
    fn test_watch_without_token_decodes() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"watch","game_id":7}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Watch {
                game_id: GameId(7),
                token: None
            }
        );
    }

    #[test]
    fn test_unit_messages_decode() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"refresh"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Refresh);
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"unwatch"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Unwatch);
    }

    #[test]
    fn test_error_encodes_with_tag() {
        let json = serde_json::to_value(ServerMessage::Error {
            code: 401,
            message: "unauthorized".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], 401);
    }
}
