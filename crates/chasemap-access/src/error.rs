//! Error types for the access layer.

/// Errors produced while resolving a token.
///
/// There is exactly one: the token names nobody. Callers must treat it as
/// terminal and return no game data at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The token is empty, missing, or matches no gamemaster, runner, or
    /// team token in this game.
    #[error("unauthorized: token does not grant access to this game")]
    Unauthorized,
}
