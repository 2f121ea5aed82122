//! Per-connection handler: watch, push views, refresh.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `Watch` within the handshake timeout
//!   2. Load the snapshot, build the view, send it
//!   3. Loop: rebuild and resend on every refresh tick or `Refresh`,
//!      until `Unwatch`, a close frame, or a terminal error
//!
//! Any failure in steps 1 and 2 closes the connection. Once a view has
//! been sent, [`ChasemapError::is_terminal`] decides: an unreadable or
//! missing snapshot is skipped and the client keeps its last view.

use std::sync::Arc;

use chasemap_clock::RefreshScheduler;
use chasemap_model::{Codec, GameId, Timestamp};
use chasemap_store::GameStore;
use tracing::{debug, info, warn};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::server::ServerState;
use crate::transport::WsConnection;
use crate::view::MapView;
use crate::ChasemapError;

/// What a connection is subscribed to.
struct Watch {
    game_id: GameId,
    token: String,
}

/// Handles a single connection from upgrade to close.
pub(crate) async fn handle_connection<S: GameStore>(
    conn: WsConnection,
    state: Arc<ServerState<S>>,
) -> Result<(), ChasemapError> {
    let conn_id = conn.id();
    debug!(%conn_id, "handling new connection");

    let result = serve(&conn, &state).await;
    conn.close().await;

    match &result {
        Ok(()) => debug!(%conn_id, "connection closed"),
        Err(e) => debug!(%conn_id, code = e.code(), error = %e, "connection closed with error"),
    }
    result
}

async fn serve<S: GameStore>(
    conn: &WsConnection,
    state: &ServerState<S>,
) -> Result<(), ChasemapError> {
    let conn_id = conn.id();

    // --- Step 1: Watch ---
    let watch = await_watch(conn, state).await?;
    let game_id = watch.game_id;

    // --- Step 2: First view ---
    push_view(conn, state, &watch, Stage::First).await?;
    info!(%conn_id, %game_id, "watch started");

    // --- Step 3: Refresh loop ---
    let mut scheduler = RefreshScheduler::new(state.config.refresh);

    loop {
        tokio::select! {
            incoming = conn.recv() => {
                let data = match incoming {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        info!(%conn_id, %game_id, "client closed connection");
                        return Ok(());
                    }
                    Err(e) => {
                        debug!(%conn_id, error = %e, "recv error");
                        return Err(e.into());
                    }
                };

                match state.codec.decode::<ClientMessage>(&data) {
                    Ok(ClientMessage::Refresh) => {
                        debug!(%conn_id, %game_id, "refresh requested");
                        push_view(conn, state, &watch, Stage::Refresh).await?;
                        scheduler.reset();
                    }
                    Ok(ClientMessage::Unwatch) => {
                        info!(%conn_id, %game_id, "watch ended by client");
                        return Ok(());
                    }
                    Ok(ClientMessage::Watch { .. }) => {
                        reject(conn, state, ChasemapError::Protocol("already watching".into())).await?;
                    }
                    Err(e) => {
                        debug!(%conn_id, error = %e, "undecodable client message");
                        reject(conn, state, ChasemapError::Protocol("invalid message".into())).await?;
                    }
                }
            }
            tick = scheduler.wait_for_refresh() => {
                debug!(%conn_id, %game_id, refresh = tick.refresh, "periodic refresh");
                push_view(conn, state, &watch, Stage::Refresh).await?;
            }
        }
    }
}

/// Waits for the opening `Watch`.
///
/// Anything else (a timeout, garbage, another message type) ends the
/// connection; a client that sent something gets a 400 first.
async fn await_watch<S: GameStore>(
    conn: &WsConnection,
    state: &ServerState<S>,
) -> Result<Watch, ChasemapError> {
    let data = match tokio::time::timeout(state.config.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ChasemapError::Protocol("connection closed before watch".into()));
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err(ChasemapError::Protocol("watch timed out".into())),
    };

    match state.codec.decode::<ClientMessage>(&data) {
        Ok(ClientMessage::Watch { game_id, token }) => Ok(Watch {
            game_id,
            token: token.unwrap_or_default(),
        }),
        Ok(_) => {
            let err = ChasemapError::Protocol("first message must be watch".into());
            send_error(conn, state, &err).await?;
            Err(err)
        }
        Err(e) => {
            debug!(conn_id = %conn.id(), error = %e, "undecodable first message");
            let err = ChasemapError::Protocol("expected watch".into());
            send_error(conn, state, &err).await?;
            Err(err)
        }
    }
}

/// Whether the watch already has a view on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    First,
    Refresh,
}

/// Loads the current snapshot and sends the viewer's map.
///
/// On the first view every failure is reported and returned. On a
/// refresh, failures the watch survives are only logged: nothing is sent
/// and the client keeps the view it has.
async fn push_view<S: GameStore>(
    conn: &WsConnection,
    state: &ServerState<S>,
    watch: &Watch,
    stage: Stage,
) -> Result<(), ChasemapError> {
    match load_view(state, watch).await {
        Ok(view) => send(conn, state, &ServerMessage::View { view: Box::new(view) }).await,
        Err(e) if stage == Stage::Refresh && !e.is_terminal() => {
            warn!(
                conn_id = %conn.id(),
                game_id = %watch.game_id,
                error = %e,
                "refresh skipped, keeping last view"
            );
            Ok(())
        }
        Err(e) => {
            if matches!(e, ChasemapError::Access(_)) {
                warn!(conn_id = %conn.id(), game_id = %watch.game_id, "token rejected");
            } else {
                warn!(conn_id = %conn.id(), game_id = %watch.game_id, error = %e, "view failed");
            }
            send_error(conn, state, &e).await?;
            Err(e)
        }
    }
}

async fn load_view<S: GameStore>(
    state: &ServerState<S>,
    watch: &Watch,
) -> Result<MapView, ChasemapError> {
    let doc = state.store.load(watch.game_id).await?;
    MapView::build(&doc, &watch.token, now())
}

/// Reports an error on an established watch, closing only if it is
/// terminal.
async fn reject<S: GameStore>(
    conn: &WsConnection,
    state: &ServerState<S>,
    err: ChasemapError,
) -> Result<(), ChasemapError> {
    send_error(conn, state, &err).await?;
    if err.is_terminal() {
        Err(err)
    } else {
        Ok(())
    }
}

/// Sends an `Error` message carrying `err`'s code and client text.
async fn send_error<S: GameStore>(
    conn: &WsConnection,
    state: &ServerState<S>,
    err: &ChasemapError,
) -> Result<(), ChasemapError> {
    if matches!(err, ChasemapError::Transport(_)) {
        return Ok(());
    }
    send(
        conn,
        state,
        &ServerMessage::Error {
            code: err.code(),
            message: err.client_message(),
        },
    )
    .await
}

async fn send<S: GameStore>(
    conn: &WsConnection,
    state: &ServerState<S>,
    msg: &ServerMessage,
) -> Result<(), ChasemapError> {
    let bytes = state.codec.encode(msg)?;
    conn.send_text(bytes).await?;
    Ok(())
}

/// The exporter writes local wall-clock time, so "now" is local too.
fn now() -> Timestamp {
    chrono::Local::now().naive_local()
}
