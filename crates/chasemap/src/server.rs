//! `ChasemapServer` builder and accept loop.

use std::sync::Arc;
use std::time::Duration;

use chasemap_clock::RefreshConfig;
use chasemap_model::JsonCodec;
use chasemap_store::{FileStore, GameStore};

use crate::config::ServerConfig;
use crate::handler::handle_connection;
use crate::transport::{WsConnection, WsListener};
use crate::ChasemapError;

/// Shared state handed to every connection task.
pub(crate) struct ServerState<S: GameStore> {
    pub(crate) store: S,
    pub(crate) codec: JsonCodec,
    pub(crate) config: ServerConfig,
}

/// Builder for a live map server.
///
/// # Example
///
/// ```rust,no_run
/// use chasemap::prelude::*;
///
/// # async fn run() -> Result<(), ChasemapError> {
/// let server = ChasemapServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(FileStore::new("/var/lib/chasebot"))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ChasemapServerBuilder {
    config: ServerConfig,
}

impl ChasemapServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Starts from a complete configuration, e.g. [`ServerConfig::from_env`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn refresh(mut self, refresh: RefreshConfig) -> Self {
        self.config.refresh = refresh.validated();
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Binds the listener and serves snapshots from `store`.
    pub async fn build<S: GameStore>(self, store: S) -> Result<ChasemapServer<S>, ChasemapError> {
        let listener = WsListener::bind(&self.config.bind_addr).await?;
        let state = Arc::new(ServerState {
            store,
            codec: JsonCodec,
            config: self.config,
        });
        Ok(ChasemapServer { listener, state })
    }

    /// Binds the listener and serves snapshots from the configured
    /// `data_dir`.
    pub async fn build_with_files(self) -> Result<ChasemapServer<FileStore>, ChasemapError> {
        let store = FileStore::new(self.config.data_dir.clone());
        self.build(store).await
    }
}

impl Default for ChasemapServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound live map server. Call [`run`](Self::run) to start serving.
pub struct ChasemapServer<S: GameStore> {
    listener: WsListener,
    state: Arc<ServerState<S>>,
}

impl<S: GameStore> ChasemapServer<S> {
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Accepts connections until the process ends. Each connection is
    /// upgraded and served on its own task.
    pub async fn run(self) -> Result<(), ChasemapError> {
        tracing::info!(
            data_dir = %self.state.config.data_dir.display(),
            refresh_s = self.state.config.refresh.period.as_secs(),
            "chasemap server running"
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let conn = match WsConnection::upgrade(stream, addr).await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%addr, error = %e, "upgrade failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(%addr, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
