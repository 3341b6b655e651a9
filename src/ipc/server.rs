//! Unix domain socket server for IPC
//!
//! Every connection gets its own session (and engine), so clients never see
//! each other's text or stabilization state.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::classifier::RejectionClassifier;
use crate::config::EngineConfig;
use crate::events::TextEvent;
use crate::state::{Session, StabilizationEngine};

use super::protocol::{read_frame, write_message, DaemonStatus, Request, Response};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    shared: Arc<Shared>,
    shutdown_tx: broadcast::Sender<()>,
}

/// What every client handler needs
struct Shared {
    state: RwLock<ServerState>,
    engine_config: EngineConfig,
    classifier: Option<Arc<RejectionClassifier>>,
    event_tx: broadcast::Sender<TextEvent>,
    next_session: Arc<AtomicU64>,
    active_sessions: AtomicUsize,
}

/// Shared server state
struct ServerState {
    status: DaemonStatus,
    start_time: std::time::Instant,
}

impl Server {
    /// Create a new IPC server and bind its socket
    pub fn new(
        socket_path: &Path,
        engine_config: EngineConfig,
        classifier: Option<Arc<RejectionClassifier>>,
        event_tx: broadcast::Sender<TextEvent>,
        next_session: Arc<AtomicU64>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path)
            .context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let status = DaemonStatus {
            classifier_loaded: classifier.is_some(),
            ..DaemonStatus::default()
        };

        let shared = Arc::new(Shared {
            state: RwLock::new(ServerState {
                status,
                start_time: std::time::Instant::now(),
            }),
            engine_config,
            classifier,
            event_tx,
            next_session,
            active_sessions: AtomicUsize::new(0),
        });

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            shared,
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref()
            .context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let shared = Arc::clone(&self.shared);
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, shared) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(mut stream: UnixStream, shared: Arc<Shared>) -> Result<()> {
        let id = shared.next_session.fetch_add(1, Ordering::Relaxed);
        let engine = StabilizationEngine::new(&shared.engine_config, shared.classifier.clone());
        let mut session = Session::new(id, engine, shared.event_tx.clone());
        let _guard = SessionGuard::open(&shared);
        debug!(session = id, "client connected");

        loop {
            let body = match read_frame(&mut stream).await? {
                Some(body) => body,
                None => {
                    debug!(session = id, "client disconnected");
                    return Ok(());
                }
            };

            let response = match serde_json::from_slice::<Request>(&body) {
                Ok(request) => {
                    debug!(session = id, ?request, "received request");
                    Self::process_request(request, &mut session, &shared).await
                }
                Err(e) => {
                    warn!(session = id, error = %e, "unparseable request");
                    Response::error("invalid_request", e.to_string())
                }
            };

            write_message(&mut stream, &response).await?;
        }
    }

    /// Process a request against the client's session
    async fn process_request(request: Request, session: &mut Session, shared: &Shared) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::Ingest { observation, hand_area } => {
                match session.ingest(&observation, hand_area) {
                    Ok(outcome) => Response::Ingested(outcome),
                    Err(e) => {
                        debug!(session = session.id(), error = %e, "ingest failed");
                        Response::error(e.code(), e.to_string())
                    }
                }
            }

            Request::Reset => Response::Text { text: session.reset() },

            Request::GetText => Response::Text { text: session.text().to_owned() },

            Request::GetStatus => {
                let mut state = shared.state.write().await;
                state.status.uptime_secs = state.start_time.elapsed().as_secs();
                state.status.active_sessions = shared.active_sessions.load(Ordering::Relaxed);
                Response::Status(state.status.clone())
            }
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

/// Keeps the active-session count in step with live connections
struct SessionGuard {
    shared: Arc<Shared>,
}

impl SessionGuard {
    fn open(shared: &Arc<Shared>) -> Self {
        shared.active_sessions.fetch_add(1, Ordering::Relaxed);
        Self {
            shared: Arc::clone(shared),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.shared.active_sessions.fetch_sub(1, Ordering::Relaxed);
    }
}
