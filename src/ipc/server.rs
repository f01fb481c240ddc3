//! Unix domain socket server for IPC
//!
//! Provides request-response communication and pushes every assistant event
//! to subscribed clients. A subscribed client also counts as an attached
//! recognizer front-end until it disconnects.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::unix::OwnedReadHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::events::{AssistantEvent, Feedback};
use crate::interpreter::{self, Command};
use crate::recognizer::{FrontendGuard, FrontendPresence};
use crate::session::{ready_greeting, ControllerInput, SessionState};

use super::protocol::{DaemonStatus, Notification, Request, Response, MAX_FRAME_LEN};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    state: Arc<RwLock<ServerState>>,
    shutdown_tx: broadcast::Sender<()>,
    links: Links,
}

/// Shared server state
struct ServerState {
    status: DaemonStatus,
    start_time: std::time::Instant,
}

/// What client handlers talk to
#[derive(Clone)]
struct Links {
    input_tx: mpsc::UnboundedSender<ControllerInput>,
    feedback: Feedback,
    presence: FrontendPresence,
}

impl Server {
    /// Create a new IPC server
    pub fn new(
        socket_path: &Path,
        locale: &str,
        input_tx: mpsc::UnboundedSender<ControllerInput>,
        feedback: Feedback,
        presence: FrontendPresence,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Owner-only socket
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let state = Arc::new(RwLock::new(ServerState {
            status: DaemonStatus::new(locale),
            start_time: std::time::Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            state,
            shutdown_tx,
            links: Links {
                input_tx,
                feedback,
                presence,
            },
        })
    }

    /// Update the session state reported by `get_status`
    pub async fn set_state(&self, session_state: SessionState) {
        let mut state = self.state.write().await;
        let old_state = state.status.state;
        state.status.state = session_state;

        if old_state != session_state {
            debug!(from = %old_state, to = %session_state, "IPC server: state updated");
        }
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let state = Arc::clone(&self.state);
                    let links = self.links.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state, links) => {
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
    async fn handle_client(
        stream: UnixStream,
        state: Arc<RwLock<ServerState>>,
        links: Links,
    ) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let (request_tx, mut request_rx) = mpsc::channel(16);
        let reader_task = tokio::spawn(Self::read_requests(reader, request_tx));

        let mut events: Option<broadcast::Receiver<AssistantEvent>> = None;
        let mut _frontend: Option<FrontendGuard> = None;

        let result = loop {
            tokio::select! {
                request = request_rx.recv() => {
                    let mut greeting = Vec::new();
                    let response = match request {
                        Some(Ok(request)) => {
                            debug!(?request, "received request");
                            let (response, subscribe) =
                                Self::process_request(request, &state, &links).await;
                            if subscribe && events.is_none() {
                                events = Some(links.feedback.subscribe());
                                _frontend = Some(links.presence.attach());
                                let snapshot = state.read().await;
                                greeting = ready_greeting(
                                    &snapshot.status.locale,
                                    snapshot.status.state != SessionState::Idle,
                                );
                                debug!("client subscribed to notifications");
                            }
                            response
                        }
                        Some(Err(message)) => Response::error("bad_request", message),
                        None => {
                            debug!("client disconnected");
                            break Ok(());
                        }
                    };
                    if let Err(e) = Self::send_message(&mut writer, &response).await {
                        break Err(e);
                    }
                    // The greeting goes to the new subscriber only
                    if let Err(e) = Self::send_events(&mut writer, greeting).await {
                        break Err(e);
                    }
                }

                event = Self::next_event(&mut events) => match event {
                    Ok(event) => {
                        let notification = Notification::Event { event };
                        if let Err(e) = Self::send_message(&mut writer, &notification).await {
                            break Err(e);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "subscriber lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        events = None;
                    }
                },
            }
        };

        reader_task.abort();
        result
    }

    /// Read length-prefixed requests until EOF or an oversized frame.
    /// Undecodable bodies are reported and reading continues.
    async fn read_requests(
        mut reader: OwnedReadHalf,
        request_tx: mpsc::Sender<Result<Request, String>>,
    ) {
        loop {
            let body = match read_frame(&mut reader).await {
                Ok(Some(body)) => body,
                Ok(None) => return,
                Err(e) => {
                    warn!(?e, "failed to read request, disconnecting");
                    return;
                }
            };

            let request = serde_json::from_slice::<Request>(&body)
                .map_err(|e| format!("failed to parse request: {e}"));
            if request_tx.send(request).await.is_err() {
                return;
            }
        }
    }

    async fn next_event(
        events: &mut Option<broadcast::Receiver<AssistantEvent>>,
    ) -> Result<AssistantEvent, broadcast::error::RecvError> {
        match events {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    async fn send_events<W>(stream: &mut W, events: Vec<AssistantEvent>) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        for event in events {
            Self::send_message(stream, &Notification::Event { event }).await?;
        }
        Ok(())
    }

    /// Send a length-prefixed JSON message
    async fn send_message<W, T>(stream: &mut W, msg: &T) -> Result<()>
    where
        W: AsyncWrite + Unpin,
        T: serde::Serialize,
    {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        stream.write_all(&msg_len).await?;
        stream.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(
        request: Request,
        state: &Arc<RwLock<ServerState>>,
        links: &Links,
    ) -> (Response, bool) {
        let input = match request {
            Request::Ping => return (Response::Pong, false),

            Request::GetStatus => {
                let mut state = state.write().await;
                state.status.uptime_secs = state.start_time.elapsed().as_secs();
                state.status.frontend_attached = links.presence.is_attached();
                return (Response::Status(state.status.clone()), false);
            }

            Request::Subscribe => return (Response::Subscribed, true),

            Request::StartListening => ControllerInput::Start,
            Request::StopListening => ControllerInput::Stop,
            Request::RetryListening => ControllerInput::Retry,

            Request::SetLocale { locale } => {
                let Some(info) = interpreter::locale(&locale) else {
                    return (
                        Response::error("unsupported_locale", format!("locale {locale} is not supported")),
                        false,
                    );
                };
                state.write().await.status.locale = info.code.to_string();
                ControllerInput::SetLocale(info.code.to_string())
            }

            Request::SetOnline { online } => {
                state.write().await.status.online = online;
                ControllerInput::Connectivity(online)
            }

            Request::Lifecycle { session, event } => ControllerInput::Lifecycle { session, event },

            Request::Command { text } => {
                if text.trim().is_empty() {
                    return (Response::error("empty_command", "command text is empty"), false);
                }
                ControllerInput::Text(text)
            }

            Request::Search { query } => {
                if query.trim().is_empty() {
                    return (Response::error("empty_query", "search query is empty"), false);
                }
                ControllerInput::Dispatch(Command::search(&query))
            }

            Request::RemoveItem { id } => ControllerInput::RemoveItem(id),
        };

        match links.input_tx.send(input) {
            Ok(()) => (Response::Accepted, false),
            Err(_) => (
                Response::error("unavailable", "session controller is not running"),
                false,
            ),
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

/// Read one frame body; `None` on a clean EOF before the length prefix
async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        anyhow::bail!("message too large: {len} bytes");
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}
