//! Reconnecting session channel.
//!
//! One driver task per connection lifetime. The driver owns the socket;
//! the channel handle talks to it through a bounded outbound queue and a
//! cancellation token. An epoch counter bumped on every `connect` /
//! `disconnect` keeps a superseded driver from touching shared state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::messages::{ClientCommand, EventKind, ServerEvent, parse_frame};
use crate::registry::{Handler, HandlerId, HandlerRegistry};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound queue capacity per connection.
const OUTBOUND_CAPACITY: usize = 64;

/// Connection lifecycle states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    /// No connection and none pending.
    Disconnected,
    /// First connection attempt in progress.
    Connecting,
    /// Connected; commands flow.
    Open,
    /// Connection lost; a retry is pending.
    Reconnecting,
    /// Reconnect attempts exhausted. Requires a fresh `connect`.
    Closed,
}

/// How this client identifies itself to the session endpoint.
#[derive(Clone, Debug)]
pub enum SessionIdentity {
    /// The authenticated quiz host.
    Host {
        /// Access token passed in the `token` query param.
        token: String,
    },
    /// An anonymous participant.
    Participant {
        /// Display name passed in the `name` query param.
        name: String,
    },
}

/// Channel tuning knobs.
#[derive(Clone, Debug)]
pub struct RealtimeConfig {
    /// WebSocket base URL (no trailing slash).
    pub ws_base_url: String,
    /// Delay between reconnect attempts, in milliseconds.
    pub reconnect_delay_ms: u64,
    /// Reconnect attempts before the channel closes for good.
    pub max_reconnect_attempts: u32,
}

impl RealtimeConfig {
    /// Config with the standard reconnect policy.
    pub fn new(ws_base_url: impl Into<String>) -> Self {
        Self {
            ws_base_url: ws_base_url.into(),
            reconnect_delay_ms: 3000,
            max_reconnect_attempts: 5,
        }
    }
}

/// State shared between the channel handle and its driver task.
struct Shared {
    state: Mutex<ChannelState>,
    registry: HandlerRegistry,
    outbound: Mutex<Option<mpsc::Sender<Message>>>,
    attempts: AtomicU32,
    epoch: AtomicU64,
}

/// A session connection that survives transient drops.
///
/// Handler registrations live on the channel, not the socket, so they keep
/// firing across reconnects. `connect` must be called from within a tokio
/// runtime.
pub struct RealtimeChannel {
    config: RealtimeConfig,
    shared: Arc<Shared>,
    cancel: Mutex<Option<CancellationToken>>,
}

impl RealtimeChannel {
    /// Create a disconnected channel.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(ChannelState::Disconnected),
                registry: HandlerRegistry::new(),
                outbound: Mutex::new(None),
                attempts: AtomicU32::new(0),
                epoch: AtomicU64::new(0),
            }),
            cancel: Mutex::new(None),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChannelState {
        *self.shared.state.lock()
    }

    /// The channel's configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Connect to a session by join code.
    ///
    /// A no-op while a connection is active or pending. From
    /// `Disconnected` or `Closed` this starts a fresh driver with a reset
    /// attempt counter.
    pub fn connect(&self, code: &str, identity: &SessionIdentity) {
        {
            let state = self.shared.state.lock();
            if matches!(
                *state,
                ChannelState::Connecting | ChannelState::Open | ChannelState::Reconnecting
            ) {
                debug!(state = ?*state, "connect ignored, channel already active");
                return;
            }
        }

        let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.attempts.store(0, Ordering::SeqCst);
        *self.shared.state.lock() = ChannelState::Connecting;

        let cancel = CancellationToken::new();
        if let Some(old) = self.cancel.lock().replace(cancel.clone()) {
            old.cancel();
        }

        info!(code, "connecting session channel");
        let url = session_url(&self.config.ws_base_url, code, identity);
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        drop(tokio::spawn(run_loop(shared, config, url, epoch, cancel)));
    }

    /// Tear down the connection and all handler registrations.
    ///
    /// Idempotent. Cancels a pending reconnect as well as a live socket.
    pub fn disconnect(&self) {
        if let Some(cancel) = self.cancel.lock().take() {
            cancel.cancel();
        }
        let _ = self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        *self.shared.state.lock() = ChannelState::Disconnected;
        self.shared.attempts.store(0, Ordering::SeqCst);
        *self.shared.outbound.lock() = None;
        self.shared.registry.clear();
    }

    /// Send a command if the channel is open.
    ///
    /// Returns `false` without queueing when the channel is not open or
    /// the outbound queue is full. Commands are never buffered across a
    /// disconnect.
    pub fn send(&self, command: &ClientCommand) -> bool {
        if self.state() != ChannelState::Open {
            warn!(state = ?self.state(), "dropping command, channel not open");
            return false;
        }
        let json = match serde_json::to_string(command) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize command: {e}");
                return false;
            }
        };
        let guard = self.shared.outbound.lock();
        match guard.as_ref() {
            Some(tx) => {
                if tx.try_send(Message::text(json)).is_ok() {
                    true
                } else {
                    warn!("outbound queue unavailable, dropping command");
                    false
                }
            }
            None => false,
        }
    }

    /// Register a handler. Registrations survive reconnects.
    pub fn on(&self, kind: EventKind, handler: Handler) -> HandlerId {
        self.shared.registry.on(kind, handler)
    }

    /// Remove one handler registration.
    pub fn off(&self, kind: EventKind, id: HandlerId) {
        self.shared.registry.off(kind, id);
    }

    // ─── Convenience commands ────────────────────────────────────────────

    /// Submit an answer to the active question.
    pub fn submit_answer(&self, question_id: &str, answer: serde_json::Value) -> bool {
        self.send(&ClientCommand::SubmitAnswer {
            question_id: question_id.to_string(),
            answer,
        })
    }

    /// Advance to the next question (host).
    pub fn next_question(&self) -> bool {
        self.send(&ClientCommand::NextQuestion)
    }

    /// End the session (host).
    pub fn end_session(&self) -> bool {
        self.send(&ClientCommand::EndSession)
    }

    /// Score an open-ended answer (host).
    pub fn score_answer(&self, participant_id: &str, question_id: &str, score: i64) -> bool {
        self.send(&ClientCommand::ScoreAnswer {
            participant_id: participant_id.to_string(),
            question_id: question_id.to_string(),
            score,
        })
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.lock().take() {
            cancel.cancel();
        }
    }
}

/// Build the session endpoint URL for the given identity.
fn session_url(base: &str, code: &str, identity: &SessionIdentity) -> String {
    match identity {
        SessionIdentity::Host { token } => {
            format!("{base}/ws/session/{code}?token={}", urlencoding::encode(token))
        }
        SessionIdentity::Participant { name } => {
            format!("{base}/ws/session/{code}?name={}", urlencoding::encode(name))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Driver task
// ─────────────────────────────────────────────────────────────────────────────

/// Connect, pump, and reconnect until cancelled, superseded, or exhausted.
async fn run_loop(
    shared: Arc<Shared>,
    config: RealtimeConfig,
    url: String,
    epoch: u64,
    cancel: CancellationToken,
) {
    loop {
        let connected = tokio::select! {
            () = cancel.cancelled() => return,
            result = connect_async(&url) => result,
        };

        match connected {
            Ok((ws, _)) => {
                if shared.epoch.load(Ordering::SeqCst) != epoch {
                    return;
                }
                shared.attempts.store(0, Ordering::SeqCst);
                *shared.state.lock() = ChannelState::Open;
                info!("session channel open");

                let (tx, rx) = mpsc::channel::<Message>(OUTBOUND_CAPACITY);
                *shared.outbound.lock() = Some(tx);

                drive_connection(&shared, ws, rx, &cancel).await;

                if shared.epoch.load(Ordering::SeqCst) != epoch {
                    return;
                }
                *shared.outbound.lock() = None;
                if cancel.is_cancelled() {
                    return;
                }
                warn!("session connection lost");
            }
            Err(e) => {
                if shared.epoch.load(Ordering::SeqCst) != epoch {
                    return;
                }
                warn!("session connect failed: {e}");
            }
        }

        let attempts = shared.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempts > config.max_reconnect_attempts {
            *shared.state.lock() = ChannelState::Closed;
            info!(attempts, "reconnect attempts exhausted, closing channel");
            shared.registry.dispatch(&ServerEvent::ConnectionLost);
            return;
        }

        *shared.state.lock() = ChannelState::Reconnecting;
        debug!(
            attempt = attempts,
            delay_ms = config.reconnect_delay_ms,
            "scheduling reconnect"
        );
        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(Duration::from_millis(config.reconnect_delay_ms)) => {}
        }
        if shared.epoch.load(Ordering::SeqCst) != epoch {
            return;
        }
    }
}

/// Pump one live socket until it drops or the driver is cancelled.
async fn drive_connection(
    shared: &Arc<Shared>,
    ws: WsStream,
    mut outbound: mpsc::Receiver<Message>,
    cancel: &CancellationToken,
) {
    let (mut sink, mut stream) = ws.split();
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                return;
            }
            command = outbound.recv() => {
                let Some(message) = command else { return };
                if let Err(e) = sink.send(message).await {
                    warn!("failed to send command: {e}");
                    return;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_frame(shared, text.as_str()),
                Some(Ok(Message::Close(_))) | None => return,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("session stream error: {e}");
                    return;
                }
            }
        }
    }
}

/// Parse and dispatch one inbound frame. Bad frames never kill the socket.
fn handle_frame(shared: &Shared, raw: &str) {
    match parse_frame(raw) {
        Ok(Some(event)) => {
            debug!(kind = event.kind().as_str(), "dispatching event");
            shared.registry.dispatch(&event);
        }
        Ok(None) => debug!("ignoring frame with unknown type"),
        Err(e) => warn!("ignoring malformed frame: {e}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
