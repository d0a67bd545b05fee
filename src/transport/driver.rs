//! Transport driver thread and event loop.
//!
//! The driver owns the live socket. It runs a current-thread tokio runtime
//! on a dedicated OS thread and multiplexes two sources in one
//! `tokio::select!` loop:
//!
//! - Commands from the blocking facade (connect, send, shutdown), each
//!   carrying a oneshot completion the caller is parked on
//! - The websocket read half, whose decoded text frames feed the shared
//!   inbound queue
//!
//! All connectivity transitions happen here; the facade only observes them
//! through [`Shared`]. Failed commands resolve their completion with the
//! crate [`Error`](crate::Error); the facade collapses that to its boolean
//! surface after logging.

// ============================================================================
// Imports
// ============================================================================

use std::future;
use std::sync::Arc;
use std::thread;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::runtime::Builder;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::socket::state::Shared;

// ============================================================================
// Types
// ============================================================================

/// The client-side websocket stream.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half after splitting.
type WsWriter = SplitSink<WsStream, Message>;

/// Read half after splitting.
type WsReader = SplitStream<WsStream>;

// ============================================================================
// Command
// ============================================================================

/// Work posted from the caller thread to the event loop.
///
/// `Connect` and `Send` are synchronous RPCs: the facade blocks on the
/// `done` channel until the transport resolves the operation.
enum Command {
    /// Tear down any live session and dial a fresh one.
    Connect {
        url: Url,
        done: oneshot::Sender<Result<()>>,
    },
    /// Write one complete text frame.
    Send {
        payload: String,
        done: oneshot::Sender<Result<()>>,
    },
    /// Close the socket and terminate the event loop.
    Shutdown,
}

// ============================================================================
// TransportDriver
// ============================================================================

/// Handle to the transport thread.
///
/// Owns the command channel and the thread itself; dropping the driver shuts
/// the event loop down and joins the thread.
pub(crate) struct TransportDriver {
    /// Channel feeding the event loop.
    command_tx: mpsc::UnboundedSender<Command>,
    /// Join handle, taken on shutdown.
    thread: Option<thread::JoinHandle<()>>,
}

impl TransportDriver {
    /// Spawns the transport thread and its event loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the OS thread cannot be spawned.
    pub(crate) fn spawn(shared: Arc<Shared>) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let thread = thread::Builder::new()
            .name("ws-transport".into())
            .spawn(move || {
                let runtime = match Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        // Dropping command_rx fails every in-flight RPC with
                        // ChannelClosed; waiters observe Disconnected.
                        error!(error = %e, "Failed to build transport runtime");
                        shared.mark_disconnected();
                        return;
                    }
                };
                runtime.block_on(run_event_loop(command_rx, shared));
            })?;

        Ok(Self {
            command_tx,
            thread: Some(thread),
        })
    }

    /// Dials `url`, blocking until the handshake resolves.
    ///
    /// # Errors
    ///
    /// - [`Error::WebSocket`] if the dial or upgrade fails
    /// - [`Error::ConnectionClosed`] / [`Error::ChannelClosed`] if the
    ///   transport thread is gone
    pub(crate) fn connect(&self, url: Url) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.command_tx
            .send(Command::Connect { url, done })
            .map_err(|_| Error::ConnectionClosed)?;
        wait.blocking_recv()?
    }

    /// Writes one message, blocking until the write completes or fails.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if no session is live or the transport
    ///   thread is gone
    /// - [`Error::WebSocket`] if the write itself fails
    pub(crate) fn send(&self, payload: String) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.command_tx
            .send(Command::Send { payload, done })
            .map_err(|_| Error::ConnectionClosed)?;
        wait.blocking_recv()?
    }

    /// Stops the event loop and joins the transport thread.
    ///
    /// Wakes any blocked receiver with a disconnect before returning. Safe
    /// to call more than once; called automatically on drop.
    pub(crate) fn shutdown(&mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("Transport thread panicked during shutdown");
        }
    }
}

impl Drop for TransportDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ============================================================================
// Event loop
// ============================================================================

/// Event loop driving the socket. Runs until shutdown.
async fn run_event_loop(mut command_rx: mpsc::UnboundedReceiver<Command>, shared: Arc<Shared>) {
    let mut writer: Option<WsWriter> = None;
    let mut reader: Option<WsReader> = None;

    loop {
        tokio::select! {
            // Commands from the blocking facade
            command = command_rx.recv() => {
                match command {
                    Some(Command::Connect { url, done }) => {
                        // An existing session is closed first; the stale
                        // queue survives until the new session succeeds.
                        teardown(&mut writer, &mut reader, &shared).await;
                        let result = open_session(&url, &mut writer, &mut reader, &shared).await;
                        let _ = done.send(result);
                    }

                    Some(Command::Send { payload, done }) => {
                        let result = write_frame(payload, &mut writer).await;
                        if result.is_err() {
                            teardown(&mut writer, &mut reader, &shared).await;
                        }
                        let _ = done.send(result);
                    }

                    Some(Command::Shutdown) | None => {
                        teardown(&mut writer, &mut reader, &shared).await;
                        break;
                    }
                }
            }

            // Frames from the peer
            incoming = next_frame(&mut reader) => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        trace!(len = text.len(), "Message received");
                        shared.push_message(text.as_str().to_owned());
                    }

                    Some(Ok(Message::Close(_))) => {
                        debug!("WebSocket closed by remote");
                        teardown(&mut writer, &mut reader, &shared).await;
                    }

                    Some(Err(e)) => {
                        error!(error = %e, "WebSocket error");
                        teardown(&mut writer, &mut reader, &shared).await;
                    }

                    None => {
                        debug!("WebSocket stream ended");
                        teardown(&mut writer, &mut reader, &shared).await;
                    }

                    // Ignore Binary, Ping, Pong
                    _ => {}
                }
            }
        }
    }

    debug!("Event loop terminated");
}

/// Reads the next frame, or parks forever while no session is live.
async fn next_frame(reader: &mut Option<WsReader>) -> Option<std::result::Result<Message, WsError>> {
    match reader.as_mut() {
        Some(reader) => reader.next().await,
        None => future::pending().await,
    }
}

/// Dials `url` and installs the new session on success.
async fn open_session(
    url: &Url,
    writer: &mut Option<WsWriter>,
    reader: &mut Option<WsReader>,
    shared: &Arc<Shared>,
) -> Result<()> {
    shared.set_connecting();
    debug!(%url, "Connecting");

    match connect_async(url.as_str()).await {
        Ok((stream, _response)) => {
            let (write, read) = stream.split();
            *writer = Some(write);
            *reader = Some(read);
            shared.begin_session();
            info!(%url, generation = shared.generation(), "WebSocket connection established");
            Ok(())
        }
        Err(e) => {
            warn!(%url, error = %e, "Connect failed");
            shared.mark_disconnected();
            Err(e.into())
        }
    }
}

/// Writes one complete text frame. All-or-nothing from the caller's view.
async fn write_frame(payload: String, writer: &mut Option<WsWriter>) -> Result<()> {
    let Some(write) = writer.as_mut() else {
        return Err(Error::ConnectionClosed);
    };

    match write.send(Message::Text(payload.into())).await {
        Ok(()) => {
            trace!("Message sent");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Write failed");
            Err(e.into())
        }
    }
}

/// Closes any live session and records the disconnect.
async fn teardown(
    writer: &mut Option<WsWriter>,
    reader: &mut Option<WsReader>,
    shared: &Arc<Shared>,
) {
    if let Some(mut write) = writer.take() {
        // Best-effort close frame; the peer may already be gone.
        let _ = write.close().await;
    }
    reader.take();
    shared.mark_disconnected();
}

// ============================================================================
// Tests
// ============================================================================
