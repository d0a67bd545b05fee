//! Shared fixtures for integration tests.
//!
//! [`EchoServer`] is a localhost WebSocket peer that echoes every text frame
//! back to the sender. Tests can switch it to close-on-message, hold echoes
//! behind a reply gate, and stop/restart it on the same port to exercise
//! disconnect and reconnect paths.

use std::sync::{Arc, Once};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;
use tokio::sync::{Semaphore, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

use sync_websocket::Deadline;

/// How the server reacts to an incoming text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    /// Echo the frame back to the sender.
    Echo,
    /// Close the connection instead of replying.
    CloseOnMessage,
}

/// A restartable echo server bound to one localhost port.
pub struct EchoServer {
    /// Runtime driving the accept loop and connection tasks.
    runtime: Runtime,
    /// Bound port. 0 until the first `start`, then pinned across restarts.
    port: u16,
    /// Reaction to incoming frames, readable per message.
    action: Arc<Mutex<MessageAction>>,
    /// When set, echoes wait for a permit from `allow_reply`.
    gate: Option<Arc<Semaphore>>,
    /// Signals all tasks of the current incarnation to wind down.
    shutdown: Option<watch::Sender<bool>>,
    /// Accept loop task, joined on `stop`.
    accept_task: Option<JoinHandle<()>>,
}

impl EchoServer {
    /// Creates a stopped server. Call [`start`](Self::start) to bind.
    pub fn new() -> Self {
        Self {
            runtime: Runtime::new().expect("build echo server runtime"),
            port: 0,
            action: Arc::new(Mutex::new(MessageAction::Echo)),
            gate: None,
            shutdown: None,
            accept_task: None,
        }
    }

    /// Changes how incoming frames are handled.
    pub fn set_message_action(&self, action: MessageAction) {
        *self.action.lock() = action;
    }

    /// Holds every echo until [`allow_reply`](Self::allow_reply) grants it.
    ///
    /// Must be called before [`start`](Self::start).
    pub fn enable_reply_gate(&mut self) {
        assert!(self.accept_task.is_none(), "gate must be set before start");
        self.gate = Some(Arc::new(Semaphore::new(0)));
    }

    /// Releases one gated echo.
    pub fn allow_reply(&self) {
        self.gate
            .as_ref()
            .expect("reply gate not enabled")
            .add_permits(1);
    }

    /// Binds and begins accepting connections.
    ///
    /// After a [`stop`](Self::stop), rebinds the same port so clients can
    /// reconnect to the URL they already hold.
    pub fn start(&mut self) {
        assert!(self.accept_task.is_none(), "server already started");

        let listener = self
            .runtime
            .block_on(TcpListener::bind(("127.0.0.1", self.port)))
            .expect("bind echo server");
        self.port = listener.local_addr().expect("local addr").port();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown = Some(shutdown_tx);
        self.accept_task = Some(self.runtime.spawn(accept_loop(
            listener,
            Arc::clone(&self.action),
            self.gate.clone(),
            shutdown_rx,
        )));
    }

    /// Closes all live connections and releases the port.
    ///
    /// Blocks until every connection has sent its close frame and dropped
    /// its socket, so callers observe the disconnect promptly.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        if let Some(task) = self.accept_task.take() {
            let _ = self.runtime.block_on(task);
        }
    }

    /// WebSocket URL of the server.
    pub fn ws_url(&self) -> String {
        assert!(self.port != 0, "server never started");
        format!("ws://127.0.0.1:{}/", self.port)
    }
}

impl Drop for EchoServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Accepts connections until shutdown, then drains connection tasks.
async fn accept_loop(
    listener: TcpListener,
    action: Arc<Mutex<MessageAction>>,
    gate: Option<Arc<Semaphore>>,
    shutdown_rx: watch::Receiver<bool>,
) {
    let mut connections = JoinSet::new();
    let mut shutdown = shutdown_rx.clone();

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,

            accepted = listener.accept() => {
                let Ok((stream, _addr)) = accepted else { break };
                connections.spawn(serve_connection(
                    stream,
                    Arc::clone(&action),
                    gate.clone(),
                    shutdown_rx.clone(),
                ));
            }
        }
    }

    // Port is released here; connections close before stop() returns.
    drop(listener);
    while connections.join_next().await.is_some() {}
}

/// Serves one client until it leaves or the server shuts down.
async fn serve_connection(
    stream: TcpStream,
    action: Arc<Mutex<MessageAction>>,
    gate: Option<Arc<Semaphore>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                let _ = ws.close(None).await;
                break;
            }

            frame = ws.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let action = *action.lock();
                        match action {
                            MessageAction::Echo => {
                                if !echo(&mut ws, text.as_str().to_owned(), gate.as_deref(), &mut shutdown).await {
                                    break;
                                }
                            }
                            MessageAction::CloseOnMessage => {
                                let _ = ws.close(None).await;
                                break;
                            }
                        }
                    }

                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,

                    // Ignore Binary, Ping, Pong
                    _ => {}
                }
            }
        }
    }
}

/// Sends one echo, waiting on the reply gate when enabled.
///
/// Returns `false` once the connection should wind down.
async fn echo(
    ws: &mut WebSocketStream<TcpStream>,
    text: String,
    gate: Option<&Semaphore>,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    if let Some(gate) = gate {
        tokio::select! {
            permit = gate.acquire() => {
                permit.expect("reply gate closed").forget();
            }
            _ = shutdown.changed() => {
                let _ = ws.close(None).await;
                return false;
            }
        }
    }

    ws.send(Message::Text(text.into())).await.is_ok()
}

/// Polls `condition` until it holds or `budget` runs out.
pub fn wait_until(budget: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Deadline::after(budget);
    loop {
        if condition() {
            return true;
        }
        if deadline.is_expired() {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// Installs the test tracing subscriber once per process.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}
