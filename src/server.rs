use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use crate::alerts::{AlertLog, SlackPayload};
use crate::error::MockServerError;

const DEFAULT_HOST: &str = "127.0.0.1";
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

// Byte-for-byte what the real webhook endpoint answers with.
const ACK_OK: &str = r#"{"message":"ok", "error":""}"#;
const ACK_DECODE_FAILURE: &str = r#"{"message":"", "error":"could not decode slack payload"}"#;

/// A mock Slack incoming-webhook receiver for testing.
#[derive(Debug)]
pub struct MockSlackServer {
    log: Arc<RwLock<AlertLog>>,
    host: String,
    port: u16,
}

impl MockSlackServer {
    /// Creates a receiver for `host:port`.
    ///
    /// Pass port 0 to let the OS pick a free port and read it back from
    /// [`ServerHandle::addr`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mock_slack::MockSlackServer;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let server = MockSlackServer::new("127.0.0.1", 0).start().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            log: Arc::new(RwLock::new(AlertLog::new())),
            host: host.into(),
            port,
        }
    }

    /// Creates a receiver that records into an existing log.
    ///
    /// This allows several receivers to feed one log, or inspecting the log
    /// without starting a server.
    pub fn with_log(host: impl Into<String>, port: u16, log: Arc<RwLock<AlertLog>>) -> Self {
        Self {
            log,
            host: host.into(),
            port,
        }
    }

    pub fn builder() -> MockSlackServerBuilder {
        MockSlackServerBuilder::default()
    }

    /// Binds the listener and starts serving.
    ///
    /// The receiver accepts connections as soon as this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address.
    pub async fn start(self) -> Result<ServerHandle, MockServerError> {
        let requested = requested_addr(&self.host, self.port);
        let listener = TcpListener::bind((self.host.as_str(), self.port))
            .await
            .map_err(|source| MockServerError::BindError {
                addr: requested.clone(),
                source,
            })?;
        let bound_addr = listener
            .local_addr()
            .map_err(|source| MockServerError::BindError {
                addr: requested,
                source,
            })?;

        let app = Router::new()
            .route("/", any(handle_webhook))
            .fallback(not_found)
            .layer(DefaultBodyLimit::disable())
            .with_state(ReceiverState {
                log: self.log.clone(),
            });

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let server_task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .map_err(|e| MockServerError::ServerError(e.to_string()))
        });

        tracing::info!(
            host = %self.host,
            port = bound_addr.port(),
            addr = %bound_addr,
            "Test slack server started"
        );

        Ok(ServerHandle {
            log: self.log,
            addr: bound_addr,
            shutdown_tx: Some(shutdown_tx),
            task: Some(server_task),
        })
    }
}

/// Builder for [`MockSlackServer`].
#[derive(Debug, Default)]
pub struct MockSlackServerBuilder {
    host: Option<String>,
    port: Option<u16>,
    log: Option<Arc<RwLock<AlertLog>>>,
}

impl MockSlackServerBuilder {
    /// Sets the host to bind; defaults to `127.0.0.1`.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the port to bind; defaults to 0 (OS-assigned).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Records into an existing log instead of a fresh one.
    #[must_use]
    pub fn log(mut self, log: Arc<RwLock<AlertLog>>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn build(self) -> MockSlackServer {
        MockSlackServer {
            log: self.log.unwrap_or_default(),
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(0),
        }
    }

    /// Builds the receiver and starts it.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address.
    pub async fn start(self) -> Result<ServerHandle, MockServerError> {
        self.build().start().await
    }
}

/// A handle to a running mock receiver.
///
/// Use this to read or clear captured alerts, wait for alerts to arrive, or
/// shut the receiver down.
pub struct ServerHandle {
    log: Arc<RwLock<AlertLog>>,
    addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<Result<(), MockServerError>>>,
}

impl std::fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandle")
            .field("addr", &self.addr)
            .field("log", &"<RwLock<AlertLog>>")
            .finish()
    }
}

impl ServerHandle {
    /// Returns the actual bound address of the receiver.
    ///
    /// This is useful when using port 0 for OS-assigned ports.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the webhook URL to configure in the system under test.
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Returns a clone of the log's Arc for direct access.
    ///
    /// For convenience, prefer `alerts()`, `with_log()` or `with_log_mut()`
    /// which handle the locking for you.
    pub fn log(&self) -> Arc<RwLock<AlertLog>> {
        self.log.clone()
    }

    /// Returns a snapshot of every captured alert, in arrival order.
    pub async fn alerts(&self) -> Vec<SlackPayload> {
        self.log.read().await.alerts().to_vec()
    }

    pub async fn alert_count(&self) -> usize {
        self.log.read().await.len()
    }

    /// Empties the log. Later requests start filling it again.
    pub async fn clear_alerts(&self) {
        self.log.write().await.clear();
    }

    /// Runs a closure with read access to the log.
    pub async fn with_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AlertLog) -> R,
    {
        let log = self.log.read().await;
        f(&log)
    }

    /// Runs a closure with write access to the log.
    pub async fn with_log_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut AlertLog) -> R,
    {
        let mut log = self.log.write().await;
        f(&mut log)
    }

    /// Waits until the predicate holds for the log, polling until `timeout`.
    ///
    /// Returns immediately if the predicate already holds.
    ///
    /// # Errors
    ///
    /// Returns [`MockServerError::WaitTimeout`] if the predicate still fails
    /// once the timeout has elapsed.
    pub async fn wait_until<F>(&self, predicate: F, timeout: Duration) -> Result<(), MockServerError>
    where
        F: Fn(&AlertLog) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let satisfied = {
                let log = self.log.read().await;
                predicate(&log)
            };
            if satisfied {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(MockServerError::WaitTimeout(timeout));
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    /// Waits until at least `count` alerts have been captured.
    ///
    /// # Errors
    ///
    /// Returns [`MockServerError::WaitTimeout`] if fewer alerts arrived in time.
    pub async fn wait_for_alerts(
        &self,
        count: usize,
        timeout: Duration,
    ) -> Result<(), MockServerError> {
        self.wait_until(|log| log.len() >= count, timeout).await
    }

    /// Gracefully shuts down the receiver and releases its listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the serve loop failed or the server task panicked.
    pub async fn shutdown(mut self) -> Result<(), MockServerError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let result = match self.task.take() {
            Some(task) => task.await?,
            None => Ok(()),
        };
        tracing::info!(addr = %self.addr, "Test slack server stopped");
        result
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Clone)]
struct ReceiverState {
    log: Arc<RwLock<AlertLog>>,
}

// Every method on "/" lands here; the real endpoint only ever sees POSTs.
async fn handle_webhook(State(state): State<ReceiverState>, body: Bytes) -> Response {
    let payload: SlackPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "could not decode slack payload");
            return acknowledge(StatusCode::BAD_REQUEST, ACK_DECODE_FAILURE);
        }
    };

    let captured = {
        let mut log = state.log.write().await;
        log.push(payload);
        log.len()
    };
    tracing::debug!(alerts = captured, "captured slack alert");

    acknowledge(StatusCode::OK, ACK_OK)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 page not found\n")
}

fn requested_addr(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

fn acknowledge(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
