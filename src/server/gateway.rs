//! Startup and two-phase shutdown of the HTTP and WebSocket transports.
//!
//! Both transports are driven from a single listener. Shutdown first signals
//! both of them to stop accepting work, then waits for in-flight HTTP
//! requests and live subscription sessions to finish.

use std::io;
use std::net::SocketAddr;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::config::Config;

use super::store::Store;
use super::{build_schema, make_app};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("HTTP server failed")]
    Serve(#[source] io::Error),
    #[error("HTTP server task did not complete")]
    Join(#[source] JoinError),
}

/// The spawned HTTP server for queries and mutations.
pub struct HttpTransport {
    stop: CancellationToken,
    task: JoinHandle<io::Result<()>>,
}

impl HttpTransport {
    pub fn serve(listener: TcpListener, app: Router) -> Self {
        let stop = CancellationToken::new();
        let shutdown = stop.clone().cancelled_owned();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
        });

        Self { stop, task }
    }

    /// Stops accepting new connections.
    pub fn signal(&self) {
        self.stop.cancel();
    }

    /// Waits for in-flight requests to finish and the server to exit.
    pub async fn drain(self) -> Result<(), GatewayError> {
        self.task
            .await
            .map_err(GatewayError::Join)?
            .map_err(GatewayError::Serve)
    }
}

/// Tracks live WebSocket subscription sessions so shutdown can end them.
#[derive(Clone, Default)]
pub struct SubscriptionTransport {
    stop: CancellationToken,
    sessions: TaskTracker,
}

impl SubscriptionTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_accepting(&self) -> bool {
        !self.stop.is_cancelled()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Wraps a WebSocket session so it is tracked and cancelled on shutdown.
    pub fn session<F>(&self, connection: F) -> impl Future<Output = ()> + Send + use<F>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let stop = self.stop.clone();
        self.sessions.track_future(async move {
            debug!("subscription session opened");
            tokio::select! {
                () = connection => debug!("subscription session closed by client"),
                () = stop.cancelled() => debug!("subscription session closed by shutdown"),
            }
        })
    }

    /// Stops accepting sessions and cancels the live ones.
    pub fn signal(&self) {
        self.sessions.close();
        self.stop.cancel();
    }

    /// Waits until every session has released its connection.
    pub async fn drain(&self) {
        self.sessions.wait().await;
    }
}

/// A running server: the bound address plus both transport handles.
pub struct Gateway {
    local_addr: SocketAddr,
    http: HttpTransport,
    subscriptions: SubscriptionTransport,
}

impl Gateway {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn shutdown(self) -> Result<(), GatewayError> {
        shutdown(self.http, self.subscriptions).await
    }
}

/// Builds the schema once, mounts it on both transports and starts listening.
pub async fn start(config: &Config, store: Store) -> Result<Gateway, GatewayError> {
    let schema = build_schema(store, config.greeting_interval);
    let subscriptions = SubscriptionTransport::new();
    let app = make_app(schema, config, subscriptions.clone());

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| GatewayError::Bind { addr, source })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| GatewayError::Bind { addr, source })?;

    let http = HttpTransport::serve(listener, app);
    info!(
        %local_addr,
        http_path = %config.http_path,
        subscription_path = %config.subscription_path,
        transport = ?config.transport,
        "gateway listening"
    );

    Ok(Gateway {
        local_addr,
        http,
        subscriptions,
    })
}

/// Stops both transports together.
///
/// Both are signalled before either is drained, and the subscription
/// sessions are drained even if the HTTP server failed.
pub async fn shutdown(
    http: HttpTransport,
    subscriptions: SubscriptionTransport,
) -> Result<(), GatewayError> {
    info!("shutting down: no longer accepting connections");
    http.signal();
    subscriptions.signal();

    let http_result = http.drain().await;
    if let Err(error) = &http_result {
        warn!(%error, "HTTP transport did not drain cleanly");
    }

    debug!(
        sessions = subscriptions.active_sessions(),
        "draining subscription sessions"
    );
    subscriptions.drain().await;

    info!("shutdown complete");
    http_result
}
