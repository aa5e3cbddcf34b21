use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::task::{JoinHandle, JoinSet};
use tracing::info;

use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::session::{Session, SessionSettings};
use crate::routing::{Captures, Pattern, RouteTable};
use crate::server::shutdown::{Shutdown, ShutdownSignal};

/// Pause after a failed accept before trying again, so a persistent
/// failure such as fd exhaustion does not spin a worker.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(10);

enum Phase {
    /// Routes may still be registered.
    Configuring { socket: TcpListener, routes: RouteTable },
    /// The accept loop owns the socket and a frozen copy of the routes.
    Serving,
}

/// A bound socket plus the routes it will serve.
///
/// Routes are registered while the listener is configuring; [`Listener::start`]
/// freezes them and begins accepting. Any registration after that fails with
/// [`ServerError::AlreadyRunning`].
pub struct Listener {
    local_addr: SocketAddr,
    settings: SessionSettings,
    phase: Phase,
}

impl Listener {
    pub async fn bind<A>(addr: A) -> Result<Self>
    where
        A: ToSocketAddrs + std::fmt::Display,
    {
        let socket = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::bind(&addr, e))?;
        let local_addr = socket.local_addr()?;

        info!("Listening on {}", local_addr);

        Ok(Self {
            local_addr,
            settings: SessionSettings::default(),
            phase: Phase::Configuring {
                socket,
                routes: RouteTable::new(),
            },
        })
    }

    /// Binds `cfg.listen_addr` and applies the session settings from `cfg`.
    pub async fn bind_with_config(cfg: &Config) -> Result<Self> {
        let mut listener = Self::bind(cfg.listen_addr.as_str()).await?;
        listener.settings = SessionSettings {
            idle_timeout: cfg.idle_timeout(),
            server_name: Arc::from(cfg.server_name.as_str()),
        };
        Ok(listener)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Serving)
    }

    pub fn set_idle_timeout(&mut self, timeout: Duration) {
        self.settings.idle_timeout = timeout;
    }

    /// Registers a handler for requests whose path equals `path` exactly.
    /// Registering the same method and path twice keeps the later handler.
    pub fn route<F>(&mut self, method: Method, path: impl Into<String>, handler: F) -> Result<()>
    where
        F: Fn(Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        let path = path.into();
        let routes = self.routes_mut()?;
        tracing::debug!(method = %method, path = %path, "Registering exact route");
        routes.insert_exact(method, path, Box::new(handler));
        Ok(())
    }

    /// Registers a handler for requests whose whole path matches the regex
    /// `pattern`. Patterns are tried in registration order.
    pub fn route_pattern<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<()>
    where
        F: Fn(Request, Captures) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        let routes = self.routes_mut()?;
        let compiled = Pattern::new(pattern).map_err(|source| ServerError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        tracing::debug!(method = %method, pattern = %pattern, "Registering pattern route");
        routes.push_pattern(method, compiled, Box::new(handler));
        Ok(())
    }

    pub fn get<F>(&mut self, path: impl Into<String>, handler: F) -> Result<()>
    where
        F: Fn(Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    pub fn post<F>(&mut self, path: impl Into<String>, handler: F) -> Result<()>
    where
        F: Fn(Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.route(Method::POST, path, handler)
    }

    pub fn get_pattern<F>(&mut self, pattern: &str, handler: F) -> Result<()>
    where
        F: Fn(Request, Captures) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.route_pattern(Method::GET, pattern, handler)
    }

    pub fn post_pattern<F>(&mut self, pattern: &str, handler: F) -> Result<()>
    where
        F: Fn(Request, Captures) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.route_pattern(Method::POST, pattern, handler)
    }

    /// The routes registered so far; `None` once serving.
    pub fn routes(&self) -> Option<&RouteTable> {
        match &self.phase {
            Phase::Configuring { routes, .. } => Some(routes),
            Phase::Serving => None,
        }
    }

    fn routes_mut(&mut self) -> Result<&mut RouteTable> {
        match &mut self.phase {
            Phase::Configuring { routes, .. } => Ok(routes),
            Phase::Serving => Err(ServerError::AlreadyRunning),
        }
    }

    /// Freezes the routes and spawns the accept loop on the current runtime.
    pub fn start(&mut self) -> Result<ServerHandle> {
        let (socket, routes) = match std::mem::replace(&mut self.phase, Phase::Serving) {
            Phase::Configuring { socket, routes } => (socket, routes),
            Phase::Serving => return Err(ServerError::AlreadyRunning),
        };

        if routes.is_empty() {
            tracing::warn!("Starting with no routes; every request gets the fallback response");
        }

        let shutdown = Shutdown::new();
        let task = tokio::spawn(accept_loop(
            socket,
            Arc::new(routes),
            self.settings.clone(),
            shutdown.subscribe(),
        ));

        Ok(ServerHandle {
            local_addr: self.local_addr,
            shutdown,
            task,
        })
    }

    /// Starts serving and waits for the accept loop to end.
    pub async fn run(&mut self) -> Result<()> {
        self.start()?.wait().await
    }
}

/// Control over a running listener.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting, lets in-flight requests finish and waits until
    /// every session has closed.
    pub async fn shutdown(self) -> Result<()> {
        info!("Shutting down listener on {}", self.local_addr);
        self.shutdown.trigger();
        self.task.await?;
        Ok(())
    }

    /// Waits for the accept loop without asking it to stop.
    pub async fn wait(self) -> Result<()> {
        self.task.await?;
        Ok(())
    }
}

async fn accept_loop(
    socket: TcpListener,
    routes: Arc<RouteTable>,
    settings: SessionSettings,
    mut shutdown: ShutdownSignal,
) {
    let mut sessions = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,

            accepted = socket.accept() => match accepted {
                Ok((stream, peer)) => {
                    info!("Accepted connection from {}", peer);
                    let session = Session::new(
                        stream,
                        peer,
                        Arc::clone(&routes),
                        settings.clone(),
                        shutdown.clone(),
                    );
                    sessions.spawn(session.run());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                }
            },

            Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                log_session_exit(finished);
            }
        }
    }

    drop(socket);
    info!(sessions = sessions.len(), "Stopped accepting; draining sessions");

    while let Some(finished) = sessions.join_next().await {
        log_session_exit(finished);
    }

    info!("Listener stopped");
}

fn log_session_exit(finished: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = finished {
        tracing::error!(error = %e, "Session task failed");
    }
}
