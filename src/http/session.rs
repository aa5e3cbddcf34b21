use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;

use crate::config::DEFAULT_IDLE_TIMEOUT_SECS;
use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::Request;
use crate::http::response::SERVER_NAME;
use crate::http::writer::ResponseWriter;
use crate::routing::{dispatch, RouteTable};
use crate::server::shutdown::ShutdownSignal;

/// Per-session knobs, shared by every session a listener spawns.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub idle_timeout: Duration,
    pub server_name: Arc<str>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            server_name: Arc::from(SERVER_NAME),
        }
    }
}

/// One accepted connection and the state of its read/dispatch/write cycle.
///
/// A session runs as a single task, so everything it does for one
/// connection is serialized without locks.
pub struct Session<S = TcpStream> {
    stream: S,
    peer: SocketAddr,
    buffer: BytesMut,
    routes: Arc<RouteTable>,
    settings: SessionSettings,
    shutdown: ShutdownSignal,
    state: SessionState,
}

pub enum SessionState {
    Idle,
    Reading,
    Dispatching(Request),
    /// The writer owns the serialized response until the write completes.
    Writing(ResponseWriter),
    Closing,
    Closed,
}

enum ReadOutcome {
    Request(Request),
    PeerClosed,
    TimedOut,
    Shutdown,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        peer: SocketAddr,
        routes: Arc<RouteTable>,
        settings: SessionSettings,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(4096),
            routes,
            settings,
            shutdown,
            state: SessionState::Idle,
        }
    }

    /// Drives the session until the connection is closed. Failures end
    /// this session only; they are logged, never returned.
    pub async fn run(mut self) {
        loop {
            self.state = match std::mem::replace(&mut self.state, SessionState::Closed) {
                SessionState::Idle => SessionState::Reading,

                SessionState::Reading => match self.read_request().await {
                    Ok(ReadOutcome::Request(req)) => SessionState::Dispatching(req),
                    Ok(ReadOutcome::PeerClosed) => {
                        tracing::debug!(peer = %self.peer, "Peer closed connection");
                        SessionState::Closing
                    }
                    Ok(ReadOutcome::TimedOut) => {
                        tracing::debug!(peer = %self.peer, timeout = ?self.settings.idle_timeout, "Idle timeout");
                        SessionState::Closing
                    }
                    Ok(ReadOutcome::Shutdown) => SessionState::Closing,
                    Err(e) => {
                        tracing::warn!(peer = %self.peer, error = %e, "Read failed");
                        SessionState::Closing
                    }
                },

                SessionState::Dispatching(req) => {
                    let method = req.method;
                    let path = req.path.clone();

                    let mut response = dispatch(&self.routes, req, &self.settings.server_name);
                    if self.shutdown.is_triggered() {
                        response.keep_alive = false;
                    }

                    tracing::debug!(
                        peer = %self.peer,
                        method = %method,
                        path = %path,
                        status = response.status.as_u16(),
                        "Request handled"
                    );

                    SessionState::Writing(ResponseWriter::new(response, &self.settings.server_name))
                }

                SessionState::Writing(mut writer) => {
                    match writer.write_to_stream(&mut self.stream).await {
                        Ok(()) if writer.need_eof() => SessionState::Closing,
                        Ok(()) => SessionState::Reading,
                        Err(e) => {
                            tracing::warn!(peer = %self.peer, error = %e, "Write failed");
                            SessionState::Closing
                        }
                    }
                }

                SessionState::Closing => {
                    // Half-close; the peer may already be gone.
                    let _ = self.stream.shutdown().await;
                    SessionState::Closed
                }

                SessionState::Closed => break,
            };
        }
    }

    /// Reads until one complete request is buffered.
    ///
    /// The idle window covers the whole request, so a client trickling
    /// bytes cannot hold the session open past it.
    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        let deadline = Instant::now() + self.settings.idle_timeout;

        loop {
            if !self.buffer.is_empty() {
                match parse_http_request(&self.buffer) {
                    Ok((request, consumed)) => {
                        self.buffer.advance(consumed);
                        return Ok(ReadOutcome::Request(request));
                    }
                    Err(ParseError::Incomplete) => {}
                    Err(e) => bail!("HTTP parse error: {e}"),
                }
            }

            // Only a session waiting for a fresh request gives way to shutdown.
            let between_requests = self.buffer.is_empty();
            if between_requests && self.shutdown.is_triggered() {
                return Ok(ReadOutcome::Shutdown);
            }

            tokio::select! {
                read = tokio::time::timeout_at(deadline, self.stream.read_buf(&mut self.buffer)) => {
                    match read {
                        Err(_) => return Ok(ReadOutcome::TimedOut),
                        Ok(Ok(0)) if self.buffer.is_empty() => return Ok(ReadOutcome::PeerClosed),
                        Ok(Ok(0)) => bail!("connection closed mid-request"),
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) => return Err(e.into()),
                    }
                }
                _ = self.shutdown.recv(), if between_requests => {
                    return Ok(ReadOutcome::Shutdown);
                }
            }
        }
    }
}
