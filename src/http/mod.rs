//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 side of the server with support for
//! keep-alive connections.
//!
//! # Architecture
//!
//! - **`session`**: The per-connection request-response state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and parsing utilities
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Session State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │    Idle     │ ← Accepted, not yet reading
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data (idle timeout armed)
//!        └──────┬──────┘
//!               │ Request received        (EOF / error / timeout → Closing)
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← Route lookup and handler call
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closing → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use arikitari::server::Listener;
//! use arikitari::http::response::{Response, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut listener = Listener::bind("127.0.0.1:8080").await?;
//!     listener.get("/", |req| {
//!         Ok(Response::text(&req, StatusCode::Ok, "text/plain", "arikitari"))
//!     })?;
//!     listener.run().await?;
//!     Ok(())
//! }
//! ```

pub mod parser;
pub mod request;
pub mod response;
pub mod session;
pub mod writer;
