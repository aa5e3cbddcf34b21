//! arikitari - embeddable HTTP/1.1 server core
//!
//! Routes are registered on a [`server::Listener`] before it starts. Each
//! accepted connection gets its own session that reads a request, dispatches
//! it to the matching handler and writes the response, looping while the
//! connection is kept alive.

pub mod config;
pub mod error;
pub mod http;
pub mod routing;
pub mod server;

pub use error::ServerError;
