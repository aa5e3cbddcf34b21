//! Listener, lifecycle and runtime.
//!
//! A [`Listener`] is configured (routes registered), then started; the
//! returned [`ServerHandle`] drives graceful shutdown.

pub mod listener;
pub mod runtime;
pub mod shutdown;

pub use listener::{Listener, ServerHandle};
