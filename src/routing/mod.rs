//! Route registration and request dispatch.
//!
//! - **`table`**: per-method exact and pattern routes
//! - **`pattern`**: anchored regex patterns and their captures
//! - **`handler`**: the `Handler` / `PatternHandler` traits
//! - **`dispatcher`**: precedence, fallbacks and handler failure handling

pub mod dispatcher;
pub mod handler;
pub mod pattern;
pub mod table;

pub use dispatcher::{dispatch, resolve, Resolution};
pub use handler::{Handler, PatternHandler};
pub use pattern::{Captures, Pattern};
pub use table::RouteTable;
