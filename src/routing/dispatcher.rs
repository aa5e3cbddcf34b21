//! Request resolution.
//!
//! Exact routes win over pattern routes; pattern routes are tried in the
//! order they were registered. A method nothing was registered for is
//! answered differently from a method whose routes simply did not match.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::http::request::{strip_query, Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::routing::handler::{Handler, PatternHandler};
use crate::routing::pattern::Captures;
use crate::routing::table::RouteTable;

/// Body of the response sent for a method with no routes at all.
pub const UNKNOWN_METHOD_BODY: &str = "Unknown HTTP-method";
/// Body of the response sent when routes exist but none matched.
pub const NOT_FOUND_BODY: &str = "Not Found";
/// Body of the response sent when a handler fails.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Outcome of looking a request up in the route table.
pub enum Resolution<'a> {
    Exact(&'a dyn Handler),
    Pattern(&'a dyn PatternHandler, Captures),
    /// Neither exact nor pattern routes exist for the method.
    MethodNotRegistered,
    /// The method has routes, but none of them matched the path.
    NoRouteMatched,
}

impl std::fmt::Debug for Resolution<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Exact(_) => f.write_str("Exact"),
            Resolution::Pattern(_, caps) => f.debug_tuple("Pattern").field(caps).finish(),
            Resolution::MethodNotRegistered => f.write_str("MethodNotRegistered"),
            Resolution::NoRouteMatched => f.write_str("NoRouteMatched"),
        }
    }
}

/// Looks `method` and `path` up. Any query string on `path` is ignored.
pub fn resolve<'a>(table: &'a RouteTable, method: Method, path: &str) -> Resolution<'a> {
    let path = strip_query(path);

    let exact = table.exact_routes(method);
    if !exact.is_empty() {
        if let Some(handler) = exact.get(path) {
            return Resolution::Exact(handler.as_ref());
        }
    }

    let patterns = table.pattern_routes(method);
    for (pattern, handler) in patterns {
        if let Some(caps) = pattern.captures(path) {
            return Resolution::Pattern(handler.as_ref(), caps);
        }
    }

    if exact.is_empty() && patterns.is_empty() {
        Resolution::MethodNotRegistered
    } else {
        Resolution::NoRouteMatched
    }
}

/// Resolves `req`, runs the selected handler and returns the response to
/// write. Never fails: misses and handler failures become responses.
///
/// Every response leaves here speaking the request's protocol version and
/// carrying a `Server` header. A handler may force the connection closed
/// but cannot keep open a connection the client asked to close.
pub fn dispatch(table: &RouteTable, req: Request, server_name: &str) -> Response {
    let method = req.method;
    let keep_alive = req.keep_alive();
    let version = req.version.clone();

    let resolution = resolve(table, method, &req.path);
    tracing::debug!(method = %method, path = %req.path, resolution = ?resolution, "Dispatching request");

    let path = req.path.clone();
    let outcome = match resolution {
        Resolution::Exact(handler) => catch_unwind(AssertUnwindSafe(|| handler.call(req))),
        Resolution::Pattern(handler, caps) => {
            catch_unwind(AssertUnwindSafe(|| handler.call(req, caps)))
        }
        Resolution::MethodNotRegistered => Ok(Ok(fallback(StatusCode::BadRequest, UNKNOWN_METHOD_BODY))),
        Resolution::NoRouteMatched => Ok(Ok(fallback(StatusCode::NotFound, NOT_FOUND_BODY))),
    };

    let mut response = match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(method = %method, path = %path, error = %e, "Handler returned an error");
            fallback(StatusCode::InternalServerError, INTERNAL_ERROR_BODY)
        }
        Err(panic) => {
            tracing::error!(method = %method, path = %path, panic = panic_message(panic.as_ref()), "Handler panicked");
            fallback(StatusCode::InternalServerError, INTERNAL_ERROR_BODY)
        }
    };

    response.version = version;
    response.keep_alive &= keep_alive;
    if response.header("Server").is_none() {
        response.headers.insert("Server".to_string(), server_name.to_string());
    }
    response
}

fn fallback(status: StatusCode, body: &str) -> Response {
    ResponseBuilder::new(status)
        .header("Content-Type", "text/plain")
        .body(body.as_bytes().to_vec())
        .build()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
