use crate::http::request::Request;
use crate::http::response::Response;
use crate::routing::pattern::Captures;

/// Consumes a request and produces a response.
///
/// Implemented for every `Fn(Request) -> anyhow::Result<Response>` closure,
/// so most routes are registered as plain closures.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> anyhow::Result<Response>;
}

/// A handler for pattern routes; also receives the groups the pattern
/// captured from the path.
pub trait PatternHandler: Send + Sync + 'static {
    fn call(&self, req: Request, captures: Captures) -> anyhow::Result<Response>;
}

impl<F> Handler for F
where
    F: Fn(Request) -> anyhow::Result<Response> + Send + Sync + 'static,
{
    fn call(&self, req: Request) -> anyhow::Result<Response> {
        self(req)
    }
}

impl<F> PatternHandler for F
where
    F: Fn(Request, Captures) -> anyhow::Result<Response> + Send + Sync + 'static,
{
    fn call(&self, req: Request, captures: Captures) -> anyhow::Result<Response> {
        self(req, captures)
    }
}
