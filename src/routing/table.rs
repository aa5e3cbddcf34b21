use std::collections::HashMap;

use crate::http::request::Method;
use crate::routing::handler::{Handler, PatternHandler};
use crate::routing::pattern::Pattern;

/// Registered routes, one bucket per method.
///
/// Filled while the listener is configuring and frozen behind an `Arc`
/// once it starts; sessions only ever see the frozen table.
pub struct RouteTable {
    exact: [HashMap<String, Box<dyn Handler>>; Method::COUNT],
    patterns: [Vec<(Pattern, Box<dyn PatternHandler>)>; Method::COUNT],
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            exact: std::array::from_fn(|_| HashMap::new()),
            patterns: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Registers an exact-path handler. A second handler for the same
    /// method and path replaces the first.
    pub fn insert_exact(&mut self, method: Method, path: impl Into<String>, handler: Box<dyn Handler>) {
        self.exact[method.index()].insert(path.into(), handler);
    }

    /// Appends a pattern handler behind every pattern already registered
    /// for `method`.
    pub fn push_pattern(&mut self, method: Method, pattern: Pattern, handler: Box<dyn PatternHandler>) {
        self.patterns[method.index()].push((pattern, handler));
    }

    pub fn exact_routes(&self, method: Method) -> &HashMap<String, Box<dyn Handler>> {
        &self.exact[method.index()]
    }

    pub fn pattern_routes(&self, method: Method) -> &[(Pattern, Box<dyn PatternHandler>)] {
        &self.patterns[method.index()]
    }

    /// Whether anything at all is registered for `method`.
    pub fn has_routes(&self, method: Method) -> bool {
        !self.exact[method.index()].is_empty() || !self.patterns[method.index()].is_empty()
    }

    /// Total number of registered routes across all methods.
    pub fn len(&self) -> usize {
        self.exact.iter().map(HashMap::len).sum::<usize>()
            + self.patterns.iter().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for method in Method::ALL {
            if !self.has_routes(method) {
                continue;
            }
            let mut paths: Vec<&str> = self.exact_routes(method).keys().map(String::as_str).collect();
            paths.sort_unstable();
            paths.extend(self.pattern_routes(method).iter().map(|(p, _)| p.as_str()));
            map.entry(&method, &paths);
        }
        map.finish()
    }
}
