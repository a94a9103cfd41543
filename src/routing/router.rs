//! Route registration.
//!
//! # Responsibilities
//! - Compile and store routes in registration order
//! - Per-verb, generic, and bulk registration entry points
//! - Hold the default-handler slot filled by `/` registrations
//!
//! # Design Decisions
//! - Append-only: routes are never removed or mutated
//! - Patterns compiled once, at registration
//! - Bulk registration orders deeper paths first; otherwise first registered wins

use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::handler::{Handler, Hooks, RouteHandler};
use crate::routing::pattern::{CompiledPattern, RoutePattern, DEFAULT_PATTERN_SIZE_LIMIT};

/// Default limit for a buffered form body: none.
pub const DEFAULT_FORM_LIMIT: usize = usize::MAX;

/// A registered route.
pub struct Route {
    pattern: RoutePattern,
    compiled: CompiledPattern,
    method: Method,
    handler: Handler,
    hooks: Option<Hooks>,
    name: Option<String>,
}

impl Route {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn compiled(&self) -> &CompiledPattern {
        &self.compiled
    }

    pub fn param_names(&self) -> &[String] {
        self.compiled.param_names()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn hooks(&self) -> Option<&Hooks> {
        self.hooks.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.to_string())
            .field("param_names", &self.compiled.param_names())
            .field("name", &self.name)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Handler stored by `/` registrations. Not consulted on unmatched requests.
#[derive(Debug, Clone)]
pub struct DefaultHandler {
    pub handler: Handler,
    pub hooks: Option<Hooks>,
}

/// Ordered route table with a registration API.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Arc<Route>>,
    default_handler: Option<DefaultHandler>,
    form_limit: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            default_handler: None,
            form_limit: DEFAULT_FORM_LIMIT,
        }
    }

    /// Set the maximum form body size read before matching.
    pub fn with_form_limit(mut self, bytes: usize) -> Self {
        self.form_limit = bytes;
        self
    }

    pub fn form_limit(&self) -> usize {
        self.form_limit
    }

    /// Register a route. Explicit `hooks` take precedence over a descriptor's.
    ///
    /// The literal template `/` fills the default-handler slot instead.
    pub fn register(
        &mut self,
        method: Method,
        pattern: impl Into<RoutePattern>,
        handler: impl Into<RouteHandler>,
        hooks: Option<Hooks>,
    ) -> &mut Self {
        let pattern = pattern.into();
        let (handler, name, descriptor_hooks) = handler.into().into_parts();

        if pattern.is_root() {
            tracing::debug!(method = %method, "Default handler registered");
            self.default_handler = Some(DefaultHandler { handler, hooks });
            return self;
        }

        let pattern = pattern.encoded();
        let compiled = pattern.compile_or_never(DEFAULT_PATTERN_SIZE_LIMIT);

        tracing::debug!(
            method = %method,
            pattern = %pattern,
            params = ?compiled.param_names(),
            name = ?name,
            "Route registered"
        );

        self.routes.push(Arc::new(Route {
            pattern,
            compiled,
            method,
            handler,
            hooks: hooks.or(descriptor_hooks),
            name,
        }));
        self
    }

    pub fn on(
        &mut self,
        method: Method,
        pattern: impl Into<RoutePattern>,
        handler: impl Into<RouteHandler>,
    ) -> &mut Self {
        self.register(method, pattern, handler, None)
    }

    pub fn get(&mut self, pattern: impl Into<RoutePattern>, handler: impl Into<RouteHandler>) -> &mut Self {
        self.on(Method::GET, pattern, handler)
    }

    pub fn post(&mut self, pattern: impl Into<RoutePattern>, handler: impl Into<RouteHandler>) -> &mut Self {
        self.on(Method::POST, pattern, handler)
    }

    pub fn put(&mut self, pattern: impl Into<RoutePattern>, handler: impl Into<RouteHandler>) -> &mut Self {
        self.on(Method::PUT, pattern, handler)
    }

    pub fn delete(&mut self, pattern: impl Into<RoutePattern>, handler: impl Into<RouteHandler>) -> &mut Self {
        self.on(Method::DELETE, pattern, handler)
    }

    pub fn head(&mut self, pattern: impl Into<RoutePattern>, handler: impl Into<RouteHandler>) -> &mut Self {
        self.on(Method::HEAD, pattern, handler)
    }

    pub fn options(&mut self, pattern: impl Into<RoutePattern>, handler: impl Into<RouteHandler>) -> &mut Self {
        self.on(Method::OPTIONS, pattern, handler)
    }

    /// Register several templates for one method, deepest paths first.
    ///
    /// Templates of equal depth keep the order they were supplied in.
    pub fn register_many<I, S, H>(&mut self, method: Method, routes: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, H)>,
        S: Into<String>,
        H: Into<RouteHandler>,
    {
        let mut ordered: Vec<(String, RouteHandler)> = routes
            .into_iter()
            .map(|(p, h)| (p.into(), h.into()))
            .collect();
        ordered.sort_by_key(|(p, _)| std::cmp::Reverse(path_depth(p)));

        for (pattern, handler) in ordered {
            self.on(method.clone(), pattern, handler);
        }
        self
    }

    /// Fill the default-handler slot directly.
    pub fn otherwise(&mut self, handler: Handler) -> &mut Self {
        self.default_handler = Some(DefaultHandler {
            handler,
            hooks: None,
        });
        self
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn default_handler(&self) -> Option<&DefaultHandler> {
        self.default_handler.as_ref()
    }
}

/// Segment count after dropping one trailing slash.
pub(crate) fn path_depth(path: &str) -> usize {
    path.strip_suffix('/').unwrap_or(path).split('/').count()
}
