//! Handler types bound to routes.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::routing::matcher::RouteMatch;

/// Type-erased error returned by handlers and pass-through actions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a route handler.
pub type HandlerResult = Result<Response<Body>, BoxError>;

/// A cloneable route handler.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(RouteMatch) -> BoxFuture<'static, HandlerResult> + Send + Sync>);

impl Handler {
    /// Wrap an async function taking the match result.
    pub fn new<F, Fut, E>(f: F) -> Self
    where
        F: Fn(RouteMatch) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<Body>, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self(Arc::new(move |m| f(m).map(|r| r.map_err(Into::<BoxError>::into)).boxed()))
    }

    pub fn call(&self, matched: RouteMatch) -> BoxFuture<'static, HandlerResult> {
        (self.0)(matched)
    }

    /// True if both values wrap the same function.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Hook names carried with a route. Stored, never executed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hooks(Vec<String>);

impl Hooks {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Handler plus a route name and hooks.
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    pub uses: Handler,
    pub name: Option<String>,
    pub hooks: Option<Hooks>,
}

impl HandlerDescriptor {
    pub fn new(uses: Handler) -> Self {
        Self {
            uses,
            name: None,
            hooks: None,
        }
    }

    /// Set the route name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = Some(hooks);
        self
    }
}

/// Either a bare handler or a described one.
#[derive(Debug, Clone)]
pub enum RouteHandler {
    Plain(Handler),
    Described(HandlerDescriptor),
}

impl RouteHandler {
    /// Split into (handler, name, hooks).
    pub(crate) fn into_parts(self) -> (Handler, Option<String>, Option<Hooks>) {
        match self {
            RouteHandler::Plain(h) => (h, None, None),
            RouteHandler::Described(d) => (d.uses, d.name, d.hooks),
        }
    }
}

impl From<Handler> for RouteHandler {
    fn from(value: Handler) -> Self {
        RouteHandler::Plain(value)
    }
}

impl From<HandlerDescriptor> for RouteHandler {
    fn from(value: HandlerDescriptor) -> Self {
        RouteHandler::Described(value)
    }
}
