//! Edge request router.
//!
//! Maps an incoming request (method + path) to a registered handler, extracting
//! path and query parameters, and forwards anything unmatched to an upstream.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Demo handlers
pub mod controllers;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Handler, HandlerDescriptor, PassThrough, RouteMatch, Router};
