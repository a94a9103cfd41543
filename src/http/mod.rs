//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request-id / trace / timeout layers)
//!     → routing::Router::dispatch
//!         → matched: handler builds response via response.rs helpers
//!         → unmatched: proxy.rs forwards to the upstream
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use proxy::{ProxyError, UpstreamProxy};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
