//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Setup (once):
//!     get/post/put/delete/on/register_many
//!     → pattern.rs (compile template → regex + param names)
//!     → router.rs (append Route, insertion order kept)
//!
//! Per request:
//!     dispatch.rs (read form body if url-encoded POST)
//!     → matcher.rs (first route with same method and accepting pattern)
//!     → handler(RouteMatch) or pass-through(request)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at registration, immutable afterwards
//! - First match wins; later overlapping routes are shadowed
//! - An unmatched request is not an error; it is forwarded
//! - Explicit `Router` value, no process-wide instance

pub mod dispatch;
pub mod form;
pub mod handler;
pub mod matcher;
pub mod pattern;
pub mod router;

pub use dispatch::{DispatchError, PassThrough};
pub use form::FormData;
pub use handler::{BoxError, Handler, HandlerDescriptor, HandlerResult, Hooks, RouteHandler};
pub use matcher::RouteMatch;
pub use pattern::{CompiledPattern, PatternError, RoutePattern};
pub use router::{DefaultHandler, Route, Router};
