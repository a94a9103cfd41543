//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (dispatch counters and latency)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`, JSON optional
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
