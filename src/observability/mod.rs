//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ClassRouter and HTTP layers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (dispatch counters, latency, cache sizes)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every routing event, never formatted strings
//! - Metrics are cheap (atomic increments) and are no-ops without an exporter

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
