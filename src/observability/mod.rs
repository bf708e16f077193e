//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and validation engine produce:
//!     → logging.rs (structured log events through `tracing`)
//!     → metrics.rs (request counters, latency histograms, validation failures)
//!
//! Consumers:
//!     → stdout (fmt subscriber, filtered by RUST_LOG or config)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request IDs come from tower-http and are attached to every request span
//! - Metric updates go through the `metrics` facade and are no-ops until a
//!   recorder is installed, so tests never need one

pub mod logging;
pub mod metrics;
