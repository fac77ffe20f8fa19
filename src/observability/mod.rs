//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! collector / router / cache produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and gauges via the `metrics` facade)
//!
//! Consumers:
//!     → stderr (human or JSON lines)
//!     → whatever metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder; the binary does
//! - Dispatch misses are `trace` level to keep the hot path quiet

pub mod logging;
pub mod metrics;
