//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Route cache? → Collect → Router
//! ```
//!
//! # Design Decisions
//! - Fail fast: registration errors are fatal
//! - The route cache is optional; a bad artifact never stops startup

pub mod startup;

pub use startup::{boot, build_router, rebuild_cache, Boot, RouteSource, StartupError};
