//! Route cache subsystem.
//!
//! # Data Flow
//! ```text
//! cache build:
//!     RouteTable → CacheArtifact (table + translated patterns)
//!     → store.rs (JSON, written to a temp file then renamed)
//!
//! startup:
//!     store.rs (load) → CacheArtifact
//!     → Router::from_artifact / Router::with_patterns
//!     missing, corrupt or inconsistent → warn, compile on demand
//! ```
//!
//! # Design Decisions
//! - A performance shortcut only; never required for correct dispatch
//! - Deterministic output: patterns ordered by path
//! - Versioned so an old artifact is rejected instead of misread
//! - A cached pattern is used only if it equals the path's own translation

pub mod store;

pub use store::{CacheArtifact, CacheError, CacheResult, RouteCache, CACHE_VERSION};
