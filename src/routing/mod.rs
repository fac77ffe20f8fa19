//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     Container[] (endpoints + group chain)
//!     → collector.rs (merge groups root → leaf, detect duplicates)
//!     → table.rs (RouteTable, frozen)
//!
//! Incoming Request (method, path, host)
//!     → router.rs (exact lookup, then dynamic paths in order)
//!     → pattern.rs (compiled, memoized path matchers)
//!     → matcher.rs (subdomain constraint)
//!     → Return: RouteMatch { entry, params } or None
//!
//! Reverse Lookup (name, params)
//!     → router.rs (search_uri) → concrete path
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Declarations are explicit values, no reflection
//! - Deterministic: same input always matches same route
//! - First path match wins (registration order)

pub mod collector;
pub mod descriptor;
pub mod matcher;
pub mod pattern;
pub mod router;
pub mod table;

pub use collector::{Collector, RegistrationError, RegistrationResult};
pub use descriptor::{
    Container, ContainerBuilder, EndpointDescriptor, GroupDescriptor, HttpMethod, Middleware,
    MiddlewareSet, SubdomainConstraint,
};
pub use pattern::{CompiledPattern, PatternCache, PatternError, PatternSource};
pub use router::{RouteMatch, Router};
pub use table::{RouteEntry, RouteTable};
