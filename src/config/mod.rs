//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! routes.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RoutesConfig (validated, immutable)
//!     → schema.rs (resolve `extends` into Container chains)
//!     → routing::Collector
//!
//! On change (`route-engine watch`):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → caller rebuilds the route cache
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a full rebuild
//! - All optional fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{CacheConfig, ContainerConfig, EndpointConfig, GroupConfig, ObservabilityConfig, RoutesConfig};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
