//! Route registration and dispatch engine.
//!
//! Turns declared endpoint containers into a frozen route table, dispatches
//! (method, path, host) to a single route with extracted parameters, and
//! resolves route names back into URIs.
//!
//! ```
//! use route_engine::routing::{Collector, Container, EndpointDescriptor, GroupDescriptor, HttpMethod, Router};
//!
//! let users = Container::builder("users")
//!     .group(GroupDescriptor::new().path_prefix("/users").name_prefix("users"))
//!     .endpoint(EndpointDescriptor::new(HttpMethod::Get, "/{id}", "show").named("show"))
//!     .build();
//!
//! let mut collector = Collector::new();
//! collector.register(&users).unwrap();
//! let router = Router::new(collector.into_table());
//!
//! let found = router.dispatch("/users/42", "GET", None).unwrap();
//! assert_eq!(found.action(), "show");
//! assert_eq!(found.params, vec!["42"]);
//! assert_eq!(router.search_uri("users.show", &["7"]).as_deref(), Some("/users/7"));
//! ```

pub mod cache;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use cache::RouteCache;
pub use config::RoutesConfig;
pub use routing::{Collector, RouteMatch, RouteTable, Router};
