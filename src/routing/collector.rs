//! Route table assembly.
//!
//! # Responsibilities
//! - Walk each container's ancestor chain and merge group defaults
//! - Resolve full path, full name, middleware and subdomain per endpoint
//! - Reject duplicate names and duplicate (path, method) pairs
//! - Compile every dynamic path once so broken patterns fail the boot
//!
//! # Merge Order
//! ```text
//! ancestry (collected):  self → parent → … → root
//! merge (applied):       root → … → parent → self → endpoint
//!   path prefixes:  concatenated, each "/segment"
//!   name prefixes:  joined with "."
//!   middleware:     union, endpoint last
//!   subdomain:      closest non-null wins; endpoint beats every group
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::routing::descriptor::{Container, EndpointDescriptor, HttpMethod, MiddlewareSet, SubdomainConstraint};
use crate::routing::pattern::{check_braces, is_dynamic, PatternCache, PatternError};
use crate::routing::table::{RouteEntry, RouteTable};

/// Fatal errors raised while building the route table.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("duplicate route name {name:?} (declared by {first} and {second})")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("duplicate route {method} {path} (declared by {first} and {second})")]
    DuplicateRoute {
        method: HttpMethod,
        path: String,
        first: String,
        second: String,
    },

    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
}

pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Normalize a path fragment to `/segment` form: one leading slash, no
/// trailing slash. Empty fragments stay empty.
pub fn normalize_segment(segment: &str) -> String {
    let trimmed = segment.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Join already merged prefixes with the endpoint path; empty becomes `/`.
pub fn join_path<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let joined: String = parts.into_iter().map(normalize_segment).collect();
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}

/// Join name segments with `.`, skipping empty ones.
pub fn join_name<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|part| part.trim().trim_matches('.'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Group defaults merged along one ancestry chain.
#[derive(Debug, Default)]
struct MergedGroup<'a> {
    path_prefixes: Vec<&'a str>,
    name_prefixes: Vec<&'a str>,
    middleware: MiddlewareSet,
    subdomain: Option<&'a SubdomainConstraint>,
}

impl<'a> MergedGroup<'a> {
    fn from_container(container: &'a Container) -> Self {
        // Collected leaf to root, applied root to leaf.
        let mut chain: Vec<_> = container.ancestry().map(Container::group).collect();
        chain.reverse();

        let mut merged = MergedGroup::default();
        for group in chain.into_iter().flatten() {
            merged.path_prefixes.push(&group.path_prefix);
            merged.name_prefixes.push(&group.name_prefix);
            merged.middleware.union(&group.middleware);
            if group.subdomain.is_some() {
                merged.subdomain = group.subdomain.as_ref();
            }
        }
        merged
    }

    fn resolve(&self, container: &Container, endpoint: &EndpointDescriptor) -> RouteEntry {
        let full_path = join_path(
            self.path_prefixes
                .iter()
                .copied()
                .chain(std::iter::once(endpoint.path.as_str())),
        );
        let full_name = join_name(
            self.name_prefixes
                .iter()
                .copied()
                .chain(endpoint.name.as_deref()),
        );
        let mut middleware = self.middleware.clone();
        middleware.union(&endpoint.middleware);
        let subdomain = endpoint.subdomain.as_ref().or(self.subdomain).cloned();

        RouteEntry {
            container_id: container.id().to_string(),
            action_id: endpoint.action.clone(),
            method: endpoint.method,
            full_path,
            full_name,
            middleware,
            subdomain,
        }
    }
}

fn describe(entry: &RouteEntry) -> String {
    format!("{}@{}", entry.container_id, entry.action_id)
}

/// Builds a [`RouteTable`] from containers.
///
/// Not for concurrent use; freeze with [`Collector::into_table`] before
/// serving requests.
#[derive(Debug, Default)]
pub struct Collector {
    table: RouteTable,
    names: HashMap<String, String>,
    patterns: PatternCache,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every endpoint of `container`.
    ///
    /// Abstract containers are skipped; their endpoints are registered
    /// through the concrete containers that extend them.
    pub fn register(&mut self, container: &Container) -> RegistrationResult<()> {
        if container.is_abstract() {
            tracing::debug!(container = container.id(), "Skipping abstract container");
            return Ok(());
        }

        let merged = MergedGroup::from_container(container);
        let endpoints = container.endpoints();
        for endpoint in &endpoints {
            let entry = merged.resolve(container, endpoint);
            self.insert(entry)?;
        }

        tracing::debug!(
            container = container.id(),
            routes = endpoints.len(),
            "Registered container"
        );
        Ok(())
    }

    pub fn register_all<'a>(
        &mut self,
        containers: impl IntoIterator<Item = &'a Arc<Container>>,
    ) -> RegistrationResult<()> {
        for container in containers {
            self.register(container)?;
        }
        Ok(())
    }

    fn insert(&mut self, entry: RouteEntry) -> RegistrationResult<()> {
        if entry.has_name() {
            if let Some(first) = self.names.get(&entry.full_name) {
                let err = RegistrationError::DuplicateName {
                    name: entry.full_name.clone(),
                    first: first.clone(),
                    second: describe(&entry),
                };
                tracing::error!(error = %err, "Route registration failed");
                return Err(err);
            }
        }

        if let Some(first) = self.table.get(&entry.full_path, entry.method) {
            let err = RegistrationError::DuplicateRoute {
                method: entry.method,
                path: entry.full_path.clone(),
                first: describe(first),
                second: describe(&entry),
            };
            tracing::error!(error = %err, "Route registration failed");
            return Err(err);
        }

        let checked = check_braces(&entry.full_path).and_then(|()| {
            if is_dynamic(&entry.full_path) {
                self.patterns.get_or_compile(&entry.full_path).map(drop)
            } else {
                Ok(())
            }
        });
        if let Err(err) = checked {
            tracing::error!(error = %err, route = %describe(&entry), "Route registration failed");
            return Err(err.into());
        }

        if entry.has_name() {
            self.names.insert(entry.full_name.clone(), describe(&entry));
        }
        self.table.insert(entry);
        Ok(())
    }

    /// Routes registered so far.
    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    /// Freeze the table.
    pub fn into_table(self) -> RouteTable {
        self.table
    }

    /// Freeze the table, keeping the patterns compiled during registration.
    pub fn into_parts(self) -> (RouteTable, PatternCache) {
        (self.table, self.patterns)
    }
}
