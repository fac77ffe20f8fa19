//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Map (method, path, host) to one route plus extracted parameters
//! - Resolve a route name and positional parameters back to a URI
//! - Memoize compiled patterns, optionally seeded from the route cache
//!
//! # Design Decisions
//! - Immutable table; the pattern memo is the only shared mutable state
//! - Exact lookup first, then dynamic paths in registration order
//! - First path match wins or fails; no fallback to a later path
//! - Unmatched requests are `None`, never an error

use std::sync::Arc;

use crate::cache::{CacheArtifact, CacheResult};
use crate::observability::metrics;
use crate::routing::descriptor::HttpMethod;
use crate::routing::matcher::{match_subdomain, SubdomainMatch};
use crate::routing::pattern::{
    fill_placeholders, is_dynamic, CompiledPattern, PatternCache, PatternSource,
};
use crate::routing::table::{RouteEntry, RouteTable};

/// A dispatched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    /// Wildcard subdomain capture first (if any), then path placeholders
    /// left to right.
    pub params: Vec<String>,
}

impl RouteMatch<'_> {
    pub fn container(&self) -> &str {
        &self.entry.container_id
    }

    pub fn action(&self) -> &str {
        &self.entry.action_id
    }

    pub fn name(&self) -> &str {
        &self.entry.full_name
    }
}

/// Runtime dispatcher over a frozen [`RouteTable`].
///
/// `Send + Sync`; share it behind an `Arc`.
#[derive(Debug)]
pub struct Router {
    table: RouteTable,
    patterns: PatternCache,
}

impl Router {
    /// Router that compiles every pattern on first use.
    pub fn new(table: RouteTable) -> Self {
        Self::with_memo(table, PatternCache::new())
    }

    /// Router reusing patterns compiled elsewhere (e.g. by the collector).
    pub fn with_memo(table: RouteTable, patterns: PatternCache) -> Self {
        metrics::record_table_size(table.len());
        Self { table, patterns }
    }

    /// Router over `table`, seeding the memo with the artifact's patterns.
    ///
    /// A cached pattern is used only when it is exactly the translation of
    /// a path in `table`; anything else is ignored and compiled from the
    /// path on demand.
    pub fn with_patterns(table: RouteTable, artifact: &CacheArtifact) -> Self {
        let router = Self::new(table);
        router.seed(artifact);
        router
    }

    /// Router restored entirely from a cache artifact.
    ///
    /// Fails when the cached table is not one the collector could have built.
    pub fn from_artifact(artifact: CacheArtifact) -> CacheResult<Self> {
        artifact.verify()?;
        let router = Self::new(artifact.routes.clone());
        router.seed(&artifact);
        Ok(router)
    }

    fn seed(&self, artifact: &CacheArtifact) {
        let mut seeded = 0usize;
        for (path, source) in &artifact.patterns {
            if self.table.methods(path).is_none() {
                tracing::warn!(path = %path, "Ignoring cached pattern for unknown path");
                continue;
            }
            if *source != PatternSource::translate(path) {
                tracing::warn!(path = %path, "Ignoring cached pattern that does not match its path");
                continue;
            }
            match CompiledPattern::from_source(path, source.clone()) {
                Ok(pattern) => {
                    self.patterns.publish(path, Arc::new(pattern));
                    seeded += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unusable cached pattern");
                }
            }
        }
        tracing::debug!(patterns = seeded, "Seeded pattern memo from cache");
    }

    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Compile every dynamic path now rather than on first request.
    ///
    /// Returns the number of patterns held afterwards.
    pub fn warm(&self) -> usize {
        for path in self.table.paths().filter(|p| is_dynamic(p)) {
            if let Err(e) = self.patterns.get_or_compile(path) {
                tracing::warn!(error = %e, "Pattern failed to compile");
            }
        }
        self.patterns.len()
    }

    /// Find the route for a request.
    ///
    /// `method` is matched case-insensitively; `path` is matched exactly,
    /// case-sensitively and without trailing-slash tolerance.
    pub fn dispatch(&self, path: &str, method: &str, host: Option<&str>) -> Option<RouteMatch<'_>> {
        let result = method
            .parse::<HttpMethod>()
            .ok()
            .and_then(|method| self.dispatch_method(path, method, host));

        metrics::record_dispatch(result.is_some());
        if result.is_none() {
            tracing::trace!(method, path, host, "No route matched");
        }
        result
    }

    pub fn dispatch_method(&self, path: &str, method: HttpMethod, host: Option<&str>) -> Option<RouteMatch<'_>> {
        if let Some(entry) = self.table.get(path, method) {
            return Self::finish(entry, Vec::new(), host);
        }

        for key in self.table.paths().filter(|p| is_dynamic(p)) {
            let pattern = match self.patterns.get_or_compile(key) {
                Ok(pattern) => pattern,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping route with uncompilable pattern");
                    continue;
                }
            };
            if let Some(params) = pattern.captures(path) {
                let entry = self.table.get(key, method)?;
                return Self::finish(entry, params, host);
            }
        }
        None
    }

    fn finish<'a>(entry: &'a RouteEntry, params: Vec<String>, host: Option<&str>) -> Option<RouteMatch<'a>> {
        match match_subdomain(entry.subdomain.as_ref(), host) {
            SubdomainMatch::Matched => Some(RouteMatch { entry, params }),
            SubdomainMatch::Captured(label) => {
                let mut all = Vec::with_capacity(params.len() + 1);
                all.push(label);
                all.extend(params);
                Some(RouteMatch { entry, params: all })
            }
            SubdomainMatch::Rejected => None,
        }
    }

    /// Build the URI of the route named `name`.
    ///
    /// Placeholders are filled left to right; any left over stay literal.
    /// A wildcard subdomain is not part of the result.
    pub fn search_uri<S: AsRef<str>>(&self, name: &str, params: &[S]) -> Option<String> {
        self.table
            .find_by_name(name)
            .map(|entry| fill_placeholders(&entry.full_path, params))
    }
}
