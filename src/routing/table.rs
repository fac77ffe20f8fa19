//! The route table produced by the collector.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::routing::descriptor::{HttpMethod, MiddlewareSet, SubdomainConstraint};

/// One registered route: a resolved endpoint with merged group defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub container_id: String,
    pub action_id: String,
    pub method: HttpMethod,
    pub full_path: String,
    /// Empty when neither the endpoint nor its groups declare a name.
    pub full_name: String,
    pub middleware: MiddlewareSet,
    pub subdomain: Option<SubdomainConstraint>,
}

impl RouteEntry {
    pub fn has_name(&self) -> bool {
        !self.full_name.is_empty()
    }
}

/// `full_path -> method -> entry`, in registration order.
///
/// Only the collector inserts; everything else reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    paths: IndexMap<String, IndexMap<HttpMethod, RouteEntry>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, entry: RouteEntry) {
        self.paths
            .entry(entry.full_path.clone())
            .or_default()
            .insert(entry.method, entry);
    }

    pub fn get(&self, path: &str, method: HttpMethod) -> Option<&RouteEntry> {
        self.paths.get(path).and_then(|methods| methods.get(&method))
    }

    pub fn methods(&self, path: &str) -> Option<&IndexMap<HttpMethod, RouteEntry>> {
        self.paths.get(path)
    }

    /// Distinct full paths in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// `(path key, method key, entry)` triples in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, HttpMethod, &RouteEntry)> {
        self.paths.iter().flat_map(|(path, methods)| {
            methods
                .iter()
                .map(move |(method, entry)| (path.as_str(), *method, entry))
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.paths.values().flat_map(|methods| methods.values())
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RouteEntry> {
        if name.is_empty() {
            return None;
        }
        self.entries().find(|entry| entry.full_name == name)
    }

    /// Number of routes (not paths).
    pub fn len(&self) -> usize {
        self.paths.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
