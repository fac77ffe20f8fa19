//! Configuration schema definitions.
//!
//! This module defines the route declaration file. All types derive Serde
//! traits for deserialization from TOML; semantic checks live in
//! `validation.rs`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::validation::{validate_config, ValidationError};
use crate::routing::descriptor::{
    Container, EndpointDescriptor, GroupDescriptor, HttpMethod, Middleware, SubdomainConstraint,
};

/// Root of a route declaration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RoutesConfig {
    /// Route cache location.
    pub cache: CacheConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Endpoint containers, in registration order.
    pub containers: Vec<ContainerConfig>,
}

/// Route cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Load the table from the cache artifact when present.
    pub enabled: bool,

    /// Artifact path.
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "var/cache/routes.json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of human-readable logs.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// One endpoint container (a controller).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ContainerConfig {
    /// Unique container identifier.
    pub id: String,

    /// Base containers are only inherited from, never registered.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    /// Parent container id.
    #[serde(default)]
    pub extends: Option<String>,

    /// Group defaults for every endpoint of this container and its children.
    #[serde(default)]
    pub group: Option<GroupConfig>,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

/// Group defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GroupConfig {
    pub path_prefix: String,
    pub name_prefix: String,
    pub middleware: Vec<Middleware>,
    pub subdomain: Option<String>,
}

/// One endpoint action.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EndpointConfig {
    /// Action identifier, unique within the container.
    pub action: String,

    /// HTTP method (case-insensitive).
    pub method: String,

    /// Raw path pattern, relative to the group prefixes.
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub middleware: Vec<Middleware>,

    #[serde(default)]
    pub subdomain: Option<String>,
}

fn parse_subdomain(raw: &Option<String>) -> Option<SubdomainConstraint> {
    raw.as_deref().and_then(|s| SubdomainConstraint::parse(s).ok())
}

impl GroupConfig {
    fn to_descriptor(&self) -> GroupDescriptor {
        GroupDescriptor {
            path_prefix: self.path_prefix.clone(),
            name_prefix: self.name_prefix.clone(),
            middleware: self.middleware.iter().cloned().collect(),
            subdomain: parse_subdomain(&self.subdomain),
        }
    }
}

impl EndpointConfig {
    fn to_descriptor(&self) -> Option<EndpointDescriptor> {
        let method: HttpMethod = self.method.parse().ok()?;
        Some(EndpointDescriptor {
            action: self.action.clone(),
            method,
            path: self.path.clone(),
            name: self.name.clone().filter(|n| !n.is_empty()),
            middleware: self.middleware.iter().cloned().collect(),
            subdomain: parse_subdomain(&self.subdomain),
        })
    }
}

impl RoutesConfig {
    /// Validate and resolve `extends` into container chains.
    ///
    /// Containers are returned in declaration order.
    pub fn containers(&self) -> Result<Vec<Arc<Container>>, Vec<ValidationError>> {
        validate_config(self)?;

        let by_id: HashMap<&str, &ContainerConfig> =
            self.containers.iter().map(|c| (c.id.as_str(), c)).collect();
        let mut built: HashMap<String, Arc<Container>> = HashMap::new();

        let mut containers = Vec::with_capacity(self.containers.len());
        for config in &self.containers {
            containers.push(resolve(config, &by_id, &mut built));
        }
        Ok(containers)
    }
}

// Validation guarantees parents exist and chains are acyclic.
fn resolve(
    config: &ContainerConfig,
    by_id: &HashMap<&str, &ContainerConfig>,
    built: &mut HashMap<String, Arc<Container>>,
) -> Arc<Container> {
    if let Some(container) = built.get(&config.id) {
        return Arc::clone(container);
    }

    let mut builder = Container::builder(config.id.clone());
    if config.is_abstract {
        builder = builder.abstract_base();
    }
    if let Some(parent) = config.extends.as_deref().and_then(|id| by_id.get(id)) {
        builder = builder.extends(resolve(parent, by_id, built));
    }
    if let Some(group) = &config.group {
        builder = builder.group(group.to_descriptor());
    }
    for endpoint in config.endpoints.iter().filter_map(EndpointConfig::to_descriptor) {
        builder = builder.endpoint(endpoint);
    }

    let container = builder.build();
    built.insert(config.id.clone(), Arc::clone(&container));
    container
}
