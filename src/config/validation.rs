//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (`extends` names an existing container)
//! - Detect inheritance cycles and duplicate container ids
//! - Check methods, action ids and subdomain constraints
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RoutesConfig → Result<(), Vec<ValidationError>>
//! - Route-level conflicts (names, paths) are left to the collector

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::schema::RoutesConfig;
use crate::routing::descriptor::{HttpMethod, SubdomainConstraint};

/// A semantic problem in a route declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("container id must not be empty")]
    EmptyContainerId,

    #[error("container {0:?} is declared more than once")]
    DuplicateContainer(String),

    #[error("container {container:?} extends unknown container {parent:?}")]
    UnknownParent { container: String, parent: String },

    #[error("inheritance chain of {0:?} contains a cycle")]
    InheritanceCycle(String),

    #[error("container {container:?} has an endpoint without an action id")]
    EmptyAction { container: String },

    #[error("container {container:?} declares action {action:?} more than once")]
    DuplicateAction { container: String, action: String },

    #[error("container {container:?} action {action:?} uses unknown method {method:?}")]
    UnknownMethod {
        container: String,
        action: String,
        method: String,
    },

    #[error("container {container:?} has invalid subdomain {value:?}")]
    InvalidSubdomain { container: String, value: String },

    #[error("cache is enabled but cache.path is empty")]
    EmptyCachePath,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RoutesConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cache.enabled && config.cache.path.trim().is_empty() {
        errors.push(ValidationError::EmptyCachePath);
    }

    let mut parents: HashMap<&str, Option<&str>> = HashMap::new();
    for container in &config.containers {
        if container.id.trim().is_empty() {
            errors.push(ValidationError::EmptyContainerId);
            continue;
        }
        if parents
            .insert(container.id.as_str(), container.extends.as_deref())
            .is_some()
        {
            errors.push(ValidationError::DuplicateContainer(container.id.clone()));
        }

        let subdomains = container
            .group
            .iter()
            .filter_map(|g| g.subdomain.as_ref())
            .chain(container.endpoints.iter().filter_map(|e| e.subdomain.as_ref()));
        for value in subdomains {
            if SubdomainConstraint::parse(value).is_err() {
                errors.push(ValidationError::InvalidSubdomain {
                    container: container.id.clone(),
                    value: value.clone(),
                });
            }
        }

        let mut actions = HashSet::new();
        for endpoint in &container.endpoints {
            if endpoint.action.trim().is_empty() {
                errors.push(ValidationError::EmptyAction {
                    container: container.id.clone(),
                });
            } else if !actions.insert(endpoint.action.as_str()) {
                errors.push(ValidationError::DuplicateAction {
                    container: container.id.clone(),
                    action: endpoint.action.clone(),
                });
            }
            if endpoint.method.parse::<HttpMethod>().is_err() {
                errors.push(ValidationError::UnknownMethod {
                    container: container.id.clone(),
                    action: endpoint.action.clone(),
                    method: endpoint.method.clone(),
                });
            }
        }
    }

    for (&id, &parent) in &parents {
        if let Some(parent) = parent {
            if !parents.contains_key(parent) {
                errors.push(ValidationError::UnknownParent {
                    container: id.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
    }

    // Report cycles in declaration order for stable output.
    for container in &config.containers {
        let mut seen = HashSet::new();
        let mut current = Some(container.id.as_str());
        while let Some(id) = current {
            if !seen.insert(id) {
                errors.push(ValidationError::InheritanceCycle(container.id.clone()));
                break;
            }
            current = parents.get(id).copied().flatten();
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
