//! Endpoint and group declarations.
//!
//! # Responsibilities
//! - Describe one action (method, raw path, name, middleware, subdomain)
//! - Describe group defaults attached to a container
//! - Compose containers explicitly (a container names its parent)
//!
//! # Design Decisions
//! - Descriptors are immutable once built
//! - Inheritance is explicit: `ContainerBuilder::extends` instead of reflection
//! - Middleware sets keep first-insertion order

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
    Connect,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method string names no known HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Case-insensitive: `get`, `Get` and `GET` are the same method.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = match s.trim().to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "OPTIONS" => HttpMethod::Options,
            "TRACE" => HttpMethod::Trace,
            "CONNECT" => HttpMethod::Connect,
            _ => return Err(UnknownMethod(s.to_string())),
        };
        Ok(method)
    }
}

/// A middleware requirement carried by a route.
///
/// Either a bare tag (`auth`) or a keyed value (`throttle` = `60,1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Middleware {
    Tag(String),
    Keyed { key: String, value: String },
}

impl Middleware {
    pub fn tag(tag: impl Into<String>) -> Self {
        Middleware::Tag(tag.into())
    }

    pub fn keyed(key: impl Into<String>, value: impl Into<String>) -> Self {
        Middleware::Keyed {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Tag name, or key for keyed entries.
    pub fn name(&self) -> &str {
        match self {
            Middleware::Tag(tag) => tag,
            Middleware::Keyed { key, .. } => key,
        }
    }
}

impl fmt::Display for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Middleware::Tag(tag) => f.write_str(tag),
            Middleware::Keyed { key, value } => write!(f, "{}:{}", key, value),
        }
    }
}

impl From<&str> for Middleware {
    fn from(tag: &str) -> Self {
        Middleware::tag(tag)
    }
}

/// Ordered set of middleware.
///
/// Tags are deduplicated. A keyed entry replaces the value of an existing
/// entry with the same key, in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MiddlewareSet(Vec<Middleware>);

impl MiddlewareSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, middleware: Middleware) {
        let position = match &middleware {
            Middleware::Tag(_) => self.0.iter().position(|m| *m == middleware),
            Middleware::Keyed { key, .. } => self
                .0
                .iter()
                .position(|m| matches!(m, Middleware::Keyed { key: k, .. } if k == key)),
        };
        match position {
            Some(index) => self.0[index] = middleware,
            None => self.0.push(middleware),
        }
    }

    pub fn union(&mut self, other: &MiddlewareSet) {
        for middleware in other.iter() {
            self.insert(middleware.clone());
        }
    }

    pub fn contains_tag(&self, name: &str) -> bool {
        self.0.iter().any(|m| m.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Middleware> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<M: Into<Middleware>> FromIterator<M> for MiddlewareSet {
    fn from_iter<T: IntoIterator<Item = M>>(iter: T) -> Self {
        let mut set = MiddlewareSet::new();
        for middleware in iter {
            set.insert(middleware.into());
        }
        set
    }
}

impl fmt::Display for MiddlewareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, middleware) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", middleware)?;
        }
        Ok(())
    }
}

/// Requirement on the leftmost label of the request host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SubdomainConstraint {
    /// Label must equal this value (case-insensitive).
    Literal(String),
    /// Any label matches; it is captured under this name.
    Wildcard(String),
}

/// Returned for an empty subdomain or a malformed `{...}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid subdomain constraint: {0:?}")]
pub struct InvalidSubdomain(pub String);

impl SubdomainConstraint {
    pub fn parse(raw: &str) -> Result<Self, InvalidSubdomain> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(InvalidSubdomain(raw.to_string()));
        }
        if let Some(inner) = raw.strip_prefix('{') {
            let name = inner
                .strip_suffix('}')
                .filter(|name| is_identifier(name))
                .ok_or_else(|| InvalidSubdomain(raw.to_string()))?;
            return Ok(SubdomainConstraint::Wildcard(name.to_string()));
        }
        if raw.contains(['{', '}', '.', ':', '/']) {
            return Err(InvalidSubdomain(raw.to_string()));
        }
        Ok(SubdomainConstraint::Literal(raw.to_string()))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, SubdomainConstraint::Wildcard(_))
    }
}

impl TryFrom<String> for SubdomainConstraint {
    type Error = InvalidSubdomain;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SubdomainConstraint::parse(&value)
    }
}

impl From<SubdomainConstraint> for String {
    fn from(value: SubdomainConstraint) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SubdomainConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubdomainConstraint::Literal(label) => f.write_str(label),
            SubdomainConstraint::Wildcard(name) => write!(f, "{{{}}}", name),
        }
    }
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// One action bound to an HTTP method and a raw path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub action: String,
    pub method: HttpMethod,
    pub path: String,
    pub name: Option<String>,
    pub middleware: MiddlewareSet,
    pub subdomain: Option<SubdomainConstraint>,
}

impl EndpointDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            method,
            path: path.into(),
            name: None,
            middleware: MiddlewareSet::new(),
            subdomain: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    pub fn middleware<M: Into<Middleware>>(mut self, middleware: impl IntoIterator<Item = M>) -> Self {
        for m in middleware {
            self.middleware.insert(m.into());
        }
        self
    }

    pub fn subdomain(mut self, subdomain: SubdomainConstraint) -> Self {
        self.subdomain = Some(subdomain);
        self
    }
}

/// Defaults shared by every endpoint of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub path_prefix: String,
    pub name_prefix: String,
    pub middleware: MiddlewareSet,
    pub subdomain: Option<SubdomainConstraint>,
}

impl GroupDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn middleware<M: Into<Middleware>>(mut self, middleware: impl IntoIterator<Item = M>) -> Self {
        for m in middleware {
            self.middleware.insert(m.into());
        }
        self
    }

    pub fn subdomain(mut self, subdomain: SubdomainConstraint) -> Self {
        self.subdomain = Some(subdomain);
        self
    }
}

/// A logical endpoint container (a controller).
///
/// Containers form a chain through `parent`; endpoints and groups declared
/// on ancestors are inherited.
#[derive(Debug, Clone)]
pub struct Container {
    id: String,
    is_abstract: bool,
    group: Option<GroupDescriptor>,
    parent: Option<Arc<Container>>,
    endpoints: Vec<EndpointDescriptor>,
}

impl Container {
    pub fn builder(id: impl Into<String>) -> ContainerBuilder {
        ContainerBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn group(&self) -> Option<&GroupDescriptor> {
        self.group.as_ref()
    }

    pub fn parent(&self) -> Option<&Arc<Container>> {
        self.parent.as_ref()
    }

    /// Endpoints declared directly on this container.
    pub fn own_endpoints(&self) -> &[EndpointDescriptor] {
        &self.endpoints
    }

    /// Self first, then parent, grandparent, up to the root.
    pub fn ancestry(&self) -> impl Iterator<Item = &Container> {
        std::iter::successors(Some(self), |c| c.parent.as_deref())
    }

    /// Declared and inherited endpoints.
    ///
    /// Ancestor actions come first; an action redeclared closer to the leaf
    /// replaces the inherited one at the ancestor's position.
    pub fn endpoints(&self) -> Vec<&EndpointDescriptor> {
        let levels: Vec<&Container> = self.ancestry().collect();
        let mut merged: Vec<&EndpointDescriptor> = Vec::new();
        for level in levels.into_iter().rev() {
            for endpoint in &level.endpoints {
                match merged.iter_mut().find(|e| e.action == endpoint.action) {
                    Some(slot) => *slot = endpoint,
                    None => merged.push(endpoint),
                }
            }
        }
        merged
    }
}

/// Builder for [`Container`].
#[derive(Debug)]
pub struct ContainerBuilder {
    id: String,
    is_abstract: bool,
    group: Option<GroupDescriptor>,
    parent: Option<Arc<Container>>,
    endpoints: Vec<EndpointDescriptor>,
}

impl ContainerBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_abstract: false,
            group: None,
            parent: None,
            endpoints: Vec::new(),
        }
    }

    /// Mark as a base that exists only to be inherited from.
    pub fn abstract_base(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn group(mut self, group: GroupDescriptor) -> Self {
        self.group = Some(group);
        self
    }

    pub fn extends(mut self, parent: Arc<Container>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn endpoint(mut self, endpoint: EndpointDescriptor) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn build(self) -> Arc<Container> {
        Arc::new(Container {
            id: self.id,
            is_abstract: self.is_abstract,
            group: self.group,
            parent: self.parent,
            endpoints: self.endpoints,
        })
    }
}
