//! Host and subdomain matching.
//!
//! # Responsibilities
//! - Strip the port from a Host value
//! - Split the host into leftmost label and the rest
//! - Evaluate a route's subdomain constraint against the request host
//!
//! # Design Decisions
//! - Label comparison is case-insensitive (per HTTP spec)
//! - A single-label host (`localhost`) never carries a subdomain
//! - Routes without a constraint match any host, including none

use crate::routing::descriptor::SubdomainConstraint;

/// Outcome of matching a subdomain constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubdomainMatch {
    /// Matched; no value captured.
    Matched,
    /// Matched a wildcard; the leftmost label is captured.
    Captured(String),
    Rejected,
}

/// Remove a trailing `:port` from a Host value.
pub fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Split a host into its leftmost label and the remaining labels.
///
/// Returns `None` when fewer than two labels are present.
pub fn split_host(host: &str) -> Option<(&str, &str)> {
    let host = strip_port(host.trim());
    let (label, rest) = host.split_once('.')?;
    if label.is_empty() || rest.is_empty() {
        return None;
    }
    Some((label, rest))
}

/// Evaluate `constraint` against the request `host`.
pub fn match_subdomain(constraint: Option<&SubdomainConstraint>, host: Option<&str>) -> SubdomainMatch {
    let constraint = match constraint {
        Some(c) => c,
        None => return SubdomainMatch::Matched,
    };
    let (label, _rest) = match host.and_then(split_host) {
        Some(parts) => parts,
        None => return SubdomainMatch::Rejected,
    };
    match constraint {
        SubdomainConstraint::Literal(expected) if expected.eq_ignore_ascii_case(label) => {
            SubdomainMatch::Matched
        }
        SubdomainConstraint::Literal(_) => SubdomainMatch::Rejected,
        SubdomainConstraint::Wildcard(_) => SubdomainMatch::Captured(label.to_string()),
    }
}
