//! Metrics collection.
//!
//! # Metrics
//! - `route_dispatch_total` (counter): dispatches by `outcome` (matched, not_found)
//! - `route_patterns_compiled_total` (counter): path patterns compiled
//! - `route_table_size` (gauge): routes held by the last router built
//! - `route_cache_events_total` (counter): cache `event` (hit, miss, corrupt, write, clear)
//!
//! # Design Decisions
//! - Facade only; updates are no-ops until a recorder is installed
//! - Labels are static strings, no per-path cardinality

use metrics::{counter, gauge};

pub fn record_dispatch(matched: bool) {
    let outcome = if matched { "matched" } else { "not_found" };
    counter!("route_dispatch_total", "outcome" => outcome).increment(1);
}

pub fn record_pattern_compiled() {
    counter!("route_patterns_compiled_total").increment(1);
}

pub fn record_table_size(routes: usize) {
    gauge!("route_table_size").set(routes as f64);
}

pub fn record_cache_event(event: &'static str) {
    counter!("route_cache_events_total", "event" => event).increment(1);
}
