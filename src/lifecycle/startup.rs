//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve declarations into containers
//! - Build the route table, or restore it from the route cache
//! - Rebuild the route cache on request
//!
//! # Design Decisions
//! - Fail fast: any registration error is fatal
//! - Cache errors degrade to collecting from declarations

use thiserror::Error;

use crate::cache::{CacheArtifact, CacheError, RouteCache};
use crate::config::{ConfigError, RoutesConfig};
use crate::routing::{Collector, Router};

/// Errors that abort startup or a cache rebuild.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Where the running route table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    Cache,
    Declarations,
}

/// A ready router.
#[derive(Debug)]
pub struct Boot {
    pub router: Router,
    pub source: RouteSource,
}

/// Collect every container of `config` into a router.
pub fn build_router(config: &RoutesConfig) -> Result<Router, ConfigError> {
    let containers = config.containers()?;

    let mut collector = Collector::new();
    collector.register_all(&containers)?;
    let (table, patterns) = collector.into_parts();

    tracing::info!(
        containers = containers.len(),
        routes = table.len(),
        "Route table built"
    );
    Ok(Router::with_memo(table, patterns))
}

/// Build the router, preferring the route cache when enabled.
pub fn boot(config: &RoutesConfig) -> Result<Boot, ConfigError> {
    if config.cache.enabled {
        if let Some(artifact) = RouteCache::new(&config.cache.path).load() {
            match Router::from_artifact(artifact) {
                Ok(router) => {
                    return Ok(Boot {
                        router,
                        source: RouteSource::Cache,
                    })
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring route cache, collecting from declarations");
                }
            }
        }
    }

    Ok(Boot {
        router: build_router(config)?,
        source: RouteSource::Declarations,
    })
}

/// Collect from declarations and overwrite the route cache.
pub fn rebuild_cache(config: &RoutesConfig) -> Result<CacheArtifact, StartupError> {
    let router = build_router(config)?;
    let artifact = RouteCache::new(&config.cache.path).cache(router.routes())?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn config(cache_path: &std::path::Path) -> RoutesConfig {
        let mut config = parse_config(
            r#"
[[containers]]
id = "posts"
group = { path_prefix = "/posts", name_prefix = "posts" }

[[containers.endpoints]]
action = "show"
method = "GET"
path = "/{slug}"
name = "show"
"#,
        )
        .unwrap();
        config.cache.path = cache_path.display().to_string();
        config
    }

    #[test]
    fn test_boot_without_cache_collects() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir.path().join("routes.json"));

        let boot = boot(&config).unwrap();
        assert_eq!(boot.source, RouteSource::Declarations);
        assert!(boot.router.dispatch("/posts/hello", "GET", None).is_some());
    }

    #[test]
    fn test_boot_prefers_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir.path().join("routes.json"));
        rebuild_cache(&config).unwrap();

        let boot = boot(&config).unwrap();
        assert_eq!(boot.source, RouteSource::Cache);
        assert_eq!(boot.router.patterns().len(), 1);
        let m = boot.router.dispatch("/posts/hello", "GET", None).unwrap();
        assert_eq!(m.params, vec!["hello"]);
    }

    #[test]
    fn test_corrupt_cache_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(&path, "garbage").unwrap();

        let boot = boot(&config(&path)).unwrap();
        assert_eq!(boot.source, RouteSource::Declarations);
    }

    #[test]
    fn test_cache_disabled_ignores_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir.path().join("routes.json"));
        rebuild_cache(&config).unwrap();
        config.cache.enabled = false;

        assert_eq!(boot(&config).unwrap().source, RouteSource::Declarations);
    }
}
