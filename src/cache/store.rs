//! Persisted route cache.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::metrics;
use crate::routing::descriptor::HttpMethod;
use crate::routing::pattern::{is_dynamic, PatternSource};
use crate::routing::table::RouteTable;

/// Format version written into every artifact.
pub const CACHE_VERSION: u32 = 1;

/// Errors reading or writing the cache artifact.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("route cache IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("route cache at {path} is not valid: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("route cache version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("route cache entry {method} {path} is inconsistent: {reason}")]
    Inconsistent {
        method: HttpMethod,
        path: String,
        reason: String,
    },
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Everything the cache persists: the table and its path patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheArtifact {
    pub version: u32,
    pub routes: RouteTable,
    pub patterns: BTreeMap<String, PatternSource>,
}

impl Default for CacheArtifact {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            routes: RouteTable::new(),
            patterns: BTreeMap::new(),
        }
    }
}

impl CacheArtifact {
    pub fn from_table(table: &RouteTable) -> Self {
        let patterns = table
            .paths()
            .filter(|path| is_dynamic(path))
            .map(|path| (path.to_string(), PatternSource::translate(path)))
            .collect();
        Self {
            version: CACHE_VERSION,
            routes: table.clone(),
            patterns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.patterns.is_empty()
    }

    /// Check that every entry sits under its own path and method and that
    /// route names are unique, as the collector guarantees.
    pub fn verify(&self) -> CacheResult<()> {
        let mut names = HashSet::new();
        for (path, method, entry) in self.routes.iter() {
            let reason = if entry.full_path != path {
                Some(format!("stored under path {:?}", entry.full_path))
            } else if entry.method != method {
                Some(format!("stored with method {}", entry.method))
            } else if entry.has_name() && !names.insert(entry.full_name.as_str()) {
                Some(format!("duplicate name {:?}", entry.full_name))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(CacheError::Inconsistent {
                    method,
                    path: path.to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

/// A cache artifact at a fixed location on disk.
#[derive(Debug, Clone)]
pub struct RouteCache {
    path: PathBuf,
}

impl RouteCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_cached(&self) -> bool {
        self.path.is_file()
    }

    /// Load the artifact; an absent file yields an empty artifact.
    pub fn get(&self) -> CacheResult<CacheArtifact> {
        if !self.is_cached() {
            metrics::record_cache_event("miss");
            return Ok(CacheArtifact::default());
        }

        let file = File::open(&self.path).map_err(|source| self.io_error(source))?;
        let artifact: CacheArtifact =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| CacheError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        if artifact.version != CACHE_VERSION {
            return Err(CacheError::UnsupportedVersion {
                found: artifact.version,
                expected: CACHE_VERSION,
            });
        }
        artifact.verify()?;

        metrics::record_cache_event("hit");
        tracing::info!(
            path = %self.path.display(),
            routes = artifact.routes.len(),
            patterns = artifact.patterns.len(),
            "Loaded route cache"
        );
        Ok(artifact)
    }

    /// Like [`RouteCache::get`], but a missing or unusable artifact is
    /// `None` and only logged.
    pub fn load(&self) -> Option<CacheArtifact> {
        match self.get() {
            Ok(artifact) if artifact.is_empty() => None,
            Ok(artifact) => Some(artifact),
            Err(e) => {
                metrics::record_cache_event("corrupt");
                tracing::warn!(error = %e, "Ignoring route cache, compiling routes on demand");
                None
            }
        }
    }

    /// Persist `table`, replacing any existing artifact.
    pub fn cache(&self, table: &RouteTable) -> CacheResult<CacheArtifact> {
        let artifact = CacheArtifact::from_table(table);
        self.write(&artifact)?;
        Ok(artifact)
    }

    pub fn write(&self, artifact: &CacheArtifact) -> CacheResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let tmp = self.path.with_extension("tmp");
        if let Err(e) = self.write_tmp(&tmp, artifact) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(source));
        }

        metrics::record_cache_event("write");
        tracing::info!(
            path = %self.path.display(),
            routes = artifact.routes.len(),
            patterns = artifact.patterns.len(),
            "Saved route cache"
        );
        Ok(())
    }

    fn write_tmp(&self, tmp: &Path, artifact: &CacheArtifact) -> CacheResult<()> {
        let file = File::create(tmp).map_err(|source| self.io_error(source))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, artifact).map_err(|source| CacheError::Serialize {
            path: tmp.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(|source| self.io_error(source))
    }

    /// Delete the artifact. Succeeds when there is nothing to delete.
    pub fn clear(&self) -> CacheResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                metrics::record_cache_event("clear");
                tracing::info!(path = %self.path.display(), "Cleared route cache");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{Collector, Container, EndpointDescriptor, HttpMethod};
    use pretty_assertions::assert_eq;

    fn table() -> RouteTable {
        let users = Container::builder("users")
            .endpoint(EndpointDescriptor::new(HttpMethod::Get, "/users", "index").named("users.index"))
            .endpoint(EndpointDescriptor::new(HttpMethod::Get, "/users/{id}", "show").named("users.show"))
            .build();
        let mut collector = Collector::new();
        collector.register(&users).unwrap();
        collector.into_table()
    }

    #[test]
    fn test_missing_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RouteCache::new(dir.path().join("routes.json"));

        assert!(!cache.is_cached());
        assert!(cache.get().unwrap().is_empty());
        assert!(cache.load().is_none());
        cache.clear().unwrap();
    }

    #[test]
    fn test_cache_creates_parent_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RouteCache::new(dir.path().join("var/cache/routes.json"));

        let written = cache.cache(&table()).unwrap();
        assert!(cache.is_cached());
        assert_eq!(written.patterns.len(), 1);
        assert!(written.patterns.contains_key("/users/{id}"));

        cache.cache(&RouteTable::new()).unwrap();
        assert!(cache.get().unwrap().routes.is_empty());
    }

    #[test]
    fn test_roundtrip_is_faithful() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RouteCache::new(dir.path().join("routes.json"));

        let written = cache.cache(&table()).unwrap();
        assert_eq!(cache.get().unwrap(), written);
    }

    #[test]
    fn test_output_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = RouteCache::new(dir.path().join("a.json"));
        let b = RouteCache::new(dir.path().join("b.json"));
        a.cache(&table()).unwrap();
        b.cache(&table()).unwrap();

        assert_eq!(fs::read(a.path()).unwrap(), fs::read(b.path()).unwrap());
    }

    #[test]
    fn test_corrupt_cache_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RouteCache::new(dir.path().join("routes.json"));
        fs::write(cache.path(), "{ not json").unwrap();

        assert!(matches!(cache.get(), Err(CacheError::Serialize { .. })));
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_other_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RouteCache::new(dir.path().join("routes.json"));
        let mut artifact = CacheArtifact::from_table(&table());
        artifact.version = 99;
        cache.write(&artifact).unwrap();

        assert!(matches!(
            cache.get(),
            Err(CacheError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_entry_under_wrong_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RouteCache::new(dir.path().join("routes.json"));
        let mut value = serde_json::to_value(CacheArtifact::from_table(&table())).unwrap();
        for entry in value["routes"]["/users"].as_object_mut().unwrap().values_mut() {
            entry["full_path"] = "/admin".into();
        }
        fs::write(cache.path(), serde_json::to_vec(&value).unwrap()).unwrap();

        assert!(matches!(
            cache.get(),
            Err(CacheError::Inconsistent { ref path, .. }) if path == "/users"
        ));
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_failed_write_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RouteCache::new(dir.path().join("routes.json"));
        // A directory in the way makes the final rename fail.
        fs::create_dir(cache.path()).unwrap();

        assert!(matches!(cache.cache(&table()), Err(CacheError::Io { .. })));
        assert!(!dir.path().join("routes.tmp").exists());
        assert!(!cache.is_cached());
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RouteCache::new(dir.path().join("routes.json"));
        cache.cache(&table()).unwrap();

        cache.clear().unwrap();
        assert!(!cache.is_cached());
        cache.clear().unwrap();
    }
}
