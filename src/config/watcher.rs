//! Declaration file watcher for cache rebuilds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RoutesConfig;

/// A watcher that monitors the declaration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RoutesConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RoutesConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in notify's background thread.
    ///
    /// The parent directory is watched so editors that replace the file
    /// (write to temp, rename) are still seen. Only configs that load and
    /// validate are sent; a broken edit keeps the previous routes. Dropping
    /// the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let target = self.path.clone();
        let tx = self.update_tx;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, &target) => reload(&target, &tx),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Route declaration watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Route declaration watcher started");
        Ok(watcher)
    }
}

fn touches(event: &Event, target: &Path) -> bool {
    let relevant = event.kind.is_modify() || event.kind.is_create();
    relevant
        && event
            .paths
            .iter()
            .any(|p| p.file_name().is_some() && p.file_name() == target.file_name())
}

fn reload(path: &Path, tx: &mpsc::UnboundedSender<RoutesConfig>) {
    match load_config(path) {
        Ok(config) => {
            tracing::info!(
                path = %path.display(),
                containers = config.containers.len(),
                "Route declarations changed"
            );
            let _ = tx.send(config);
        }
        Err(e) => {
            tracing::error!(error = %e, "Reload failed, keeping current routes");
        }
    }
}
