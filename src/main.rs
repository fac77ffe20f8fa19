//! Route engine CLI.
//!
//! ```text
//! routes.toml ─▶ config ─▶ collector ─▶ RouteTable ─▶ router ─▶ dispatch / uri
//!                               │                        ▲
//!                               └──▶ route cache ────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use route_engine::cache::RouteCache;
use route_engine::config::{load_config, ConfigWatcher, RoutesConfig};
use route_engine::lifecycle::{boot, rebuild_cache, RouteSource};
use route_engine::observability::logging;
use route_engine::routing::Router;

#[derive(Parser)]
#[command(name = "route-engine")]
#[command(about = "Inspect, dispatch and cache declared routes", long_about = None)]
struct Cli {
    /// Route declaration file.
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the route table
    List,
    /// Find the route for a request
    Dispatch {
        method: String,
        path: String,
        #[arg(long)]
        host: Option<String>,
    },
    /// Build the URI of a named route
    Uri { name: String, params: Vec<String> },
    /// Manage the route cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Rebuild the route cache whenever the declaration file changes
    Watch,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Collect routes and write the cache artifact
    Build,
    /// Delete the cache artifact
    Clear,
    /// Show whether a cache artifact exists
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init(&config.observability);

    tracing::debug!(config = %cli.config.display(), "Configuration loaded");

    match cli.command {
        Commands::List => {
            let router = load_router(&config)?;
            print_table(&router);
        }
        Commands::Dispatch { method, path, host } => {
            let router = load_router(&config)?;
            match router.dispatch(&path, &method, host.as_deref()) {
                Some(found) => {
                    println!("{}@{}", found.container(), found.action());
                    println!("  name:       {}", found.name());
                    println!("  middleware: {}", found.entry.middleware);
                    println!("  params:     {:?}", found.params);
                }
                None => {
                    println!("no route for {} {}", method.to_uppercase(), path);
                    std::process::exit(1);
                }
            }
        }
        Commands::Uri { name, params } => {
            let router = load_router(&config)?;
            match router.search_uri(&name, &params) {
                Some(uri) => println!("{}", uri),
                None => {
                    println!("no route named {}", name);
                    std::process::exit(1);
                }
            }
        }
        Commands::Cache { action } => {
            let cache = RouteCache::new(&config.cache.path);
            match action {
                CacheAction::Build => {
                    let artifact = rebuild_cache(&config)?;
                    println!(
                        "cached {} routes ({} patterns) to {}",
                        artifact.routes.len(),
                        artifact.patterns.len(),
                        cache.path().display()
                    );
                }
                CacheAction::Clear => {
                    cache.clear()?;
                    println!("cleared {}", cache.path().display());
                }
                CacheAction::Status => {
                    if cache.is_cached() {
                        println!("cached at {}", cache.path().display());
                    } else {
                        println!("no cache at {}", cache.path().display());
                    }
                }
            }
        }
        Commands::Watch => watch(cli.config, config).await?,
    }

    Ok(())
}

fn load_router(config: &RoutesConfig) -> Result<Router, Box<dyn std::error::Error>> {
    let boot = boot(config)?;
    if boot.source == RouteSource::Cache {
        tracing::info!("Routes restored from cache");
    }
    Ok(boot.router)
}

fn print_table(router: &Router) {
    for entry in router.routes().entries() {
        let subdomain = entry
            .subdomain
            .as_ref()
            .map(|s| format!(" [{}]", s))
            .unwrap_or_default();
        println!(
            "{:<7} {:<40} {:<30} {}@{} ({}){}",
            entry.method,
            entry.full_path,
            entry.full_name,
            entry.container_id,
            entry.action_id,
            entry.middleware,
            subdomain
        );
    }
}

async fn watch(path: PathBuf, initial: RoutesConfig) -> Result<(), Box<dyn std::error::Error>> {
    rebuild_cache(&initial)?;

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            Some(config) = updates.recv() => {
                match rebuild_cache(&config) {
                    Ok(artifact) => tracing::info!(routes = artifact.routes.len(), "Route cache rebuilt"),
                    Err(e) => tracing::error!(error = %e, "Route cache rebuild failed, keeping previous cache"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watcher");
                break;
            }
        }
    }
    Ok(())
}
