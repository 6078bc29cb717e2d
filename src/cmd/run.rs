//! `waypoint run`: start the proxy server.
//!
//! Loads the config file, builds the modifier registry and forwarding
//! engine, starts the Axum HTTP server with graceful shutdown, and spawns
//! a background loop that rebuilds the engine when the file changes.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cli::RunArgs;
use crate::config::model::Config;
use crate::config::{sources, ConfigSource};
use crate::error::WaypointError;
use crate::logging;
use crate::server::{self, AppState, LoadedEngine, Stats};

pub async fn execute(args: RunArgs) -> Result<(), WaypointError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let source = resolve_file_source(args.config.as_deref()).await?;
    let (mut config, version) = source.load().await?;
    apply_overrides(&mut config, args.timeout);

    let http_client = server::build_http_client();
    let engine = server::build_engine(&config, &http_client)?;
    let registrations = engine.registry().len();

    let state = Arc::new(AppState {
        engine: tokio::sync::RwLock::new(LoadedEngine {
            engine: Arc::new(engine),
            version,
            source_name: source.name().to_string(),
            loaded_at: Instant::now(),
        }),
        http_client,
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    // Shutdown signal: sending on shutdown_tx stops the refresh loop
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let refresh_state = state.clone();
    let poll_interval = args.poll_interval;
    let timeout_override = args.timeout;
    let refresh_handle = tokio::spawn(async move {
        config_refresh_loop(
            refresh_state,
            source,
            poll_interval,
            timeout_override,
            shutdown_rx,
        )
        .await;
    });

    let router = server::build_router(state, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        upstream = %config.upstream,
        modifiers = config.modifiers.len(),
        registrations,
        "waypoint started"
    );

    let graceful_shutdown = async move {
        server::shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(graceful_shutdown)
        .await?;

    if let Err(e) = refresh_handle.await {
        tracing::error!(error = %e, "config refresh task failed");
    }

    tracing::info!("waypoint stopped");
    Ok(())
}

fn apply_overrides(config: &mut Config, timeout: Option<u64>) {
    if let Some(timeout) = timeout {
        config.defaults.timeout = timeout;
    }
}

async fn resolve_file_source(
    explicit: Option<&std::path::Path>,
) -> Result<Box<dyn ConfigSource>, WaypointError> {
    if let Some(path) = explicit {
        return sources::for_path(path);
    }

    // Auto-detect in current directory
    let candidates = [
        "waypoint.yaml",
        "waypoint.yml",
        "waypoint.json",
        "waypoint.toml",
    ];

    for name in &candidates {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return sources::for_path(&path);
        }
    }

    Err(WaypointError::NoConfigSource {
        hint: "Provide --config <file>.\n  \
               Run 'waypoint init' to create a config file."
            .into(),
    })
}

async fn config_refresh_loop(
    state: Arc<AppState>,
    source: Box<dyn ConfigSource>,
    interval_secs: u64,
    timeout_override: Option<u64>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.tick().await; // Skip first immediate tick

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => {
                tracing::debug!("config refresh loop shutting down");
                return;
            }
        }

        let current_version = {
            let loaded = state.engine.read().await;
            loaded.version.clone()
        };

        match source.has_changed(&current_version).await {
            Ok(true) => {
                tracing::info!("config change detected, reloading");
                let rebuilt = source.load().await.and_then(|(mut config, version)| {
                    apply_overrides(&mut config, timeout_override);
                    let engine = server::build_engine(&config, &state.http_client)?;
                    Ok((engine, version))
                });
                match rebuilt {
                    Ok((engine, version)) => {
                        let registrations = engine.registry().len();
                        let mut loaded = state.engine.write().await;
                        loaded.engine = Arc::new(engine);
                        loaded.version = version;
                        loaded.loaded_at = Instant::now();
                        drop(loaded);
                        state.stats.config_reloads.fetch_add(1, Ordering::Relaxed);
                        tracing::info!(registrations, "config reloaded");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "config reload failed, keeping current config");
                    }
                }
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "config change check failed");
            }
        }
    }
}
