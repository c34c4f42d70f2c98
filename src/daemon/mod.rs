pub mod computation;
pub mod service;
pub mod shutdown;
pub mod stats;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::ServerConfig;
use crate::server::{self, AppState};
use service::HashService;

pub const CONFIG_ENV_VAR: &str = "HASHD_CONFIG";

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the ServerConfig:
///   1. --config CLI flag (passed as config_path); a missing file is an error
///   2. HASHD_CONFIG environment variable naming a JSON file
///   3. ServerConfig::default()
pub fn load_config(config_path: Option<&Path>) -> Result<ServerConfig> {
    if let Some(path) = config_path {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }
        return read_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return read_config_file(&path);
        }
        tracing::warn!(
            "{} points at {} which does not exist, using defaults",
            CONFIG_ENV_VAR,
            path.display()
        );
    }

    tracing::info!("No config file found, using defaults");
    Ok(ServerConfig::default())
}

fn read_config_file(path: &Path) -> Result<ServerConfig> {
    let content = std::fs::read_to_string(path).context("Failed to read config file")?;
    let config: ServerConfig =
        serde_json::from_str(&content).context("Failed to parse config file")?;
    tracing::info!("Loaded config from: {}", path.display());
    Ok(config)
}

// ---------------------------------------------------------------------------
// Daemon bootstrap
// ---------------------------------------------------------------------------

/// Run the server until Ctrl+C, SIGTERM, or a request to /shutdown, then
/// drain outstanding jobs and stop serving.
pub async fn start_daemon(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let service = Arc::new(HashService::new(&config));

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(());

    let state = Arc::new(AppState {
        service: Arc::clone(&service),
        config: Arc::clone(&config),
        shutdown_tx: Some(shutdown_tx.clone()),
    });

    let router = server::create_router(state);
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context(format!("Failed to bind to {}", bind_addr))?;

    tracing::info!(
        "Listening on http://{} (delay: {}s)",
        bind_addr,
        config.delay_secs
    );

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
                tracing::info!("HTTP server received shutdown signal");
            })
            .await
            .ok();
    });

    let mut api_shutdown_rx = shutdown_tx.subscribe();

    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C signal");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM signal");
            }
            _ = api_shutdown_rx.changed() => {
                tracing::info!("Received API shutdown signal");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C signal");
            }
            _ = api_shutdown_rx.changed() => {
                tracing::info!("Received API shutdown signal");
            }
        }
    }

    drain(&service, &config).await;

    let _ = shutdown_tx.send(());
    let _ = server_handle.await;

    tracing::info!("All done.");
    Ok(())
}

/// Drain the service, bounded by the configured timeout.
pub async fn drain(service: &HashService, config: &ServerConfig) {
    match config.drain_timeout() {
        Some(limit) => {
            if tokio::time::timeout(limit, service.shutdown()).await.is_err() {
                tracing::warn!(
                    "Drain did not finish within {:?}, {} job(s) still outstanding",
                    limit,
                    service.outstanding()
                );
            }
        }
        None => {
            service.shutdown().await;
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_load_config_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 9123, "delay_secs": 2, "id_offset": 5}}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.port, 9123);
        assert_eq!(config.delay_secs, 2);
        assert_eq!(config.id_offset, 5);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_load_config_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_config_invalid_json_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_cancels_pending_jobs() {
        let config = ServerConfig {
            delay_secs: 5,
            ..Default::default()
        };
        let service = HashService::new(&config);
        service.submit("a").await.unwrap();
        service.submit("b").await.unwrap();

        drain(&service, &config).await;
        assert_eq!(service.outstanding(), 0);
        assert!(service.is_draining().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_without_timeout() {
        let config = ServerConfig {
            delay_secs: 1,
            drain_timeout_secs: 0,
            ..Default::default()
        };
        let service = HashService::new(&config);
        service.submit("a").await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), drain(&service, &config))
            .await
            .expect("drain should finish promptly");
        assert_eq!(service.outstanding(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_gives_up_after_timeout() {
        let config = ServerConfig {
            delay_secs: 5,
            drain_timeout_secs: 2,
            ..Default::default()
        };
        let service = HashService::new(&config);
        service.submit("a").await.unwrap();
        let stuck = service.coordinator().admit().await.unwrap();

        let started = tokio::time::Instant::now();
        drain(&service, &config).await;
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(service.outstanding(), 1);
        assert!(service.is_draining().await);

        drop(stuck);
        assert_eq!(service.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_start_daemon_fails_when_port_taken() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = ServerConfig {
            port,
            ..Default::default()
        };
        let err = start_daemon(config).await.unwrap_err();
        assert!(err.to_string().contains("Failed to bind"));
    }
}
