// CLI server commands: start, stop

use reqwest::Client;

use super::{base_url, handle_request_error};
use crate::models::ServerConfig;

/// hashd start
pub async fn cmd_start(
    host: &str,
    port: u16,
    config: Option<&str>,
    delay: Option<u64>,
    id_offset: Option<u64>,
) -> anyhow::Result<()> {
    let config_path = config.map(std::path::Path::new);
    let mut config = crate::daemon::load_config(config_path)?;

    // Global --host/--port only override the config file when they differ
    // from their defaults
    let defaults = ServerConfig::default();
    if host != defaults.host {
        config.host = host.to_string();
    }
    if port != defaults.port {
        config.port = port;
    }
    if let Some(d) = delay {
        config.delay_secs = d;
    }
    if let Some(offset) = id_offset {
        config.id_offset = offset;
    }

    crate::daemon::start_daemon(config).await
}

/// hashd stop
pub async fn cmd_stop(host: &str, port: u16) -> anyhow::Result<()> {
    let client = Client::new();
    let url = format!("{}/shutdown", base_url(host, port));

    let response = client
        .post(&url)
        .send()
        .await
        .map_err(|e| handle_request_error(e, host, port))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read response: {}", e))?;

    if !status.is_success() {
        anyhow::bail!("Server returned {}: {}", status, body.trim());
    }

    println!("{}", body.trim());
    Ok(())
}
