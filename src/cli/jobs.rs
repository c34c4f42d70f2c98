// CLI job commands: submit, get, stats

use reqwest::{Client, StatusCode};

use super::{base_url, handle_request_error};
use crate::models::{JobId, StatsReport};

/// hashd submit
pub async fn cmd_submit(host: &str, port: u16, password: &str) -> anyhow::Result<()> {
    let client = Client::new();
    let url = format!("{}/hash", base_url(host, port));

    let response = client
        .post(&url)
        .form(&[("password", password)])
        .send()
        .await
        .map_err(|e| handle_request_error(e, host, port))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read response: {}", e))?;

    match status {
        StatusCode::OK => {
            let id: JobId = body
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Unexpected response: {}", body))?;
            println!("{}", id);
            Ok(())
        }
        StatusCode::GONE => anyhow::bail!("Server is shutting down: {}", body.trim()),
        _ => anyhow::bail!("Server returned {}: {}", status, body.trim()),
    }
}

/// hashd get
pub async fn cmd_get(host: &str, port: u16, id: JobId) -> anyhow::Result<()> {
    let client = Client::new();
    let url = format!("{}/hash/{}", base_url(host, port), id);

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| handle_request_error(e, host, port))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read response: {}", e))?;

    match status {
        StatusCode::OK => {
            println!("{}", body);
            Ok(())
        }
        StatusCode::NOT_FOUND => {
            anyhow::bail!("No hash for job {} (unknown, still pending, or aborted)", id)
        }
        _ => anyhow::bail!("Server returned {}: {}", status, body.trim()),
    }
}

/// hashd stats
pub async fn cmd_stats(host: &str, port: u16) -> anyhow::Result<()> {
    let client = Client::new();
    let url = format!("{}/stats", base_url(host, port));

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| handle_request_error(e, host, port))?;

    if !response.status().is_success() {
        anyhow::bail!("Server returned {}", response.status());
    }

    let report: StatsReport = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse response: {}", e))?;

    println!("Total:   {}", report.total);
    println!("Average: {} us", report.average);
    Ok(())
}
