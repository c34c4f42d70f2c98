use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds each job waits before its digest is computed.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    /// Starting value of the id counter. The first admitted job gets `id_offset + 1`.
    #[serde(default)]
    pub id_offset: u64,
    /// Upper bound on the drain wait at process shutdown. 0 waits forever.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_delay_secs() -> u64 {
    15
}

fn default_drain_timeout_secs() -> u64 {
    30
}

impl ServerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn drain_timeout(&self) -> Option<Duration> {
        match self.drain_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            delay_secs: default_delay_secs(),
            id_offset: 0,
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}
