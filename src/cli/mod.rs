pub mod daemon;
pub mod jobs;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// hashd - delayed password hashing server
#[derive(Parser, Debug)]
#[command(
    name = "hashd",
    version,
    about = "hashd - delayed password hashing server"
)]
pub struct Cli {
    /// Server host
    #[arg(long, default_value = "127.0.0.1", global = true)]
    pub host: String,

    /// Server port
    #[arg(long, default_value_t = 8080, global = true)]
    pub port: u16,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server in the foreground
    Start {
        /// Path to configuration file (JSON)
        #[arg(short = 'c', long = "config")]
        config: Option<String>,

        /// Seconds to wait before each hash is computed (overrides config)
        #[arg(short = 'd', long)]
        delay: Option<u64>,

        /// Starting value of the job id counter (overrides config)
        #[arg(long = "id-offset")]
        id_offset: Option<u64>,
    },

    /// Stop a running server, draining pending jobs
    Stop,

    /// Submit a password for hashing and print its job id
    Submit {
        /// Password to hash
        password: String,
    },

    /// Fetch the hash for a job id
    Get {
        /// Job id returned by submit
        id: u64,
    },

    /// Show admission statistics
    Stats,
}

/// Build the base URL for the server HTTP API.
pub fn base_url(host: &str, port: u16) -> String {
    format!("http://{}:{}", host, port)
}

/// Format a connection error message for when the server is not reachable.
pub fn connection_error_message(host: &str, port: u16) -> String {
    format!(
        "Could not connect to hashd at {}:{}. Is it running? (try: hashd start)",
        host, port
    )
}

/// Helper to handle reqwest errors and produce a user-friendly connection error.
pub(crate) fn handle_request_error(err: reqwest::Error, host: &str, port: u16) -> anyhow::Error {
    if err.is_connect() || err.is_timeout() {
        anyhow::anyhow!("{}", connection_error_message(host, port))
    } else {
        anyhow::anyhow!("Request failed: {}", err)
    }
}

/// Dispatch the CLI command to the appropriate handler.
/// Log level used when `RUST_LOG` is unset. The server logs at info, client
/// commands stay quiet unless something goes wrong.
pub fn default_log_level(cli: &Cli) -> &'static str {
    if cli.verbose {
        return "debug";
    }
    match cli.command {
        Some(Commands::Start { .. }) => "info",
        _ => "warn",
    }
}

/// Install the global tracing subscriber. `--verbose` forces debug;
/// otherwise `RUST_LOG` wins over the per-command default.
pub fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new(default_log_level(cli))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_log_level(cli).into())
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub async fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Start {
            config,
            delay,
            id_offset,
        }) => {
            daemon::cmd_start(
                &cli.host,
                cli.port,
                config.as_deref(),
                *delay,
                *id_offset,
            )
            .await
        }
        Some(Commands::Stop) => daemon::cmd_stop(&cli.host, cli.port).await,
        Some(Commands::Submit { password }) => {
            jobs::cmd_submit(&cli.host, cli.port, password).await
        }
        Some(Commands::Get { id }) => jobs::cmd_get(&cli.host, cli.port, *id).await,
        Some(Commands::Stats) => jobs::cmd_stats(&cli.host, cli.port).await,
        None => {
            // No subcommand provided -- print help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
