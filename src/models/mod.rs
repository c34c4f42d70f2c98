pub mod config;
pub mod job;
pub mod stats;

pub use config::ServerConfig;
pub use job::{JobId, JobState};
pub use stats::StatsReport;
