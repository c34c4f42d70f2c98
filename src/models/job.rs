use std::fmt;

/// Identifier handed back to the client at admission. Ids start at 1 and are never reused.
pub type JobId = u64;

/// Lifecycle of a single admitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Completed,
    Aborted,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Completed => "completed",
            JobState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Parse the id segment of a fetch path.
pub fn parse_job_id(raw: &str) -> Result<JobId, String> {
    if raw.is_empty() {
        return Err("Must provide valid id".to_string());
    }
    raw.parse::<JobId>()
        .map_err(|_| "ID must be a number".to_string())
}
