use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use sha2::{Digest, Sha512};
use tokio::task::JoinHandle;

use super::shutdown::AdmissionPermit;
use crate::models::{JobId, JobState};
use crate::storage::JobRegistry;

/// SHA-512 of `secret`, URL-safe base64 encoded (padded).
pub fn digest(secret: &str) -> String {
    URL_SAFE.encode(Sha512::digest(secret.as_bytes()))
}

/// Background task for one admitted job: wait out the delay, then store the
/// digest, unless cancellation arrives first.
pub struct DelayedComputation {
    id: JobId,
    secret: String,
    delay: Duration,
    registry: Arc<JobRegistry>,
    permit: AdmissionPermit,
}

impl DelayedComputation {
    pub fn new(
        id: JobId,
        secret: String,
        delay: Duration,
        registry: Arc<JobRegistry>,
        permit: AdmissionPermit,
    ) -> Self {
        Self {
            id,
            secret,
            delay,
            registry,
            permit,
        }
    }

    pub fn spawn(self) -> JoinHandle<JobState> {
        tokio::spawn(self.run())
    }

    /// Run to completion. The permit is released on return whichever way the
    /// race went.
    pub async fn run(self) -> JobState {
        let DelayedComputation {
            id,
            secret,
            delay,
            registry,
            mut permit,
        } = self;

        tracing::debug!("Job {} is {}, waiting {:?}", id, JobState::Pending, delay);

        let state = tokio::select! {
            _ = permit.cancelled() => JobState::Aborted,
            _ = tokio::time::sleep(delay) => {
                if registry.complete(id, digest(&secret)).await {
                    JobState::Completed
                } else {
                    // Another writer got there first; nothing was stored by us.
                    JobState::Aborted
                }
            }
        };

        tracing::debug!("Job {} {}", id, state);
        drop(permit);
        state
    }
}
