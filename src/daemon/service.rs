use std::sync::Arc;
use std::time::{Duration, Instant};

use super::computation::DelayedComputation;
use super::shutdown::ShutdownCoordinator;
use super::stats::StatsCollector;
use crate::errors::ServiceError;
use crate::models::{JobId, ServerConfig, StatsReport};
use crate::storage::JobRegistry;

/// The hashing service. Built once at startup and shared by every handler.
pub struct HashService {
    registry: Arc<JobRegistry>,
    coordinator: Arc<ShutdownCoordinator>,
    stats: StatsCollector,
    delay: Duration,
}

impl HashService {
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_delay(config.delay(), config.id_offset)
    }

    pub fn with_delay(delay: Duration, id_offset: u64) -> Self {
        Self {
            registry: Arc::new(JobRegistry::with_offset(id_offset)),
            coordinator: Arc::new(ShutdownCoordinator::new()),
            stats: StatsCollector::new(),
            delay,
        }
    }

    /// Admit a secret: allocate an id and schedule its delayed digest.
    ///
    /// Nothing is allocated when the secret is empty or a drain has begun.
    pub async fn submit(&self, secret: &str) -> Result<JobId, ServiceError> {
        let start = Instant::now();

        if secret.is_empty() {
            tracing::warn!("Submission rejected: password missing");
            return Err(ServiceError::BadRequest(
                "required key password missing".to_string(),
            ));
        }

        let Some(permit) = self.coordinator.admit().await else {
            tracing::warn!("Submission rejected: server is draining");
            return Err(ServiceError::Draining(
                "Server is shutting down, no new work accepted".to_string(),
            ));
        };

        let Some(id) = self.registry.allocate() else {
            tracing::error!("Job id space exhausted");
            return Err(ServiceError::Internal("job id space exhausted".to_string()));
        };
        DelayedComputation::new(
            id,
            secret.to_string(),
            self.delay,
            Arc::clone(&self.registry),
            permit,
        )
        .spawn();

        self.stats.record_since(start).await;
        tracing::debug!("Job {} admitted", id);
        Ok(id)
    }

    pub async fn lookup(&self, id: JobId) -> Result<String, ServiceError> {
        if self.coordinator.is_draining().await {
            return Err(ServiceError::Draining(
                "Server is shutting down".to_string(),
            ));
        }
        self.registry
            .lookup(id)
            .await
            .ok_or_else(|| ServiceError::NotFound("Not found".to_string()))
    }

    pub async fn stats(&self) -> StatsReport {
        self.stats.report().await
    }

    /// Drain: refuse new work, cancel pending jobs, wait for all of them.
    /// Returns true for the call that started the drain.
    pub async fn shutdown(&self) -> bool {
        let initiated = self.coordinator.shutdown().await;
        if initiated {
            tracing::info!(
                "Service drained ({} digest(s) stored)",
                self.registry.completed_count().await
            );
        }
        initiated
    }

    pub async fn is_draining(&self) -> bool {
        self.coordinator.is_draining().await
    }

    /// Jobs admitted but not yet completed or aborted.
    pub fn outstanding(&self) -> usize {
        self.coordinator.outstanding()
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn coordinator(&self) -> &Arc<ShutdownCoordinator> {
        &self.coordinator
    }
}
