use std::sync::Arc;

use tokio::sync::{watch, Mutex};

/// Drain state machine. Each transition happens at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainPhase {
    Running,
    Draining,
    Drained,
}

/// Tracks outstanding background jobs and coordinates the drain.
///
/// Admission and the Running -> Draining flip share one lock, so every job
/// is either counted before the drain starts waiting or refused outright.
pub struct ShutdownCoordinator {
    phase: Mutex<DrainPhase>,
    cancel_tx: watch::Sender<bool>,
    outstanding_tx: watch::Sender<usize>,
}

/// Proof that a job was admitted while running. Counts as one outstanding
/// job until dropped.
pub struct AdmissionPermit {
    coordinator: Arc<ShutdownCoordinator>,
    cancel_rx: watch::Receiver<bool>,
}

impl AdmissionPermit {
    /// Resolves once cancellation has been broadcast. Resolves immediately if
    /// the broadcast already happened.
    pub async fn cancelled(&mut self) {
        // The sender lives as long as the coordinator this permit holds, so
        // wait_for can only return once the flag is set.
        let _ = self.cancel_rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.coordinator.outstanding_tx.send_modify(|n| *n -= 1);
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (cancel_tx, _) = watch::channel(false);
        let (outstanding_tx, _) = watch::channel(0usize);
        Self {
            phase: Mutex::new(DrainPhase::Running),
            cancel_tx,
            outstanding_tx,
        }
    }

    /// Register a new unit of work. Returns None once draining has begun.
    pub async fn admit(self: &Arc<Self>) -> Option<AdmissionPermit> {
        let phase = self.phase.lock().await;
        if *phase != DrainPhase::Running {
            return None;
        }
        self.outstanding_tx.send_modify(|n| *n += 1);
        Some(AdmissionPermit {
            coordinator: Arc::clone(self),
            cancel_rx: self.cancel_tx.subscribe(),
        })
    }

    /// Flip to draining, broadcast cancellation, then wait until every
    /// outstanding permit has been dropped.
    ///
    /// Returns true for the call that started the drain. Later calls change
    /// nothing but still wait for the outstanding count to reach zero.
    pub async fn shutdown(&self) -> bool {
        let initiated = {
            let mut phase = self.phase.lock().await;
            if *phase == DrainPhase::Running {
                *phase = DrainPhase::Draining;
                self.cancel_tx.send_replace(true);
                true
            } else {
                false
            }
        };

        if initiated {
            tracing::info!(
                "Draining: cancellation broadcast to {} outstanding job(s)",
                self.outstanding()
            );
        }

        let mut outstanding_rx = self.outstanding_tx.subscribe();
        let _ = outstanding_rx.wait_for(|n| *n == 0).await;

        if initiated {
            *self.phase.lock().await = DrainPhase::Drained;
            tracing::info!("Drain complete");
        }
        initiated
    }

    pub async fn phase(&self) -> DrainPhase {
        *self.phase.lock().await
    }

    pub async fn is_draining(&self) -> bool {
        self.phase().await != DrainPhase::Running
    }

    pub fn outstanding(&self) -> usize {
        *self.outstanding_tx.borrow()
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
