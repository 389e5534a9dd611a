use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::task::{CommitState, CommitTask};
use super::ticker::{SleepTicker, Ticker};
use crate::error::CommitError;
use crate::journal::{EventJournal, EventLogEntry};
use crate::negotiation::DraftService;

/// Deferred-commit state machine for the record -> countdown -> publish flow.
///
/// Owns at most one task at a time. The countdown is a cooperative loop: the
/// injected [`Ticker`] paces it, each tick is applied under the task lock, and
/// cancellation revokes the next scheduled tick rather than preempting one in
/// flight.
pub struct PublishCommitController {
    drafts: Arc<dyn DraftService>,
    ticker: Arc<dyn Ticker>,
    journal: Arc<EventJournal>,
    task: Arc<StdMutex<Option<CommitTask>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl PublishCommitController {
    pub fn new(drafts: Arc<dyn DraftService>) -> Self {
        Self::with_ticker(drafts, Arc::new(SleepTicker::one_hz()))
    }

    /// Construct with a custom countdown clock (deterministic tests)
    pub fn with_ticker(drafts: Arc<dyn DraftService>, ticker: Arc<dyn Ticker>) -> Self {
        Self {
            drafts,
            ticker,
            journal: Arc::new(EventJournal::default()),
            task: Arc::new(StdMutex::new(None)),
            timer: Mutex::new(None),
        }
    }

    /// Begin the grace-period countdown for an uploaded resource.
    ///
    /// Errors if a task is already Pending — overlapping undo windows are not
    /// permitted, and the existing task is left untouched. Returns a snapshot
    /// of the new task.
    pub async fn start(
        &self,
        resource_id: &str,
        total_seconds: u32,
    ) -> Result<CommitTask, CommitError> {
        let snapshot = {
            let mut slot = self.lock_task();
            if let Some(existing) = slot.as_ref() {
                if existing.state == CommitState::Pending {
                    return Err(CommitError::AlreadyPending {
                        resource_id: existing.resource_id.clone(),
                    });
                }
            }

            let task = CommitTask::new(resource_id, total_seconds);
            *slot = Some(task.clone());
            task
        };

        self.journal.append(format!(
            "publish countdown started (resource={}, {}s)",
            resource_id, total_seconds
        ));
        info!(
            "Publish countdown started for {} ({}s grace period)",
            resource_id, total_seconds
        );

        let ticker = Arc::clone(&self.ticker);
        let task_slot = Arc::clone(&self.task);
        let journal = Arc::clone(&self.journal);

        let handle = tokio::spawn(async move {
            loop {
                ticker.wait().await;

                let applied = {
                    let mut slot = task_slot.lock().expect("commit task lock poisoned");
                    match slot.as_mut() {
                        Some(task) if task.state == CommitState::Pending => {
                            let state = task.tick();
                            Some((state, task.remaining_seconds, task.resource_id.clone()))
                        }
                        // Cancelled between ticks, or task replaced
                        _ => None,
                    }
                };

                match applied {
                    Some((CommitState::Committed, _, resource_id)) => {
                        journal.append(format!("resource {} published", resource_id));
                        info!("Grace period elapsed; {} is published", resource_id);
                        break;
                    }
                    Some((_, remaining, resource_id)) => {
                        debug!("Publish countdown for {}: {}s remaining", resource_id, remaining);
                    }
                    None => break,
                }
            }
        });

        if let Some(previous) = self.timer.lock().await.replace(handle) {
            previous.abort();
        }

        Ok(snapshot)
    }

    /// Cancel the pending countdown.
    ///
    /// Marks the task Cancelled, revokes the next scheduled tick, then issues
    /// exactly one delete call against the draft resource. If the delete
    /// fails the task stays Cancelled locally but the remote state is
    /// ambiguous, surfaced as [`CommitError::CancelFailed`].
    pub async fn cancel(&self) -> Result<(), CommitError> {
        let resource_id = {
            let mut slot = self.lock_task();
            match slot.as_mut() {
                None => {
                    return Err(CommitError::InvalidTransition {
                        state: "no task".to_string(),
                        action: "cancel".to_string(),
                    })
                }
                Some(task) if task.state != CommitState::Pending => {
                    return Err(CommitError::InvalidTransition {
                        state: task.state.name().to_string(),
                        action: "cancel".to_string(),
                    })
                }
                Some(task) => {
                    task.state = CommitState::Cancelled;
                    task.resource_id.clone()
                }
            }
        };

        self.journal
            .append(format!("publish countdown cancelled (resource={})", resource_id));

        if let Some(timer) = self.timer.lock().await.take() {
            timer.abort();
        }

        // Single undo attempt against the draft; not retried.
        match self.drafts.cancel_draft(&resource_id).await {
            Ok(()) => {
                self.journal
                    .append(format!("draft {} deleted", resource_id));
                info!("Draft {} deleted after cancellation", resource_id);
                Ok(())
            }
            Err(e) => {
                self.journal
                    .append(format!("draft delete failed for {}: {}", resource_id, e));
                Err(CommitError::CancelFailed {
                    resource_id,
                    source: e,
                })
            }
        }
    }

    /// Snapshot of the current task, if any
    pub fn current(&self) -> Option<CommitTask> {
        self.lock_task().clone()
    }

    /// Snapshot of the commit journal, oldest first
    pub fn journal_entries(&self) -> Vec<EventLogEntry> {
        self.journal.snapshot()
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<CommitTask>> {
        self.task.lock().expect("commit task lock poisoned")
    }
}
