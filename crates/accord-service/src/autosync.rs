//! Commit-triggered auto-sync coordinator.
//!
//! Registered as a commit observer on the store: whenever a profile write
//! commits, the owning person lands in a pending set (duplicates
//! collapsed) which is drained once, after the source edit is already
//! durable. Each contract syncs in its own commit; failures are logged
//! and never propagate to the write that triggered them, and nothing is
//! retried until the next triggering edit or an explicit manual sync.
//!
//! The coordinator is explicitly constructed and dependency-injected so
//! tests can build, disable, and drop it freely; there is no process-wide
//! static.

use crate::orchestrator::{ContractSyncOutcome, SyncOrchestrator};
use accord_storage::{CommitEvent, CommitObserver};
use accord_types::{ActorId, PersonAccountId, SyncType};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub struct AutoSyncCoordinator {
    orchestrator: Arc<SyncOrchestrator>,
    enabled: AtomicBool,
    pending: Mutex<HashSet<PersonAccountId>>,
    draining: AtomicBool,
}

impl AutoSyncCoordinator {
    pub fn new(orchestrator: Arc<SyncOrchestrator>, enabled: bool) -> Arc<Self> {
        Arc::new(Self {
            orchestrator,
            enabled: AtomicBool::new(enabled),
            pending: Mutex::new(HashSet::new()),
            draining: AtomicBool::new(false),
        })
    }

    /// Idempotent; used to suspend derived writes during bulk imports.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Idempotent. While disabled, commit events are dropped entirely:
    /// a skipped sync is recovered by the next edit or a manual sync,
    /// never replayed.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn pop_pending(&self) -> Option<PersonAccountId> {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(_) => return None,
        };
        let next = pending.iter().next().cloned();
        if let Some(person) = &next {
            pending.remove(person);
        }
        next
    }

    fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|pending| !pending.is_empty())
            .unwrap_or(false)
    }

    async fn drain(&self) {
        while let Some(person) = self.pop_pending() {
            debug!(person = %person, "auto-sync pass for committed profile edit");
            match self
                .orchestrator
                .sync_all_contracts_for_user(&person, &ActorId::system(), SyncType::Auto)
                .await
            {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        if let ContractSyncOutcome::Failed { contract_id, error } = outcome {
                            warn!(
                                person = %person,
                                contract = %contract_id,
                                error = %error,
                                "auto-sync failed for contract; not retried"
                            );
                        }
                    }
                }
                Err(err) => {
                    warn!(person = %person, error = %err, "auto-sync pass failed; not retried");
                }
            }
        }
    }
}

#[async_trait]
impl CommitObserver for AutoSyncCoordinator {
    async fn on_commit(&self, event: CommitEvent) {
        if !self.is_enabled() {
            return;
        }

        {
            let mut pending = match self.pending.lock() {
                Ok(guard) => guard,
                Err(_) => return,
            };
            pending.extend(event.touched_profiles);
        }

        // One drain at a time; a drain already in flight on another task
        // will absorb the ids staged above.
        if self.draining.swap(true, Ordering::SeqCst) {
            return;
        }
        loop {
            self.drain().await;
            self.draining.store(false, Ordering::SeqCst);
            // Ids staged between the last pop and the flag reset.
            if !self.has_pending() || self.draining.swap(true, Ordering::SeqCst) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_storage::CommitEvent;
    use chrono::Utc;

    fn coordinator(enabled: bool) -> Arc<AutoSyncCoordinator> {
        let store = Arc::new(accord_storage::memory::InMemoryHrStore::new());
        let orchestrator = Arc::new(SyncOrchestrator::new(
            store,
            crate::config::ServiceConfig::default(),
        ));
        AutoSyncCoordinator::new(orchestrator, enabled)
    }

    #[tokio::test]
    async fn disabled_coordinator_drops_events() {
        let coordinator = coordinator(false);
        coordinator
            .on_commit(CommitEvent {
                touched_profiles: vec![PersonAccountId::new("p1")],
                committed_at: Utc::now(),
            })
            .await;
        assert!(!coordinator.has_pending());
    }

    #[tokio::test]
    async fn enable_and_disable_are_idempotent() {
        let coordinator = coordinator(true);
        coordinator.disable();
        coordinator.disable();
        assert!(!coordinator.is_enabled());
        coordinator.enable();
        coordinator.enable();
        assert!(coordinator.is_enabled());
    }

    #[tokio::test]
    async fn drain_for_person_without_contracts_is_a_no_op() {
        let coordinator = coordinator(true);
        coordinator
            .on_commit(CommitEvent {
                touched_profiles: vec![
                    PersonAccountId::new("p1"),
                    PersonAccountId::new("p1"),
                    PersonAccountId::new("p2"),
                ],
                committed_at: Utc::now(),
            })
            .await;
        // Drained synchronously; nothing left behind.
        assert!(!coordinator.has_pending());
        assert!(!coordinator.draining.load(Ordering::SeqCst));
    }
}
