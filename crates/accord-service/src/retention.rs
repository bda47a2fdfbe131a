//! Termination and retention.
//!
//! Terminating a contract is one commit: status and timestamps flip,
//! every consent flag is forced off, and a retention archive record is
//! scheduled in `pending`. The archival/deletion sweeps themselves are
//! out-of-band housekeeping; this service marks eligibility and owns the
//! one allowed sync-log remover, the bulk retention purge.

use crate::config::RetentionConfig;
use accord_storage::{
    ArchiveStore, CommitStore, ContractStore, HrStore, SettingsStore, SyncLogStore, WriteBatch,
};
use accord_types::{
    ActorId, ArchiveState, Contract, ContractId, ContractStatus, DataSharingSettings,
    PersonAccountId, RetentionArchive, SyncError, SyncResult,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone, Debug, Serialize)]
pub struct TerminationOutcome {
    pub contract: Contract,
    pub archive: RetentionArchive,
}

#[derive(Clone, Debug, Serialize)]
pub struct RetentionStatus {
    pub contract_id: ContractId,
    pub state: ArchiveState,
    pub terminated_at: DateTime<Utc>,
    pub retention_end: DateTime<Utc>,
    pub days_remaining: i64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PurgeReport {
    pub purged_contracts: Vec<ContractId>,
    pub logs_removed: usize,
}

pub struct TerminationService {
    store: Arc<dyn HrStore>,
    config: RetentionConfig,
}

impl TerminationService {
    pub fn new(store: Arc<dyn HrStore>, config: RetentionConfig) -> Self {
        Self { store, config }
    }

    /// Terminate a contract: revoke consent, stamp timestamps, schedule
    /// retention. Fails without mutation when already terminated.
    #[instrument(skip_all, fields(contract = %contract_id))]
    pub async fn terminate_contract(
        &self,
        contract_id: &ContractId,
        reason: &str,
        by: &ActorId,
    ) -> SyncResult<TerminationOutcome> {
        let mut contract = self
            .store
            .get_contract(contract_id)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("contract {contract_id} not found")))?;
        if contract.status == ContractStatus::Terminated {
            return Err(SyncError::InvalidState(format!(
                "contract {contract_id} is already terminated"
            )));
        }

        let now = Utc::now();
        contract.status = ContractStatus::Terminated;
        contract.terminated_at = Some(now);
        contract.termination_reason = Some(reason.to_string());
        contract.updated_at = now;

        // Consent revocation rides the same commit as the status change.
        let mut settings = self
            .store
            .get_settings(contract_id)
            .await?
            .unwrap_or_else(|| DataSharingSettings::all_revoked(contract_id.clone()));
        settings.revoke_all();

        let archive = RetentionArchive::pending(
            contract_id.clone(),
            now,
            now + Duration::days(self.config.retention_days),
        );

        let mut batch = WriteBatch::new();
        batch.put_contract(contract.clone());
        batch.put_settings(settings);
        batch.put_archive(archive.clone());
        self.store.commit(batch).await?;

        info!(contract = %contract_id, by = %by, reason, "contract terminated");
        Ok(TerminationOutcome { contract, archive })
    }

    pub async fn get_retention_status(
        &self,
        contract_id: &ContractId,
    ) -> SyncResult<RetentionStatus> {
        let archive = self
            .store
            .get_archive(contract_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!("no retention record for contract {contract_id}"))
            })?;
        let days_remaining = (archive.retention_end - Utc::now()).num_days().max(0);
        Ok(RetentionStatus {
            contract_id: archive.contract_id,
            state: archive.state,
            terminated_at: archive.terminated_at,
            retention_end: archive.retention_end,
            days_remaining,
        })
    }

    /// A person's terminated contracts, most recent termination first.
    pub async fn get_termination_history(
        &self,
        person: &PersonAccountId,
    ) -> SyncResult<Vec<Contract>> {
        let mut terminated: Vec<_> = self
            .store
            .list_contracts_for_person(person)
            .await?
            .into_iter()
            .filter(|contract| contract.status == ContractStatus::Terminated)
            .collect();
        terminated.sort_by(|a, b| b.terminated_at.cmp(&a.terminated_at));
        Ok(terminated)
    }

    /// Bulk retention purge: drop the sync logs of every archive past its
    /// retention end and mark the archive deleted. One commit for the
    /// whole sweep.
    #[instrument(skip_all)]
    pub async fn purge_expired_logs(&self) -> SyncResult<PurgeReport> {
        let now = Utc::now();
        let mut report = PurgeReport::default();
        let mut batch = WriteBatch::new();

        for mut archive in self.store.list_archives().await? {
            if archive.state == ArchiveState::Deleted || archive.retention_end > now {
                continue;
            }
            report.logs_removed += self.store.count_sync_logs(&archive.contract_id).await?;
            batch.purge_sync_logs(archive.contract_id.clone());
            archive.state = ArchiveState::Deleted;
            report.purged_contracts.push(archive.contract_id.clone());
            batch.put_archive(archive);
        }

        if !batch.is_empty() {
            self.store.commit(batch).await?;
            info!(
                contracts = report.purged_contracts.len(),
                logs = report.logs_removed,
                "retention purge complete"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_storage::memory::InMemoryHrStore;
    use accord_storage::QueryWindow;
    use accord_types::{
        CompanyId, ContractType, SyncDirection, SyncEntityType, SyncLogAppend, SyncType,
    };

    fn approved_contract(person: &str, company: &str) -> Contract {
        let mut contract = Contract::new(
            PersonAccountId::new(person),
            CompanyId::new(company),
            ContractType::Regular,
            ActorId::new(person),
        );
        contract.status = ContractStatus::Approved;
        contract.approved_at = Some(Utc::now());
        contract
    }

    async fn seed(store: &InMemoryHrStore, contract: &Contract) {
        let mut batch = WriteBatch::new();
        batch.put_contract(contract.clone());
        let mut settings = DataSharingSettings::permissive_defaults(contract.id.clone());
        settings.realtime_sync = true;
        batch.put_settings(settings);
        store.commit(batch).await.unwrap();
    }

    #[tokio::test]
    async fn termination_revokes_consent_and_schedules_retention() {
        let store = Arc::new(InMemoryHrStore::new());
        let contract = approved_contract("p1", "co1");
        seed(&store, &contract).await;
        let service = TerminationService::new(store.clone(), RetentionConfig::default());

        let outcome = service
            .terminate_contract(&contract.id, "resigned", &ActorId::new("admin"))
            .await
            .unwrap();

        assert_eq!(outcome.contract.status, ContractStatus::Terminated);
        assert!(outcome.contract.terminated_at.is_some());
        assert_eq!(outcome.contract.termination_reason.as_deref(), Some("resigned"));

        let settings = store.get_settings(&contract.id).await.unwrap().unwrap();
        assert!(!settings.realtime_sync);
        assert!(settings.authorized_groups().is_empty());

        let status = service.get_retention_status(&contract.id).await.unwrap();
        assert_eq!(status.state, ArchiveState::Pending);
        let window = status.retention_end - status.terminated_at;
        assert_eq!(window.num_days(), 1095);
        assert!(status.days_remaining > 1090);
    }

    #[tokio::test]
    async fn double_termination_fails_without_mutation() {
        let store = Arc::new(InMemoryHrStore::new());
        let contract = approved_contract("p1", "co1");
        seed(&store, &contract).await;
        let service = TerminationService::new(store.clone(), RetentionConfig::default());

        let first = service
            .terminate_contract(&contract.id, "resigned", &ActorId::new("admin"))
            .await
            .unwrap();
        let result = service
            .terminate_contract(&contract.id, "again", &ActorId::new("admin"))
            .await;
        assert!(matches!(result, Err(SyncError::InvalidState(_))));

        let current = store.get_contract(&contract.id).await.unwrap().unwrap();
        assert_eq!(
            current.terminated_at,
            first.contract.terminated_at,
            "second attempt must not restamp"
        );
        assert_eq!(current.termination_reason.as_deref(), Some("resigned"));
        assert_eq!(store.count_sync_logs(&contract.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let store = Arc::new(InMemoryHrStore::new());
        let service = TerminationService::new(store.clone(), RetentionConfig::default());
        let first = approved_contract("p1", "co1");
        seed(&store, &first).await;
        service
            .terminate_contract(&first.id, "resigned", &ActorId::new("admin"))
            .await
            .unwrap();

        let second = approved_contract("p1", "co2");
        seed(&store, &second).await;
        service
            .terminate_contract(&second.id, "contract ended", &ActorId::new("admin"))
            .await
            .unwrap();

        let history = service
            .get_termination_history(&PersonAccountId::new("p1"))
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
    }

    #[tokio::test]
    async fn purge_respects_the_retention_window() {
        let store = Arc::new(InMemoryHrStore::new());
        let contract = approved_contract("p1", "co1");
        seed(&store, &contract).await;

        let mut batch = WriteBatch::new();
        batch.append_sync_log(SyncLogAppend {
            contract_id: contract.id.clone(),
            sync_type: SyncType::Manual,
            entity_type: SyncEntityType::Employee,
            field_name: Some("mobile_phone".to_string()),
            old_value: None,
            new_value: Some("010-1234-5678".to_string()),
            direction: SyncDirection::PersonalToEmployee,
            synced_by: ActorId::new("admin"),
            synced_at: Utc::now(),
        });
        store.commit(batch).await.unwrap();

        let service = TerminationService::new(store.clone(), RetentionConfig::default());
        service
            .terminate_contract(&contract.id, "resigned", &ActorId::new("admin"))
            .await
            .unwrap();

        // Still inside the window: nothing to purge.
        let report = service.purge_expired_logs().await.unwrap();
        assert!(report.purged_contracts.is_empty());
        assert_eq!(store.count_sync_logs(&contract.id).await.unwrap(), 1);

        // A zero-day window purges immediately.
        let service = TerminationService::new(store.clone(), RetentionConfig { retention_days: 0 });
        let second = approved_contract("p2", "co1");
        seed(&store, &second).await;
        service
            .terminate_contract(&second.id, "resigned", &ActorId::new("admin"))
            .await
            .unwrap();
        let report = service.purge_expired_logs().await.unwrap();
        assert_eq!(report.purged_contracts, vec![second.id.clone()]);

        let status = service.get_retention_status(&second.id).await.unwrap();
        assert_eq!(status.state, ArchiveState::Deleted);
        assert!(store
            .list_sync_logs(&second.id, QueryWindow::default())
            .await
            .unwrap()
            .is_empty());
    }
}
