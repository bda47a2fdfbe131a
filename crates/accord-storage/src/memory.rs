//! In-memory reference implementation of the Accord storage contract.
//!
//! Deterministic and test-friendly. Production deployments should back
//! the same traits with a transactional database; the batch commit
//! boundary here is the seam such a backend would implement.

use crate::batch::{CommitEvent, CommitObserver, CommitReceipt, WriteBatch, WriteOp};
use crate::traits::{
    ArchiveStore, CommitStore, ContractStore, EmployeeStore, ProfileStore, QueryWindow, RoleStore,
    SettingsStore, SyncLogStore,
};
use crate::{StorageError, StorageResult};
use accord_types::{
    CompanyId, CompanyRole, Contract, ContractId, DataSharingSettings, Employee, EmployeeId,
    EmployeeNumber, PersonAccountId, PersonalProfile, RetentionArchive, SyncLogEntry, SyncLogId,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct HrState {
    contracts: HashMap<ContractId, Contract>,
    settings: HashMap<ContractId, DataSharingSettings>,
    profiles: HashMap<PersonAccountId, PersonalProfile>,
    employees: HashMap<EmployeeId, Employee>,
    sync_logs: Vec<SyncLogEntry>,
    archives: HashMap<ContractId, RetentionArchive>,
    roles: Vec<CompanyRole>,
    employee_sequence: u64,
}

/// In-memory Accord storage adapter. One state-wide lock so a batch
/// commits atomically.
#[derive(Default)]
pub struct InMemoryHrStore {
    state: RwLock<HrState>,
    observers: RwLock<Vec<Arc<dyn CommitObserver>>>,
}

impl InMemoryHrStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn contract_exists(state: &HrState, staged: &[&Contract], id: &ContractId) -> bool {
        state.contracts.contains_key(id) || staged.iter().any(|contract| contract.id == *id)
    }

    /// Reject the batch before touching state, so a failed commit leaves
    /// storage exactly as it was.
    fn validate(state: &HrState, batch: &WriteBatch) -> StorageResult<()> {
        let mut staged: Vec<&Contract> = Vec::new();
        for op in batch.ops() {
            match op {
                WriteOp::PutContract(contract) => {
                    if !contract.status.is_terminal() {
                        let open_in_state = state.contracts.values().any(|existing| {
                            existing.id != contract.id
                                && !existing.status.is_terminal()
                                && existing.person_account_id == contract.person_account_id
                                && existing.company_id == contract.company_id
                        });
                        let open_in_batch = staged.iter().any(|other| {
                            other.id != contract.id
                                && !other.status.is_terminal()
                                && other.person_account_id == contract.person_account_id
                                && other.company_id == contract.company_id
                        });
                        if open_in_state || open_in_batch {
                            return Err(StorageError::InvariantViolation(format!(
                                "person {} already has an open contract with company {}",
                                contract.person_account_id, contract.company_id
                            )));
                        }
                    }
                    staged.push(contract);
                }
                WriteOp::PutSettings(settings) => {
                    if !Self::contract_exists(state, &staged, &settings.contract_id) {
                        return Err(StorageError::InvalidInput(format!(
                            "sharing settings reference unknown contract {}",
                            settings.contract_id
                        )));
                    }
                }
                WriteOp::AppendSyncLog(entry) => {
                    if !Self::contract_exists(state, &staged, &entry.contract_id) {
                        return Err(StorageError::InvalidInput(format!(
                            "sync log references unknown contract {}",
                            entry.contract_id
                        )));
                    }
                }
                WriteOp::PutArchive(archive) => {
                    if !Self::contract_exists(state, &staged, &archive.contract_id) {
                        return Err(StorageError::InvalidInput(format!(
                            "retention archive references unknown contract {}",
                            archive.contract_id
                        )));
                    }
                }
                WriteOp::PutProfile(_)
                | WriteOp::PutEmployee(_)
                | WriteOp::PutRole(_)
                | WriteOp::PurgeSyncLogs { .. } => {}
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CommitStore for InMemoryHrStore {
    async fn commit(&self, batch: WriteBatch) -> StorageResult<CommitReceipt> {
        if batch.is_empty() {
            return Err(StorageError::InvalidInput(
                "refusing to commit an empty batch".to_string(),
            ));
        }

        let (receipt, event) = {
            let mut state = self
                .state
                .write()
                .map_err(|_| StorageError::Backend("state lock poisoned".to_string()))?;

            Self::validate(&state, &batch)?;

            let committed_at = Utc::now();
            let ops_applied = batch.len();
            let mut sync_log_ids = Vec::new();
            let mut touched_profiles: Vec<PersonAccountId> = Vec::new();

            for op in batch.into_ops() {
                match op {
                    WriteOp::PutContract(contract) => {
                        state.contracts.insert(contract.id.clone(), contract);
                    }
                    WriteOp::PutSettings(settings) => {
                        state.settings.insert(settings.contract_id.clone(), settings);
                    }
                    WriteOp::PutProfile(profile) => {
                        let owner = profile.person_account_id.clone();
                        state.profiles.insert(owner.clone(), profile);
                        if !touched_profiles.contains(&owner) {
                            touched_profiles.push(owner);
                        }
                    }
                    WriteOp::PutEmployee(employee) => {
                        state.employees.insert(employee.id.clone(), employee);
                    }
                    WriteOp::AppendSyncLog(entry) => {
                        let id = SyncLogId::generate();
                        let sequence = state.sync_logs.len() as u64 + 1;
                        state.sync_logs.push(SyncLogEntry {
                            id: id.clone(),
                            sequence,
                            contract_id: entry.contract_id,
                            sync_type: entry.sync_type,
                            entity_type: entry.entity_type,
                            field_name: entry.field_name,
                            old_value: entry.old_value,
                            new_value: entry.new_value,
                            direction: entry.direction,
                            synced_by: entry.synced_by,
                            synced_at: entry.synced_at,
                        });
                        sync_log_ids.push(id);
                    }
                    WriteOp::PutArchive(archive) => {
                        state.archives.insert(archive.contract_id.clone(), archive);
                    }
                    WriteOp::PutRole(role) => {
                        let slot = state.roles.iter_mut().find(|existing| {
                            existing.person_account_id == role.person_account_id
                                && existing.company_id == role.company_id
                        });
                        match slot {
                            Some(existing) => *existing = role,
                            None => state.roles.push(role),
                        }
                    }
                    WriteOp::PurgeSyncLogs { contract_id } => {
                        state.sync_logs.retain(|log| log.contract_id != contract_id);
                    }
                }
            }

            (
                CommitReceipt {
                    sync_log_ids,
                    ops_applied,
                    committed_at,
                },
                CommitEvent {
                    touched_profiles,
                    committed_at,
                },
            )
        };

        if !event.touched_profiles.is_empty() {
            let observers = {
                let guard = self
                    .observers
                    .read()
                    .map_err(|_| StorageError::Backend("observer lock poisoned".to_string()))?;
                guard.clone()
            };
            for observer in observers {
                observer.on_commit(event.clone()).await;
            }
        }

        Ok(receipt)
    }

    fn register_commit_observer(&self, observer: Arc<dyn CommitObserver>) {
        if let Ok(mut guard) = self.observers.write() {
            guard.push(observer);
        }
    }
}

fn lock_err() -> StorageError {
    StorageError::Backend("state lock poisoned".to_string())
}

fn apply_window<T>(items: Vec<T>, window: QueryWindow) -> Vec<T> {
    let iter = items.into_iter().skip(window.offset);
    if window.limit == 0 {
        iter.collect()
    } else {
        iter.take(window.limit).collect()
    }
}

#[async_trait]
impl ContractStore for InMemoryHrStore {
    async fn get_contract(&self, id: &ContractId) -> StorageResult<Option<Contract>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        Ok(state.contracts.get(id).cloned())
    }

    async fn find_open_contract(
        &self,
        person: &PersonAccountId,
        company: &CompanyId,
    ) -> StorageResult<Option<Contract>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        Ok(state
            .contracts
            .values()
            .find(|contract| {
                !contract.status.is_terminal()
                    && contract.person_account_id == *person
                    && contract.company_id == *company
            })
            .cloned())
    }

    async fn list_contracts_for_person(
        &self,
        person: &PersonAccountId,
    ) -> StorageResult<Vec<Contract>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        let mut contracts: Vec<_> = state
            .contracts
            .values()
            .filter(|contract| contract.person_account_id == *person)
            .cloned()
            .collect();
        contracts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(contracts)
    }

    async fn list_contracts_for_company(
        &self,
        company: &CompanyId,
    ) -> StorageResult<Vec<Contract>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        let mut contracts: Vec<_> = state
            .contracts
            .values()
            .filter(|contract| contract.company_id == *company)
            .cloned()
            .collect();
        contracts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(contracts)
    }

    async fn list_contracts(&self) -> StorageResult<Vec<Contract>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        let mut contracts: Vec<_> = state.contracts.values().cloned().collect();
        contracts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(contracts)
    }
}

#[async_trait]
impl SettingsStore for InMemoryHrStore {
    async fn get_settings(
        &self,
        contract: &ContractId,
    ) -> StorageResult<Option<DataSharingSettings>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        Ok(state.settings.get(contract).cloned())
    }
}

#[async_trait]
impl ProfileStore for InMemoryHrStore {
    async fn get_profile(
        &self,
        person: &PersonAccountId,
    ) -> StorageResult<Option<PersonalProfile>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        Ok(state.profiles.get(person).cloned())
    }
}

#[async_trait]
impl EmployeeStore for InMemoryHrStore {
    async fn get_employee(&self, id: &EmployeeId) -> StorageResult<Option<Employee>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        Ok(state.employees.get(id).cloned())
    }

    async fn find_employee_by_number(
        &self,
        company: &CompanyId,
        number: &EmployeeNumber,
    ) -> StorageResult<Option<Employee>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        Ok(state
            .employees
            .values()
            .find(|employee| {
                employee.company_id.as_ref() == Some(company)
                    && employee.employee_number.as_ref() == Some(number)
            })
            .cloned())
    }

    async fn find_employee_by_name(
        &self,
        company: &CompanyId,
        name: &str,
    ) -> StorageResult<Option<Employee>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        Ok(state
            .employees
            .values()
            .find(|employee| {
                employee.company_id.as_ref() == Some(company)
                    && employee.legal_name.as_deref() == Some(name)
            })
            .cloned())
    }

    async fn list_employees(&self, company: Option<&CompanyId>) -> StorageResult<Vec<Employee>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        let mut employees: Vec<_> = state
            .employees
            .values()
            .filter(|employee| match company {
                Some(company) => employee.company_id.as_ref() == Some(company),
                None => true,
            })
            .cloned()
            .collect();
        employees.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(employees)
    }

    async fn next_employee_sequence(&self) -> StorageResult<u64> {
        let mut state = self.state.write().map_err(|_| lock_err())?;
        state.employee_sequence += 1;
        Ok(state.employee_sequence)
    }
}

#[async_trait]
impl SyncLogStore for InMemoryHrStore {
    async fn list_sync_logs(
        &self,
        contract: &ContractId,
        window: QueryWindow,
    ) -> StorageResult<Vec<SyncLogEntry>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        let mut logs: Vec<_> = state
            .sync_logs
            .iter()
            .filter(|log| log.contract_id == *contract)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        Ok(apply_window(logs, window))
    }

    async fn count_sync_logs(&self, contract: &ContractId) -> StorageResult<usize> {
        let state = self.state.read().map_err(|_| lock_err())?;
        Ok(state
            .sync_logs
            .iter()
            .filter(|log| log.contract_id == *contract)
            .count())
    }
}

#[async_trait]
impl ArchiveStore for InMemoryHrStore {
    async fn get_archive(&self, contract: &ContractId) -> StorageResult<Option<RetentionArchive>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        Ok(state.archives.get(contract).cloned())
    }

    async fn list_archives(&self) -> StorageResult<Vec<RetentionArchive>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        let mut archives: Vec<_> = state.archives.values().cloned().collect();
        archives.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(archives)
    }
}

#[async_trait]
impl RoleStore for InMemoryHrStore {
    async fn list_roles(&self, company: Option<&CompanyId>) -> StorageResult<Vec<CompanyRole>> {
        let state = self.state.read().map_err(|_| lock_err())?;
        Ok(state
            .roles
            .iter()
            .filter(|role| match company {
                Some(company) => role.company_id == *company,
                None => true,
            })
            .cloned()
            .collect())
    }
}
