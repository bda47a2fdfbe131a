use crate::batch::{CommitObserver, CommitReceipt, WriteBatch};
use crate::StorageResult;
use accord_types::{
    CompanyId, CompanyRole, Contract, ContractId, DataSharingSettings, Employee, EmployeeId,
    EmployeeNumber, PersonAccountId, PersonalProfile, RetentionArchive, SyncLogEntry,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Generic query window for paged reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

/// Storage interface for consent contracts.
#[async_trait]
pub trait ContractStore: Send + Sync {
    async fn get_contract(&self, id: &ContractId) -> StorageResult<Option<Contract>>;

    /// The one non-terminal contract for a (person, company) pair, if any.
    async fn find_open_contract(
        &self,
        person: &PersonAccountId,
        company: &CompanyId,
    ) -> StorageResult<Option<Contract>>;

    async fn list_contracts_for_person(
        &self,
        person: &PersonAccountId,
    ) -> StorageResult<Vec<Contract>>;

    async fn list_contracts_for_company(
        &self,
        company: &CompanyId,
    ) -> StorageResult<Vec<Contract>>;

    async fn list_contracts(&self) -> StorageResult<Vec<Contract>>;
}

/// Storage interface for per-contract sharing settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_settings(&self, contract: &ContractId)
        -> StorageResult<Option<DataSharingSettings>>;
}

/// Storage interface for personal profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(
        &self,
        person: &PersonAccountId,
    ) -> StorageResult<Option<PersonalProfile>>;
}

/// Storage interface for employee records.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn get_employee(&self, id: &EmployeeId) -> StorageResult<Option<Employee>>;

    async fn find_employee_by_number(
        &self,
        company: &CompanyId,
        number: &EmployeeNumber,
    ) -> StorageResult<Option<Employee>>;

    /// Materialization heuristic lookup by legal name within one company.
    async fn find_employee_by_name(
        &self,
        company: &CompanyId,
        name: &str,
    ) -> StorageResult<Option<Employee>>;

    async fn list_employees(&self, company: Option<&CompanyId>) -> StorageResult<Vec<Employee>>;

    /// Monotonic allocator for employee-number generation. Like a database
    /// sequence, an allocated value is never returned to the pool even if
    /// the surrounding operation fails.
    async fn next_employee_sequence(&self) -> StorageResult<u64>;
}

/// Storage interface for the append-only sync audit rows.
#[async_trait]
pub trait SyncLogStore: Send + Sync {
    /// Rows for one contract, newest-first.
    async fn list_sync_logs(
        &self,
        contract: &ContractId,
        window: QueryWindow,
    ) -> StorageResult<Vec<SyncLogEntry>>;

    async fn count_sync_logs(&self, contract: &ContractId) -> StorageResult<usize>;
}

/// Storage interface for retention archive records.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    async fn get_archive(&self, contract: &ContractId) -> StorageResult<Option<RetentionArchive>>;

    async fn list_archives(&self) -> StorageResult<Vec<RetentionArchive>>;
}

/// Storage interface for company role rows.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn list_roles(&self, company: Option<&CompanyId>) -> StorageResult<Vec<CompanyRole>>;
}

/// The atomic write boundary and its post-commit notification hook.
#[async_trait]
pub trait CommitStore: Send + Sync {
    /// Apply a batch all-or-nothing. Observers run after the state change
    /// is durable; their failures cannot undo the commit.
    async fn commit(&self, batch: WriteBatch) -> StorageResult<CommitReceipt>;

    fn register_commit_observer(&self, observer: Arc<dyn CommitObserver>);
}

/// Unified storage bundle the service layer is built against.
pub trait HrStore:
    ContractStore
    + SettingsStore
    + ProfileStore
    + EmployeeStore
    + SyncLogStore
    + ArchiveStore
    + RoleStore
    + CommitStore
    + Send
    + Sync
{
}

impl<T> HrStore for T where
    T: ContractStore
        + SettingsStore
        + ProfileStore
        + EmployeeStore
        + SyncLogStore
        + ArchiveStore
        + RoleStore
        + CommitStore
        + Send
        + Sync
{
}
