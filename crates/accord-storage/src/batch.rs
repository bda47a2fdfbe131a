//! The write boundary.
//!
//! Engines and services stage typed operations into a `WriteBatch`; the
//! caller that owns the operation commits the batch exactly once. A batch
//! is applied atomically: a rejected batch leaves storage untouched.

use accord_types::{
    CompanyRole, Contract, ContractId, DataSharingSettings, Employee, PersonAccountId,
    PersonalProfile, RetentionArchive, SyncLogAppend, SyncLogId,
};
use chrono::{DateTime, Utc};

/// One staged storage operation.
#[derive(Clone, Debug)]
pub enum WriteOp {
    PutContract(Contract),
    PutSettings(DataSharingSettings),
    PutProfile(PersonalProfile),
    PutEmployee(Employee),
    AppendSyncLog(SyncLogAppend),
    PutArchive(RetentionArchive),
    PutRole(CompanyRole),
    /// Bulk retention purge; the only operation that removes sync logs.
    PurgeSyncLogs { contract_id: ContractId },
}

/// Ordered set of operations committed as one unit.
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn put_contract(&mut self, contract: Contract) {
        self.push(WriteOp::PutContract(contract));
    }

    pub fn put_settings(&mut self, settings: DataSharingSettings) {
        self.push(WriteOp::PutSettings(settings));
    }

    pub fn put_profile(&mut self, profile: PersonalProfile) {
        self.push(WriteOp::PutProfile(profile));
    }

    pub fn put_employee(&mut self, employee: Employee) {
        self.push(WriteOp::PutEmployee(employee));
    }

    pub fn append_sync_log(&mut self, entry: SyncLogAppend) {
        self.push(WriteOp::AppendSyncLog(entry));
    }

    pub fn put_archive(&mut self, archive: RetentionArchive) {
        self.push(WriteOp::PutArchive(archive));
    }

    pub fn put_role(&mut self, role: CompanyRole) {
        self.push(WriteOp::PutRole(role));
    }

    pub fn purge_sync_logs(&mut self, contract_id: ContractId) {
        self.push(WriteOp::PurgeSyncLogs { contract_id });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// What a successful commit reports back.
#[derive(Clone, Debug)]
pub struct CommitReceipt {
    /// Storage-assigned ids for the staged sync-log rows, in stage order.
    pub sync_log_ids: Vec<SyncLogId>,
    pub ops_applied: usize,
    pub committed_at: DateTime<Utc>,
}

/// Delivered to observers after a batch is durably applied. Lists the
/// distinct owners of profile rows the batch wrote, duplicates collapsed.
#[derive(Clone, Debug)]
pub struct CommitEvent {
    pub touched_profiles: Vec<PersonAccountId>,
    pub committed_at: DateTime<Utc>,
}

/// Post-commit hook: notified outside the state lock, after durability,
/// in registration order. Only non-empty events are delivered.
#[async_trait::async_trait]
pub trait CommitObserver: Send + Sync {
    async fn on_commit(&self, event: CommitEvent);
}
