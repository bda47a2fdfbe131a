use crate::ids::ContractId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a terminated contract's data sits in the retention pipeline.
/// `Archived` is set by the out-of-band warehouse export; this subsystem
/// only creates `Pending` records and marks `Deleted` after the purge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveState {
    Pending,
    Archived,
    Deleted,
}

/// Scheduled at termination; one per terminated contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetentionArchive {
    pub contract_id: ContractId,
    pub state: ArchiveState,
    pub terminated_at: DateTime<Utc>,
    pub retention_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RetentionArchive {
    pub fn pending(
        contract_id: ContractId,
        terminated_at: DateTime<Utc>,
        retention_end: DateTime<Utc>,
    ) -> Self {
        Self {
            contract_id,
            state: ArchiveState::Pending,
            terminated_at,
            retention_end,
            created_at: Utc::now(),
        }
    }
}
