use crate::ids::{ActorId, ContractId, SyncLogId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    Auto,
    Manual,
    Initial,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    PersonalToEmployee,
    EmployeeToPersonal,
}

impl std::fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SyncDirection::PersonalToEmployee => "personal_to_employee",
            SyncDirection::EmployeeToPersonal => "employee_to_personal",
        };
        write!(f, "{label}")
    }
}

/// Which side of the pair a sync wrote to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEntityType {
    Employee,
    PersonalProfile,
}

/// Append payload for one audit row: a single changed scalar field
/// (`field_name` set, old/new stringified) or one relation batch
/// (`field_name` empty, old/new carrying counts only). Id and sequence are
/// assigned by storage at commit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncLogAppend {
    pub contract_id: ContractId,
    pub sync_type: SyncType,
    pub entity_type: SyncEntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub direction: SyncDirection,
    pub synced_by: ActorId,
    pub synced_at: DateTime<Utc>,
}

/// Canonical stored audit row. Never mutated; removed only by the bulk
/// retention purge.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub id: SyncLogId,
    pub sequence: u64,
    pub contract_id: ContractId,
    pub sync_type: SyncType,
    pub entity_type: SyncEntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub direction: SyncDirection,
    pub synced_by: ActorId,
    pub synced_at: DateTime<Utc>,
}
