use crate::ids::{ActorId, CompanyId, ContractId, EmployeeNumber, PersonAccountId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a consent contract.
///
/// `Requested` moves to `Approved` or `Rejected`; an approved contract may
/// pass through `TerminationRequested` (still counted active) before
/// `Terminated`. `Rejected` and `Terminated` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Requested,
    Approved,
    Rejected,
    TerminationRequested,
    Terminated,
}

impl ContractStatus {
    /// Active means the employment relationship is live, including a
    /// pending termination request.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ContractStatus::Approved | ContractStatus::TerminationRequested
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ContractStatus::Rejected | ContractStatus::Terminated)
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ContractStatus::Requested => "requested",
            ContractStatus::Approved => "approved",
            ContractStatus::Rejected => "rejected",
            ContractStatus::TerminationRequested => "termination_requested",
            ContractStatus::Terminated => "terminated",
        };
        write!(f, "{label}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Regular,
    Fixed,
    PartTime,
    Secondment,
}

/// Consent record linking one person to one company, gating all data
/// movement between their two representations.
///
/// Invariant (enforced at commit): at most one non-terminal contract per
/// (person, company) pair. `employee_number` is assigned once by the
/// materialization path and never mutated elsewhere afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub person_account_id: PersonAccountId,
    pub company_id: CompanyId,
    pub status: ContractStatus,
    pub contract_type: ContractType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<EmployeeNumber>,
    pub requested_by: ActorId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn new(
        person_account_id: PersonAccountId,
        company_id: CompanyId,
        contract_type: ContractType,
        requested_by: ActorId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ContractId::generate(),
            person_account_id,
            company_id,
            status: ContractStatus::Requested,
            contract_type,
            position: None,
            department: None,
            employee_number: None,
            requested_by,
            approved_at: None,
            terminated_at: None,
            termination_reason: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
