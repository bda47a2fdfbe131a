//! Cross-entity integrity validator.
//!
//! Stateless batch scan over contracts, employees, and roles, optionally
//! scoped to one company, reporting typed issues. `auto_fix` resolves the
//! kinds that are pure status/timestamp writes; anything that would
//! require inventing data is reported for manual intervention instead.

use accord_storage::{
    CommitStore, ContractStore, EmployeeStore, HrStore, RoleStore, SettingsStore, WriteBatch,
};
use accord_types::{
    CompanyId, Contract, ContractId, ContractStatus, Employee, EmployeeId, EmployeeNumber,
    EmployeeStatus, SyncResult,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Approved contract whose employee record was never activated.
    EmployeeNotActivated,
    /// Resigned employee with the contract still approved.
    ResignedEmployeeContractOpen,
    /// Resigned employee missing a resignation date.
    ResignedNoDate,
    /// Approved contract with no employee number assigned.
    MissingEmployeeNumber,
    /// Approved contract whose employee number matches no employee.
    EmployeeNumberUnmatched,
    /// Working role without the employee link it requires.
    RoleMissingEmployeeLink,
    /// Employee record without a company id.
    EmployeeMissingCompany,
    /// Approved contract missing its approval timestamp.
    MissingApprovedAt,
}

impl IssueKind {
    pub fn code(self) -> &'static str {
        match self {
            IssueKind::EmployeeNotActivated => "employee_not_activated",
            IssueKind::ResignedEmployeeContractOpen => "resigned_employee_contract_open",
            IssueKind::ResignedNoDate => "resigned_no_date",
            IssueKind::MissingEmployeeNumber => "missing_employee_number",
            IssueKind::EmployeeNumberUnmatched => "employee_number_unmatched",
            IssueKind::RoleMissingEmployeeLink => "role_missing_employee_link",
            IssueKind::EmployeeMissingCompany => "employee_missing_company",
            IssueKind::MissingApprovedAt => "missing_approved_at",
        }
    }

    /// Resolvable by a mechanical status/timestamp write. The rest need
    /// data that must never be auto-invented.
    pub fn auto_fixable(self) -> bool {
        matches!(
            self,
            IssueKind::EmployeeNotActivated
                | IssueKind::ResignedEmployeeContractOpen
                | IssueKind::ResignedNoDate
                | IssueKind::MissingApprovedAt
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Warning,
    Error,
}

#[derive(Clone, Debug, Serialize)]
pub struct IntegrityIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<ContractId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeId>,
    pub message: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ValidationReport {
    pub scanned_contracts: usize,
    pub scanned_employees: usize,
    pub scanned_roles: usize,
    pub issues: Vec<IntegrityIssue>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ValidationSummary {
    pub total_issues: usize,
    pub auto_fixable: usize,
    pub manual: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AppliedFix {
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<ContractId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeId>,
    pub description: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct FixReport {
    pub dry_run: bool,
    pub fixed: Vec<AppliedFix>,
    pub skipped: Vec<IntegrityIssue>,
}

pub struct IntegrityValidator {
    store: Arc<dyn HrStore>,
}

impl IntegrityValidator {
    pub fn new(store: Arc<dyn HrStore>) -> Self {
        Self { store }
    }

    #[instrument(skip_all)]
    pub async fn validate_all(&self, company: Option<&CompanyId>) -> SyncResult<ValidationReport> {
        let contracts = match company {
            Some(company) => self.store.list_contracts_for_company(company).await?,
            None => self.store.list_contracts().await?,
        };
        let employees = self.store.list_employees(company).await?;
        let roles = self.store.list_roles(company).await?;

        let by_number: HashMap<(CompanyId, EmployeeNumber), &Employee> = employees
            .iter()
            .filter_map(|employee| {
                match (employee.company_id.clone(), employee.employee_number.clone()) {
                    (Some(company), Some(number)) => Some(((company, number), employee)),
                    _ => None,
                }
            })
            .collect();

        let mut issues = Vec::new();

        for contract in contracts
            .iter()
            .filter(|contract| contract.status == ContractStatus::Approved)
        {
            if contract.approved_at.is_none() {
                issues.push(IntegrityIssue {
                    kind: IssueKind::MissingApprovedAt,
                    severity: IssueSeverity::Warning,
                    contract_id: Some(contract.id.clone()),
                    employee_id: None,
                    message: format!("approved contract {} has no approval timestamp", contract.id),
                });
            }

            let Some(number) = &contract.employee_number else {
                issues.push(IntegrityIssue {
                    kind: IssueKind::MissingEmployeeNumber,
                    severity: IssueSeverity::Warning,
                    contract_id: Some(contract.id.clone()),
                    employee_id: None,
                    message: format!(
                        "approved contract {} has no employee number assigned",
                        contract.id
                    ),
                });
                continue;
            };

            let Some(employee) = by_number.get(&(contract.company_id.clone(), number.clone()))
            else {
                issues.push(IntegrityIssue {
                    kind: IssueKind::EmployeeNumberUnmatched,
                    severity: IssueSeverity::Error,
                    contract_id: Some(contract.id.clone()),
                    employee_id: None,
                    message: format!(
                        "contract {} references employee number {number} with no matching record",
                        contract.id
                    ),
                });
                continue;
            };

            match employee.status {
                EmployeeStatus::PreActive => issues.push(IntegrityIssue {
                    kind: IssueKind::EmployeeNotActivated,
                    severity: IssueSeverity::Warning,
                    contract_id: Some(contract.id.clone()),
                    employee_id: Some(employee.id.clone()),
                    message: format!(
                        "contract {} is approved but employee {} was never activated",
                        contract.id, employee.id
                    ),
                }),
                EmployeeStatus::Resigned => issues.push(IntegrityIssue {
                    kind: IssueKind::ResignedEmployeeContractOpen,
                    severity: IssueSeverity::Error,
                    contract_id: Some(contract.id.clone()),
                    employee_id: Some(employee.id.clone()),
                    message: format!(
                        "employee {} resigned but contract {} is still approved",
                        employee.id, contract.id
                    ),
                }),
                EmployeeStatus::Active => {}
            }
        }

        for employee in &employees {
            if employee.status == EmployeeStatus::Resigned && employee.resignation_date.is_none() {
                issues.push(IntegrityIssue {
                    kind: IssueKind::ResignedNoDate,
                    severity: IssueSeverity::Warning,
                    contract_id: None,
                    employee_id: Some(employee.id.clone()),
                    message: format!("resigned employee {} has no resignation date", employee.id),
                });
            }
            if employee.company_id.is_none() {
                issues.push(IntegrityIssue {
                    kind: IssueKind::EmployeeMissingCompany,
                    severity: IssueSeverity::Error,
                    contract_id: None,
                    employee_id: Some(employee.id.clone()),
                    message: format!("employee {} has no company id", employee.id),
                });
            }
        }

        for role in &roles {
            if role.role.requires_employee() && role.employee_id.is_none() {
                issues.push(IntegrityIssue {
                    kind: IssueKind::RoleMissingEmployeeLink,
                    severity: IssueSeverity::Warning,
                    contract_id: None,
                    employee_id: None,
                    message: format!(
                        "{:?} role of person {} in company {} has no employee link",
                        role.role, role.person_account_id, role.company_id
                    ),
                });
            }
        }

        Ok(ValidationReport {
            scanned_contracts: contracts.len(),
            scanned_employees: employees.len(),
            scanned_roles: roles.len(),
            issues,
            generated_at: Utc::now(),
        })
    }

    pub async fn summary(&self, company: Option<&CompanyId>) -> SyncResult<ValidationSummary> {
        let report = self.validate_all(company).await?;
        let mut by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut auto_fixable = 0;
        for issue in &report.issues {
            *by_kind.entry(issue.kind.code()).or_insert(0) += 1;
            if issue.kind.auto_fixable() {
                auto_fixable += 1;
            }
        }
        Ok(ValidationSummary {
            total_issues: report.issues.len(),
            auto_fixable,
            manual: report.issues.len() - auto_fixable,
            by_kind,
        })
    }

    /// Mechanically resolve the fixable issue kinds. All fixes ride one
    /// commit; a dry run commits nothing and reports what would change.
    #[instrument(skip_all, fields(dry_run))]
    pub async fn auto_fix(
        &self,
        company: Option<&CompanyId>,
        dry_run: bool,
    ) -> SyncResult<FixReport> {
        let report = self.validate_all(company).await?;
        let now = Utc::now();
        let today = now.date_naive();

        // Mutated copies keyed by id so overlapping issues touch one row.
        let mut contracts: HashMap<ContractId, Contract> = HashMap::new();
        let mut employees: HashMap<EmployeeId, Employee> = HashMap::new();
        let mut fixed = Vec::new();
        let mut skipped = Vec::new();
        let mut revoked_settings = Vec::new();

        for issue in report.issues {
            if !issue.kind.auto_fixable() {
                skipped.push(issue);
                continue;
            }
            match issue.kind {
                IssueKind::EmployeeNotActivated => {
                    let Some(id) = issue.employee_id.clone() else {
                        continue;
                    };
                    let Some(employee) = self.load_employee(&mut employees, &id).await? else {
                        continue;
                    };
                    employee.status = EmployeeStatus::Active;
                    employee.updated_at = now;
                    fixed.push(AppliedFix {
                        kind: issue.kind,
                        contract_id: issue.contract_id,
                        employee_id: Some(id),
                        description: "activated employee record".to_string(),
                    });
                }
                IssueKind::ResignedEmployeeContractOpen => {
                    let Some(id) = issue.contract_id.clone() else {
                        continue;
                    };
                    let Some(contract) = self.load_contract(&mut contracts, &id).await? else {
                        continue;
                    };
                    contract.status = ContractStatus::Terminated;
                    contract.terminated_at = Some(now);
                    contract.termination_reason = Some("resigned".to_string());
                    contract.updated_at = now;
                    if let Some(mut settings) = self.store.get_settings(&id).await? {
                        settings.revoke_all();
                        revoked_settings.push(settings);
                    }
                    fixed.push(AppliedFix {
                        kind: issue.kind,
                        contract_id: Some(id),
                        employee_id: issue.employee_id,
                        description: "terminated contract of resigned employee".to_string(),
                    });
                }
                IssueKind::ResignedNoDate => {
                    let Some(id) = issue.employee_id.clone() else {
                        continue;
                    };
                    let Some(employee) = self.load_employee(&mut employees, &id).await? else {
                        continue;
                    };
                    employee.resignation_date = Some(today);
                    employee.updated_at = now;
                    fixed.push(AppliedFix {
                        kind: issue.kind,
                        contract_id: None,
                        employee_id: Some(id),
                        description: "stamped resignation date".to_string(),
                    });
                }
                IssueKind::MissingApprovedAt => {
                    let Some(id) = issue.contract_id.clone() else {
                        continue;
                    };
                    let Some(contract) = self.load_contract(&mut contracts, &id).await? else {
                        continue;
                    };
                    contract.approved_at = Some(now);
                    contract.updated_at = now;
                    fixed.push(AppliedFix {
                        kind: issue.kind,
                        contract_id: Some(id),
                        employee_id: None,
                        description: "stamped approval timestamp".to_string(),
                    });
                }
                _ => skipped.push(issue),
            }
        }

        if !dry_run && !fixed.is_empty() {
            let mut batch = WriteBatch::new();
            for contract in contracts.into_values() {
                batch.put_contract(contract);
            }
            for settings in revoked_settings {
                batch.put_settings(settings);
            }
            for employee in employees.into_values() {
                batch.put_employee(employee);
            }
            self.store.commit(batch).await?;
            info!(fixes = fixed.len(), "integrity auto-fix applied");
        }

        Ok(FixReport {
            dry_run,
            fixed,
            skipped,
        })
    }

    async fn load_contract<'a>(
        &self,
        cache: &'a mut HashMap<ContractId, Contract>,
        id: &ContractId,
    ) -> SyncResult<Option<&'a mut Contract>> {
        if !cache.contains_key(id) {
            match self.store.get_contract(id).await? {
                Some(contract) => {
                    cache.insert(id.clone(), contract);
                }
                None => return Ok(None),
            }
        }
        Ok(cache.get_mut(id))
    }

    async fn load_employee<'a>(
        &self,
        cache: &'a mut HashMap<EmployeeId, Employee>,
        id: &EmployeeId,
    ) -> SyncResult<Option<&'a mut Employee>> {
        if !cache.contains_key(id) {
            match self.store.get_employee(id).await? {
                Some(employee) => {
                    cache.insert(id.clone(), employee);
                }
                None => return Ok(None),
            }
        }
        Ok(cache.get_mut(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_storage::memory::InMemoryHrStore;
    use accord_types::{
        ActorId, CompanyRole, CompanyRoleKind, ContractType, DataSharingSettings, PersonAccountId,
    };

    fn approved_contract(person: &str, company: &str, number: Option<&str>) -> Contract {
        let mut contract = Contract::new(
            PersonAccountId::new(person),
            CompanyId::new(company),
            ContractType::Regular,
            ActorId::new(person),
        );
        contract.status = ContractStatus::Approved;
        contract.approved_at = Some(Utc::now());
        contract.employee_number = number.map(EmployeeNumber::new);
        contract
    }

    fn employee(company: &str, number: &str, status: EmployeeStatus) -> Employee {
        let mut employee = Employee::new(CompanyId::new(company));
        employee.employee_number = Some(EmployeeNumber::new(number));
        employee.status = status;
        employee
    }

    async fn seed(store: &InMemoryHrStore, contracts: Vec<Contract>, employees: Vec<Employee>) {
        let mut batch = WriteBatch::new();
        for contract in contracts {
            let id = contract.id.clone();
            batch.put_contract(contract);
            batch.put_settings(DataSharingSettings::permissive_defaults(id));
        }
        for employee in employees {
            batch.put_employee(employee);
        }
        store.commit(batch).await.unwrap();
    }

    #[tokio::test]
    async fn resigned_without_date_is_reported_once_and_fixed() {
        let store = Arc::new(InMemoryHrStore::new());
        seed(
            &store,
            vec![],
            vec![employee("co1", "EMP-2020-0001", EmployeeStatus::Resigned)],
        )
        .await;
        let validator = IntegrityValidator::new(store.clone());

        let report = validator.validate_all(None).await.unwrap();
        let resigned: Vec<_> = report
            .issues
            .iter()
            .filter(|issue| issue.kind == IssueKind::ResignedNoDate)
            .collect();
        assert_eq!(resigned.len(), 1);

        let fix = validator.auto_fix(None, false).await.unwrap();
        assert_eq!(fix.fixed.len(), 1);

        let report = validator.validate_all(None).await.unwrap();
        assert!(report
            .issues
            .iter()
            .all(|issue| issue.kind != IssueKind::ResignedNoDate));
    }

    #[tokio::test]
    async fn dry_run_reports_without_writing() {
        let store = Arc::new(InMemoryHrStore::new());
        seed(
            &store,
            vec![],
            vec![employee("co1", "EMP-2020-0001", EmployeeStatus::Resigned)],
        )
        .await;
        let validator = IntegrityValidator::new(store.clone());

        let fix = validator.auto_fix(None, true).await.unwrap();
        assert!(fix.dry_run);
        assert_eq!(fix.fixed.len(), 1);

        let report = validator.validate_all(None).await.unwrap();
        assert_eq!(report.issues.len(), 1, "dry run must not mutate");
    }

    #[tokio::test]
    async fn missing_links_are_reported_not_invented() {
        let store = Arc::new(InMemoryHrStore::new());
        let unmatched = approved_contract("p1", "co1", Some("EMP-2020-0009"));
        let unlinked = approved_contract("p2", "co1", None);
        seed(&store, vec![unmatched.clone(), unlinked.clone()], vec![]).await;

        let mut batch = WriteBatch::new();
        batch.put_role(CompanyRole {
            person_account_id: PersonAccountId::new("p3"),
            company_id: CompanyId::new("co1"),
            role: CompanyRoleKind::Staff,
            employee_id: None,
        });
        store.commit(batch).await.unwrap();

        let validator = IntegrityValidator::new(store.clone());
        let summary = validator.summary(Some(&CompanyId::new("co1"))).await.unwrap();
        assert_eq!(summary.by_kind.get("employee_number_unmatched"), Some(&1));
        assert_eq!(summary.by_kind.get("missing_employee_number"), Some(&1));
        assert_eq!(summary.by_kind.get("role_missing_employee_link"), Some(&1));

        // None of these are auto-fixable; the fix pass skips them all.
        let fix = validator.auto_fix(None, false).await.unwrap();
        assert!(fix.fixed.is_empty());
        assert_eq!(fix.skipped.len(), 3);
    }

    #[tokio::test]
    async fn resigned_employee_contract_is_closed_by_autofix() {
        let store = Arc::new(InMemoryHrStore::new());
        let contract = approved_contract("p1", "co1", Some("EMP-2020-0001"));
        let mut resigned = employee("co1", "EMP-2020-0001", EmployeeStatus::Resigned);
        resigned.resignation_date = Some(Utc::now().date_naive());
        seed(&store, vec![contract.clone()], vec![resigned]).await;

        let validator = IntegrityValidator::new(store.clone());
        let fix = validator.auto_fix(None, false).await.unwrap();
        assert!(fix
            .fixed
            .iter()
            .any(|applied| applied.kind == IssueKind::ResignedEmployeeContractOpen));

        let current = store.get_contract(&contract.id).await.unwrap().unwrap();
        assert_eq!(current.status, ContractStatus::Terminated);
        assert!(current.terminated_at.is_some());
        let settings = store.get_settings(&contract.id).await.unwrap().unwrap();
        assert!(settings.authorized_groups().is_empty());

        let report = validator.validate_all(None).await.unwrap();
        assert!(report
            .issues
            .iter()
            .all(|issue| issue.kind != IssueKind::ResignedEmployeeContractOpen));
    }

    #[tokio::test]
    async fn pre_active_employee_is_activated() {
        let store = Arc::new(InMemoryHrStore::new());
        let contract = approved_contract("p1", "co1", Some("EMP-2020-0001"));
        seed(
            &store,
            vec![contract],
            vec![employee("co1", "EMP-2020-0001", EmployeeStatus::PreActive)],
        )
        .await;

        let validator = IntegrityValidator::new(store.clone());
        let report = validator.validate_all(None).await.unwrap();
        assert!(report
            .issues
            .iter()
            .any(|issue| issue.kind == IssueKind::EmployeeNotActivated));

        validator.auto_fix(None, false).await.unwrap();
        let employees = store.list_employees(None).await.unwrap();
        assert_eq!(employees[0].status, EmployeeStatus::Active);
    }
}
