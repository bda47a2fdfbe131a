//! Contract lifecycle service.
//!
//! Guarded status transitions with their consent side-effects riding the
//! same commit: approval is the single gate that provisions sharing
//! settings, and it never provisions twice.

use crate::orchestrator::SyncOrchestrator;
use accord_storage::{CommitStore, ContractStore, HrStore, SettingsStore, WriteBatch};
use accord_types::{
    ActorId, CompanyId, ConsentUpdate, Contract, ContractId, ContractStatus, ContractType,
    DataSharingSettings, PersonAccountId, SyncError, SyncResult, SyncType,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Input for opening a new consent contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractRequest {
    pub person_account_id: PersonAccountId,
    pub company_id: CompanyId,
    pub contract_type: ContractType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub requested_by: ActorId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub struct ContractService {
    store: Arc<dyn HrStore>,
    orchestrator: Arc<SyncOrchestrator>,
}

impl ContractService {
    pub fn new(store: Arc<dyn HrStore>, orchestrator: Arc<SyncOrchestrator>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    /// Open a contract in `requested` state. A person can hold at most
    /// one non-terminal contract per company.
    #[instrument(skip_all, fields(person = %request.person_account_id, company = %request.company_id))]
    pub async fn request_contract(&self, request: ContractRequest) -> SyncResult<Contract> {
        if request.person_account_id.0.trim().is_empty() {
            return Err(SyncError::Validation(
                "person account id must not be empty".to_string(),
            ));
        }
        if request.company_id.0.trim().is_empty() {
            return Err(SyncError::Validation(
                "company id must not be empty".to_string(),
            ));
        }
        if let Some(existing) = self
            .store
            .find_open_contract(&request.person_account_id, &request.company_id)
            .await?
        {
            return Err(SyncError::InvalidState(format!(
                "person {} already has an open contract ({}) with company {}",
                request.person_account_id, existing.id, request.company_id
            )));
        }

        let mut contract = Contract::new(
            request.person_account_id,
            request.company_id,
            request.contract_type,
            request.requested_by,
        );
        contract.position = request.position;
        contract.department = request.department;
        contract.notes = request.notes;

        let mut batch = WriteBatch::new();
        batch.put_contract(contract.clone());
        self.store.commit(batch).await?;
        info!(contract = %contract.id, "contract requested");
        Ok(contract)
    }

    /// Approve a requested contract. Provisions permissive-default
    /// sharing settings in the same commit iff none exist yet, then
    /// optionally runs one initial forward sync after the approval is
    /// durable. An initial-sync failure is logged, never propagated; the
    /// approval stands either way.
    #[instrument(skip_all, fields(contract = %contract_id))]
    pub async fn approve_contract(
        &self,
        contract_id: &ContractId,
        actor: &ActorId,
        run_initial_sync: bool,
    ) -> SyncResult<Contract> {
        let mut contract = self.get_contract(contract_id).await?;
        if contract.status != ContractStatus::Requested {
            return Err(SyncError::InvalidState(format!(
                "only requested contracts can be approved; {contract_id} is {}",
                contract.status
            )));
        }

        let now = Utc::now();
        contract.status = ContractStatus::Approved;
        contract.approved_at = Some(now);
        contract.updated_at = now;

        let mut batch = WriteBatch::new();
        batch.put_contract(contract.clone());
        if self.store.get_settings(contract_id).await?.is_none() {
            batch.put_settings(DataSharingSettings::permissive_defaults(contract_id.clone()));
        }
        self.store.commit(batch).await?;
        info!(contract = %contract_id, "contract approved");

        if run_initial_sync {
            if let Err(err) = self
                .orchestrator
                .sync_personal_to_employee(contract_id, None, actor, SyncType::Initial)
                .await
            {
                warn!(contract = %contract_id, error = %err, "initial sync after approval failed");
            }
        }
        Ok(contract)
    }

    #[instrument(skip_all, fields(contract = %contract_id))]
    pub async fn reject_contract(&self, contract_id: &ContractId) -> SyncResult<Contract> {
        let mut contract = self.get_contract(contract_id).await?;
        if contract.status != ContractStatus::Requested {
            return Err(SyncError::InvalidState(format!(
                "only requested contracts can be rejected; {contract_id} is {}",
                contract.status
            )));
        }
        contract.status = ContractStatus::Rejected;
        contract.updated_at = Utc::now();

        let mut batch = WriteBatch::new();
        batch.put_contract(contract.clone());
        self.store.commit(batch).await?;
        info!(contract = %contract_id, "contract rejected");
        Ok(contract)
    }

    /// A person asks to leave; the contract stays active until the
    /// company confirms via the termination service.
    #[instrument(skip_all, fields(contract = %contract_id))]
    pub async fn request_termination(&self, contract_id: &ContractId) -> SyncResult<Contract> {
        let mut contract = self.get_contract(contract_id).await?;
        if contract.status != ContractStatus::Approved {
            return Err(SyncError::InvalidState(format!(
                "termination can only be requested on an approved contract; {contract_id} is {}",
                contract.status
            )));
        }
        contract.status = ContractStatus::TerminationRequested;
        contract.updated_at = Utc::now();

        let mut batch = WriteBatch::new();
        batch.put_contract(contract.clone());
        self.store.commit(batch).await?;
        info!(contract = %contract_id, "termination requested");
        Ok(contract)
    }

    /// Change consent flags. Only the person who owns the contract may
    /// do this, and not on a terminal contract.
    #[instrument(skip_all, fields(contract = %contract_id))]
    pub async fn update_sharing_settings(
        &self,
        contract_id: &ContractId,
        update: ConsentUpdate,
        acting_person: &PersonAccountId,
    ) -> SyncResult<DataSharingSettings> {
        let contract = self.get_contract(contract_id).await?;
        if contract.person_account_id != *acting_person {
            return Err(SyncError::PermissionDenied(format!(
                "sharing settings for contract {contract_id} belong to person {}",
                contract.person_account_id
            )));
        }
        if contract.status.is_terminal() {
            return Err(SyncError::InvalidState(format!(
                "consent cannot change on a {} contract",
                contract.status
            )));
        }
        let mut settings = self.store.get_settings(contract_id).await?.ok_or_else(|| {
            SyncError::InvalidState(format!(
                "contract {contract_id} has no sharing settings provisioned"
            ))
        })?;
        update.apply_to(&mut settings);

        let mut batch = WriteBatch::new();
        batch.put_settings(settings.clone());
        self.store.commit(batch).await?;
        Ok(settings)
    }

    pub async fn get_contract(&self, contract_id: &ContractId) -> SyncResult<Contract> {
        self.store
            .get_contract(contract_id)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("contract {contract_id} not found")))
    }

    pub async fn get_sharing_settings(
        &self,
        contract_id: &ContractId,
    ) -> SyncResult<DataSharingSettings> {
        self.get_contract(contract_id).await?;
        self.store.get_settings(contract_id).await?.ok_or_else(|| {
            SyncError::NotFound(format!(
                "contract {contract_id} has no sharing settings provisioned"
            ))
        })
    }

    pub async fn list_contracts_for_person(
        &self,
        person: &PersonAccountId,
    ) -> SyncResult<Vec<Contract>> {
        Ok(self.store.list_contracts_for_person(person).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::retention::TerminationService;
    use accord_storage::memory::InMemoryHrStore;
    use proptest::prelude::*;

    fn service() -> (Arc<InMemoryHrStore>, ContractService) {
        let store = Arc::new(InMemoryHrStore::new());
        let orchestrator = Arc::new(SyncOrchestrator::new(
            store.clone(),
            ServiceConfig::default(),
        ));
        (store.clone(), ContractService::new(store, orchestrator))
    }

    fn sample_request(person: &str, company: &str) -> ContractRequest {
        ContractRequest {
            person_account_id: PersonAccountId::new(person),
            company_id: CompanyId::new(company),
            contract_type: ContractType::Regular,
            position: None,
            department: None,
            requested_by: ActorId::new(person),
            notes: None,
        }
    }

    #[tokio::test]
    async fn second_open_request_for_same_pair_fails() {
        let (_, service) = service();
        service
            .request_contract(sample_request("p1", "co1"))
            .await
            .unwrap();
        let result = service.request_contract(sample_request("p1", "co1")).await;
        assert!(matches!(result, Err(SyncError::InvalidState(_))));
        // A different company is fine.
        service
            .request_contract(sample_request("p1", "co2"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn approval_provisions_permissive_defaults() {
        let (store, service) = service();
        let contract = service
            .request_contract(sample_request("p1", "co1"))
            .await
            .unwrap();
        assert!(store.get_settings(&contract.id).await.unwrap().is_none());

        let approved = service
            .approve_contract(&contract.id, &ActorId::new("admin"), false)
            .await
            .unwrap();
        assert_eq!(approved.status, ContractStatus::Approved);
        assert!(approved.approved_at.is_some());

        let settings = store.get_settings(&contract.id).await.unwrap().unwrap();
        assert!(settings.share_basic);
        assert!(settings.share_contact);
        assert!(!settings.realtime_sync);
    }

    #[tokio::test]
    async fn double_approval_fails_and_keeps_settings() {
        let (store, service) = service();
        let contract = service
            .request_contract(sample_request("p1", "co1"))
            .await
            .unwrap();
        let admin = ActorId::new("admin");
        service
            .approve_contract(&contract.id, &admin, false)
            .await
            .unwrap();

        // The person customizes consent after approval.
        service
            .update_sharing_settings(
                &contract.id,
                ConsentUpdate {
                    share_career: Some(true),
                    ..ConsentUpdate::default()
                },
                &PersonAccountId::new("p1"),
            )
            .await
            .unwrap();

        let result = service.approve_contract(&contract.id, &admin, false).await;
        assert!(matches!(result, Err(SyncError::InvalidState(_))));

        // Customized settings survive; approval never reprovisions.
        let settings = store.get_settings(&contract.id).await.unwrap().unwrap();
        assert!(settings.share_career);
    }

    #[tokio::test]
    async fn consent_update_is_owner_only() {
        let (_, service) = service();
        let contract = service
            .request_contract(sample_request("p1", "co1"))
            .await
            .unwrap();
        service
            .approve_contract(&contract.id, &ActorId::new("admin"), false)
            .await
            .unwrap();

        let result = service
            .update_sharing_settings(
                &contract.id,
                ConsentUpdate::realtime(true),
                &PersonAccountId::new("someone-else"),
            )
            .await;
        assert!(matches!(result, Err(SyncError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn rejection_is_terminal() {
        let (_, service) = service();
        let contract = service
            .request_contract(sample_request("p1", "co1"))
            .await
            .unwrap();
        service.reject_contract(&contract.id).await.unwrap();

        let result = service
            .approve_contract(&contract.id, &ActorId::new("admin"), false)
            .await;
        assert!(matches!(result, Err(SyncError::InvalidState(_))));

        // The pair is free for a new request once the old one is terminal.
        service
            .request_contract(sample_request("p1", "co1"))
            .await
            .unwrap();
    }

    #[derive(Debug, Clone)]
    enum LifecycleOp {
        Approve,
        Reject,
        RequestTermination,
        Terminate,
    }

    fn op_strategy() -> impl Strategy<Value = Vec<LifecycleOp>> {
        proptest::collection::vec(
            prop_oneof![
                Just(LifecycleOp::Approve),
                Just(LifecycleOp::Reject),
                Just(LifecycleOp::RequestTermination),
                Just(LifecycleOp::Terminate),
            ],
            0..12,
        )
    }

    fn expected_transition(status: ContractStatus, op: &LifecycleOp) -> Option<ContractStatus> {
        match op {
            LifecycleOp::Approve => {
                (status == ContractStatus::Requested).then_some(ContractStatus::Approved)
            }
            LifecycleOp::Reject => {
                (status == ContractStatus::Requested).then_some(ContractStatus::Rejected)
            }
            LifecycleOp::RequestTermination => (status == ContractStatus::Approved)
                .then_some(ContractStatus::TerminationRequested),
            LifecycleOp::Terminate => {
                (status != ContractStatus::Terminated).then_some(ContractStatus::Terminated)
            }
        }
    }

    proptest! {
        #[test]
        fn property_lifecycle_transitions_are_explicit(ops in op_strategy()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime");

            rt.block_on(async move {
                let store = Arc::new(InMemoryHrStore::new());
                let orchestrator = Arc::new(SyncOrchestrator::new(
                    store.clone(),
                    ServiceConfig::default(),
                ));
                let contracts = ContractService::new(store.clone(), orchestrator);
                let termination =
                    TerminationService::new(store.clone(), ServiceConfig::default().retention);

                let contract = contracts
                    .request_contract(sample_request("prop-person", "prop-company"))
                    .await
                    .expect("request");
                let mut status = ContractStatus::Requested;
                let admin = ActorId::new("admin");

                for op in ops {
                    let result = match op {
                        LifecycleOp::Approve => contracts
                            .approve_contract(&contract.id, &admin, false)
                            .await
                            .map(|_| ()),
                        LifecycleOp::Reject => {
                            contracts.reject_contract(&contract.id).await.map(|_| ())
                        }
                        LifecycleOp::RequestTermination => contracts
                            .request_termination(&contract.id)
                            .await
                            .map(|_| ()),
                        LifecycleOp::Terminate => termination
                            .terminate_contract(&contract.id, "prop", &admin)
                            .await
                            .map(|_| ()),
                    };

                    match expected_transition(status, &op) {
                        Some(next) => {
                            result.expect("valid transition must succeed");
                            status = next;
                        }
                        None => {
                            assert!(result.is_err(), "invalid transition must fail");
                        }
                    }

                    let current = contracts.get_contract(&contract.id).await.expect("get");
                    assert_eq!(current.status, status, "status drifted from the model");

                    // Settings exist from first approval on and are never
                    // re-provisioned with defaults after a revocation.
                    if status == ContractStatus::Terminated {
                        let settings = store
                            .get_settings(&contract.id)
                            .await
                            .expect("settings read");
                        if let Some(settings) = settings {
                            assert!(!settings.realtime_sync);
                            assert!(settings.authorized_groups().is_empty());
                        }
                    }
                }
            });
        }
    }
}
