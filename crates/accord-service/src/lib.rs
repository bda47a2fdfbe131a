//! Accord service layer.
//!
//! Contract lifecycle, the sync orchestration facade, the
//! commit-triggered auto-sync coordinator, termination/retention, and
//! the cross-entity integrity validator, all over one `HrStore`.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod autosync;
pub mod config;
pub mod contracts;
pub mod orchestrator;
pub mod retention;
pub mod validator;

pub use autosync::AutoSyncCoordinator;
pub use config::{AutoSyncConfig, EmployeeNumberConfig, RetentionConfig, ServiceConfig};
pub use contracts::{ContractRequest, ContractService};
pub use orchestrator::{ContractSyncOutcome, SyncOrchestrator, SyncReport, SyncableFields};
pub use retention::{PurgeReport, RetentionStatus, TerminationOutcome, TerminationService};
pub use validator::{
    AppliedFix, FixReport, IntegrityIssue, IntegrityValidator, IssueKind, IssueSeverity,
    ValidationReport, ValidationSummary,
};

use accord_storage::{CommitStore, HrStore};
use std::sync::Arc;

/// The fully wired service set over one store, built at process startup
/// and handed around by reference. Construction registers the auto-sync
/// coordinator as a commit observer on the store.
pub struct AccordServices {
    pub store: Arc<dyn HrStore>,
    pub contracts: Arc<ContractService>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub termination: Arc<TerminationService>,
    pub validator: Arc<IntegrityValidator>,
    pub auto_sync: Arc<AutoSyncCoordinator>,
}

impl AccordServices {
    pub fn new(store: Arc<dyn HrStore>, config: ServiceConfig) -> Self {
        let orchestrator = Arc::new(SyncOrchestrator::new(store.clone(), config.clone()));
        let auto_sync =
            AutoSyncCoordinator::new(orchestrator.clone(), config.auto_sync.enabled_on_start);
        store.register_commit_observer(auto_sync.clone());
        let contracts = Arc::new(ContractService::new(store.clone(), orchestrator.clone()));
        let termination = Arc::new(TerminationService::new(store.clone(), config.retention));
        let validator = Arc::new(IntegrityValidator::new(store.clone()));
        Self {
            store,
            contracts,
            orchestrator,
            termination,
            validator,
            auto_sync,
        }
    }
}
