//! Sync orchestration facade.
//!
//! Entry point for every data movement between the two sides. Resolves
//! the contract, materializes the employee side when missing, intersects
//! caller-requested fields with what consent currently authorizes, then
//! delegates scalars to the basic engine and collections to the relation
//! engine. Exactly one commit per invocation.

use crate::config::ServiceConfig;
use accord_storage::{
    CommitStore, ContractStore, EmployeeStore, HrStore, ProfileStore, SettingsStore, WriteBatch,
};
use accord_sync::{basic, registry, relations, snapshot};
use accord_sync::{FieldChange, ProfileSnapshot, RelationReplace, RelationSyncOutcome};
use accord_types::{
    ActorId, Contract, ContractId, ContractStatus, DataSharingSettings, Employee, EmployeeNumber,
    PersonAccountId, PersonalProfile, RelationKind, SyncDirection, SyncEntityType, SyncError,
    SyncLogAppend, SyncLogId, SyncResult, SyncType,
};
use chrono::{Datelike, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What one sync invocation did.
#[derive(Clone, Debug, Serialize)]
pub struct SyncReport {
    pub contract_id: ContractId,
    pub direction: SyncDirection,
    pub sync_type: SyncType,
    pub synced_fields: Vec<&'static str>,
    pub changes: Vec<FieldChange>,
    pub relation_counts: Vec<RelationReplace>,
    pub log_ids: Vec<SyncLogId>,
}

/// Per-contract result of a whole-person sync pass.
#[derive(Clone, Debug, Serialize)]
pub enum ContractSyncOutcome {
    Synced(SyncReport),
    Skipped {
        contract_id: ContractId,
        reason: String,
    },
    Failed {
        contract_id: ContractId,
        error: String,
    },
}

/// Fields and relation kinds a contract's settings currently authorize.
#[derive(Clone, Debug, Serialize)]
pub struct SyncableFields {
    pub scalar_fields: Vec<&'static str>,
    pub relation_kinds: Vec<RelationKind>,
}

pub struct SyncOrchestrator {
    store: Arc<dyn HrStore>,
    config: ServiceConfig,
}

impl SyncOrchestrator {
    pub fn new(store: Arc<dyn HrStore>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    /// Resolve a contract that is allowed to move data: it must exist and
    /// be approved, and its settings must be provisioned.
    async fn resolve_approved(
        &self,
        contract_id: &ContractId,
    ) -> SyncResult<(Contract, DataSharingSettings)> {
        let contract = self
            .store
            .get_contract(contract_id)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("contract {contract_id} not found")))?;
        if contract.status != ContractStatus::Approved {
            return Err(SyncError::InvalidState(format!(
                "contract {contract_id} is {}; sync requires an approved contract",
                contract.status
            )));
        }
        let settings = self.store.get_settings(contract_id).await?.ok_or_else(|| {
            SyncError::InvalidState(format!(
                "contract {contract_id} has no sharing settings provisioned"
            ))
        })?;
        Ok((contract, settings))
    }

    fn authorized_scalar_fields(settings: &DataSharingSettings) -> Vec<&'static str> {
        registry::SCALAR_GROUPS
            .into_iter()
            .filter(|group| settings.allows(*group))
            .flat_map(|group| registry::fields_for_group(group).iter())
            .map(|mapping| mapping.personal)
            .collect()
    }

    fn authorized_relation_kinds(settings: &DataSharingSettings) -> Vec<RelationKind> {
        RelationKind::ALL
            .into_iter()
            .filter(|kind| settings.allows(kind.consent_group()))
            .collect()
    }

    /// Consent always wins: caller-requested names can narrow the field
    /// list but never widen it past what the settings authorize.
    fn intersect_requested(
        authorized: Vec<&'static str>,
        requested: Option<&[String]>,
    ) -> Vec<&'static str> {
        match requested {
            Some(requested) => authorized
                .into_iter()
                .filter(|field| requested.iter().any(|name| name == field))
                .collect(),
            None => authorized,
        }
    }

    pub async fn get_syncable_fields(&self, contract_id: &ContractId) -> SyncResult<SyncableFields> {
        let (_, settings) = self.resolve_approved(contract_id).await?;
        Ok(SyncableFields {
            scalar_fields: Self::authorized_scalar_fields(&settings),
            relation_kinds: Self::authorized_relation_kinds(&settings),
        })
    }

    async fn generate_employee_number(&self) -> SyncResult<EmployeeNumber> {
        let sequence = self.store.next_employee_sequence().await?;
        let year = Utc::now().year();
        Ok(EmployeeNumber::new(format!(
            "{}-{}-{:04}",
            self.config.employee_numbers.prefix, year, sequence
        )))
    }

    /// Resolve the employee side of a contract, creating it when missing.
    ///
    /// Lookup order: by the contract's employee number, then by (legal
    /// name, company), then a new record seeded as a full-field copy of
    /// the profile. This is the only path permitted to write the
    /// contract's `employee_number` after creation; the writeback rides
    /// the caller's batch. Returns the employee and whether it must be
    /// staged even without field changes.
    async fn materialize_employee(
        &self,
        contract: &mut Contract,
        profile: &PersonalProfile,
        batch: &mut WriteBatch,
    ) -> SyncResult<(Employee, bool)> {
        if let Some(number) = contract.employee_number.clone() {
            if let Some(employee) = self
                .store
                .find_employee_by_number(&contract.company_id, &number)
                .await?
            {
                return Ok((employee, false));
            }
        }

        if let Some(name) = profile.name.as_deref() {
            if let Some(mut employee) = self
                .store
                .find_employee_by_name(&contract.company_id, name)
                .await?
            {
                if employee.employee_number.is_none() {
                    employee.employee_number = Some(self.generate_employee_number().await?);
                }
                if contract.employee_number != employee.employee_number {
                    contract.employee_number = employee.employee_number.clone();
                    contract.updated_at = Utc::now();
                    batch.put_contract(contract.clone());
                }
                info!(
                    contract = %contract.id,
                    employee = %employee.id,
                    "adopted existing employee record by name match"
                );
                return Ok((employee, true));
            }
        }

        let mut employee = Employee::from_profile(contract.company_id.clone(), profile);
        employee.department = contract.department.clone();
        employee.position = contract.position.clone();
        let number = self.generate_employee_number().await?;
        employee.employee_number = Some(number.clone());
        contract.employee_number = Some(number.clone());
        contract.updated_at = Utc::now();
        batch.put_contract(contract.clone());
        info!(
            contract = %contract.id,
            employee = %employee.id,
            number = %number,
            "materialized new employee record from profile"
        );
        Ok((employee, true))
    }

    /// Forward sync: profile onto employee. `requested_fields` (personal
    /// side names) narrows the scalar set; a full sync (`None`) also
    /// moves the authorized relation collections.
    #[instrument(skip_all, fields(contract = %contract_id))]
    pub async fn sync_personal_to_employee(
        &self,
        contract_id: &ContractId,
        requested_fields: Option<&[String]>,
        actor: &ActorId,
        sync_type: SyncType,
    ) -> SyncResult<SyncReport> {
        let (mut contract, settings) = self.resolve_approved(contract_id).await?;
        let profile = self
            .store
            .get_profile(&contract.person_account_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!(
                    "no personal profile for person {}",
                    contract.person_account_id
                ))
            })?;

        let mut batch = WriteBatch::new();
        let (mut employee, employee_dirty) = self
            .materialize_employee(&mut contract, &profile, &mut batch)
            .await?;

        let fields = Self::intersect_requested(
            Self::authorized_scalar_fields(&settings),
            requested_fields,
        );
        let outcome = basic::sync_personal_to_employee(
            &contract.id,
            &profile,
            &mut employee,
            &fields,
            sync_type,
            actor,
            &mut batch,
        );

        let relation_outcome = if requested_fields.is_none() {
            relations::sync_relations(
                &contract.id,
                &profile.relations,
                &mut employee.relations,
                &Self::authorized_relation_kinds(&settings),
                SyncDirection::PersonalToEmployee,
                SyncEntityType::Employee,
                sync_type,
                actor,
                &mut batch,
            )
        } else {
            RelationSyncOutcome::default()
        };

        if employee_dirty || !outcome.changes.is_empty() || !relation_outcome.replaced.is_empty() {
            employee.updated_at = Utc::now();
            batch.put_employee(employee);
        }

        let log_ids = if batch.is_empty() {
            Vec::new()
        } else {
            self.store.commit(batch).await?.sync_log_ids
        };

        info!(
            changed = outcome.changes.len(),
            relations = relation_outcome.replaced.len(),
            "personal-to-employee sync complete"
        );
        Ok(SyncReport {
            contract_id: contract.id,
            direction: SyncDirection::PersonalToEmployee,
            sync_type,
            synced_fields: outcome.synced_fields,
            changes: outcome.changes,
            relation_counts: relation_outcome.replaced,
            log_ids,
        })
    }

    /// Reverse sync: employee onto profile. Requires an already linked
    /// employee record; the reverse path never materializes.
    #[instrument(skip_all, fields(contract = %contract_id))]
    pub async fn sync_employee_to_personal(
        &self,
        contract_id: &ContractId,
        requested_fields: Option<&[String]>,
        actor: &ActorId,
        sync_type: SyncType,
    ) -> SyncResult<SyncReport> {
        let (contract, settings) = self.resolve_approved(contract_id).await?;
        let number = contract.employee_number.clone().ok_or_else(|| {
            SyncError::NotFound(format!(
                "contract {contract_id} has no linked employee record"
            ))
        })?;
        let employee = self
            .store
            .find_employee_by_number(&contract.company_id, &number)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!("employee {number} not found for contract"))
            })?;
        let mut profile = self
            .store
            .get_profile(&contract.person_account_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!(
                    "no personal profile for person {}",
                    contract.person_account_id
                ))
            })?;

        let mut batch = WriteBatch::new();
        let fields = Self::intersect_requested(
            Self::authorized_scalar_fields(&settings),
            requested_fields,
        );
        let outcome = basic::sync_employee_to_personal(
            &contract.id,
            &employee,
            &mut profile,
            &fields,
            sync_type,
            actor,
            &mut batch,
        );

        let relation_outcome = if requested_fields.is_none() {
            relations::sync_relations(
                &contract.id,
                &employee.relations,
                &mut profile.relations,
                &Self::authorized_relation_kinds(&settings),
                SyncDirection::EmployeeToPersonal,
                SyncEntityType::PersonalProfile,
                sync_type,
                actor,
                &mut batch,
            )
        } else {
            RelationSyncOutcome::default()
        };

        if !outcome.changes.is_empty() || !relation_outcome.replaced.is_empty() {
            profile.updated_at = Utc::now();
            batch.put_profile(profile);
        }

        let log_ids = if batch.is_empty() {
            Vec::new()
        } else {
            self.store.commit(batch).await?.sync_log_ids
        };

        info!(
            changed = outcome.changes.len(),
            relations = relation_outcome.replaced.len(),
            "employee-to-personal sync complete"
        );
        Ok(SyncReport {
            contract_id: contract.id,
            direction: SyncDirection::EmployeeToPersonal,
            sync_type,
            synced_fields: outcome.synced_fields,
            changes: outcome.changes,
            relation_counts: relation_outcome.replaced,
            log_ids,
        })
    }

    /// Forward-sync every approved contract of a person that has realtime
    /// sync enabled. Each contract commits on its own; one bad contract
    /// never blocks the rest.
    #[instrument(skip_all, fields(person = %person))]
    pub async fn sync_all_contracts_for_user(
        &self,
        person: &PersonAccountId,
        actor: &ActorId,
        sync_type: SyncType,
    ) -> SyncResult<Vec<ContractSyncOutcome>> {
        let contracts = self.store.list_contracts_for_person(person).await?;
        let mut outcomes = Vec::new();
        for contract in contracts
            .into_iter()
            .filter(|contract| contract.status == ContractStatus::Approved)
        {
            let realtime = self
                .store
                .get_settings(&contract.id)
                .await?
                .map(|settings| settings.realtime_sync)
                .unwrap_or(false);
            if !realtime {
                outcomes.push(ContractSyncOutcome::Skipped {
                    contract_id: contract.id,
                    reason: "realtime sync disabled".to_string(),
                });
                continue;
            }
            match self
                .sync_personal_to_employee(&contract.id, None, actor, sync_type)
                .await
            {
                Ok(report) => outcomes.push(ContractSyncOutcome::Synced(report)),
                Err(err) => {
                    warn!(
                        contract = %contract.id,
                        error = %err,
                        "contract sync failed; continuing with remaining contracts"
                    );
                    outcomes.push(ContractSyncOutcome::Failed {
                        contract_id: contract.id,
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(outcomes)
    }

    /// Consent-filtered point-in-time extraction for one-time disclosure.
    /// The key-only disclosure row is committed before the snapshot is
    /// handed out.
    #[instrument(skip_all, fields(contract = %contract_id))]
    pub async fn get_snapshot(
        &self,
        contract_id: &ContractId,
        include_relations: bool,
        actor: &ActorId,
    ) -> SyncResult<ProfileSnapshot> {
        let (contract, settings) = self.resolve_approved(contract_id).await?;
        let profile = self
            .store
            .get_profile(&contract.person_account_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!(
                    "no personal profile for person {}",
                    contract.person_account_id
                ))
            })?;

        let mut batch = WriteBatch::new();
        let snapshot = snapshot::capture(
            &contract.id,
            &settings,
            &profile,
            include_relations,
            actor,
            &mut batch,
        );
        self.store.commit(batch).await?;
        Ok(snapshot)
    }

    /// One-way apply of a previously captured snapshot onto the linked
    /// employee record, independent of the live engines.
    #[instrument(skip_all, fields(contract = %contract_id))]
    pub async fn apply_snapshot_to_employee(
        &self,
        contract_id: &ContractId,
        snapshot: &ProfileSnapshot,
        actor: &ActorId,
    ) -> SyncResult<SyncReport> {
        if snapshot.contract_id != *contract_id {
            return Err(SyncError::Validation(format!(
                "snapshot was captured for contract {}, not {contract_id}",
                snapshot.contract_id
            )));
        }
        let (contract, _) = self.resolve_approved(contract_id).await?;
        let number = contract.employee_number.clone().ok_or_else(|| {
            SyncError::NotFound(format!(
                "contract {contract_id} has no linked employee record"
            ))
        })?;
        let mut employee = self
            .store
            .find_employee_by_number(&contract.company_id, &number)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!("employee {number} not found for contract"))
            })?;

        let changes = snapshot::apply_to_employee(snapshot, &mut employee);
        let mut batch = WriteBatch::new();
        for change in &changes {
            batch.append_sync_log(SyncLogAppend {
                contract_id: contract.id.clone(),
                sync_type: SyncType::Manual,
                entity_type: SyncEntityType::Employee,
                field_name: Some(change.field.clone()),
                old_value: change.old.clone(),
                new_value: change.new.clone(),
                direction: SyncDirection::PersonalToEmployee,
                synced_by: actor.clone(),
                synced_at: Utc::now(),
            });
        }
        let log_ids = if changes.is_empty() {
            Vec::new()
        } else {
            employee.updated_at = Utc::now();
            batch.put_employee(employee);
            self.store.commit(batch).await?.sync_log_ids
        };

        Ok(SyncReport {
            contract_id: contract.id,
            direction: SyncDirection::PersonalToEmployee,
            sync_type: SyncType::Manual,
            synced_fields: Vec::new(),
            changes,
            relation_counts: Vec::new(),
            log_ids,
        })
    }
}
