//! Scalar field sync engine.
//!
//! Diffs mapped fields by value and writes the destination side through
//! its `BasicFieldSink`. Changes are staged into the caller's batch, one
//! audit row per changed field; the caller owns the commit.

use crate::registry;
use accord_storage::WriteBatch;
use accord_types::{
    stringify_opt, ActorId, BasicFieldSink, BasicFieldSource, ContractId, SyncDirection,
    SyncEntityType, SyncLogAppend, SyncType,
};
use chrono::Utc;
use serde::Serialize;

/// One applied scalar change, values already audit-rendered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    /// Personal-side registry name; the canonical key in audit rows for
    /// both directions.
    pub field: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct FieldSyncOutcome {
    /// Fields examined under current consent, changed or not.
    pub synced_fields: Vec<&'static str>,
    pub changes: Vec<FieldChange>,
    pub staged_logs: usize,
}

/// Copy personal-profile fields onto the employee side.
///
/// `target_fields` are personal-side registry names, already intersected
/// with consent by the caller. A second pass with no source change stages
/// nothing.
pub fn sync_personal_to_employee<S, D>(
    contract_id: &ContractId,
    source: &S,
    dest: &mut D,
    target_fields: &[&'static str],
    sync_type: SyncType,
    actor: &ActorId,
    batch: &mut WriteBatch,
) -> FieldSyncOutcome
where
    S: BasicFieldSource + ?Sized,
    D: BasicFieldSink + ?Sized,
{
    let pairs = target_fields
        .iter()
        .filter_map(|personal| {
            registry::employee_field(personal).map(|employee| (*personal, *personal, employee))
        })
        .collect::<Vec<_>>();
    sync_mapped_fields(
        contract_id,
        source,
        dest,
        &pairs,
        SyncDirection::PersonalToEmployee,
        SyncEntityType::Employee,
        sync_type,
        actor,
        batch,
    )
}

/// Symmetric inverse: copy employee fields onto the personal profile.
pub fn sync_employee_to_personal<S, D>(
    contract_id: &ContractId,
    source: &S,
    dest: &mut D,
    target_fields: &[&'static str],
    sync_type: SyncType,
    actor: &ActorId,
    batch: &mut WriteBatch,
) -> FieldSyncOutcome
where
    S: BasicFieldSource + ?Sized,
    D: BasicFieldSink + ?Sized,
{
    let pairs = target_fields
        .iter()
        .filter_map(|personal| {
            registry::employee_field(personal).map(|employee| (*personal, employee, *personal))
        })
        .collect::<Vec<_>>();
    sync_mapped_fields(
        contract_id,
        source,
        dest,
        &pairs,
        SyncDirection::EmployeeToPersonal,
        SyncEntityType::PersonalProfile,
        sync_type,
        actor,
        batch,
    )
}

#[allow(clippy::too_many_arguments)]
fn sync_mapped_fields<S, D>(
    contract_id: &ContractId,
    source: &S,
    dest: &mut D,
    pairs: &[(&'static str, &'static str, &'static str)],
    direction: SyncDirection,
    entity_type: SyncEntityType,
    sync_type: SyncType,
    actor: &ActorId,
    batch: &mut WriteBatch,
) -> FieldSyncOutcome
where
    S: BasicFieldSource + ?Sized,
    D: BasicFieldSink + ?Sized,
{
    let mut outcome = FieldSyncOutcome::default();
    for &(log_name, source_name, dest_name) in pairs {
        let new_value = source.field(source_name);
        let old_value = dest.field(dest_name);
        if new_value == old_value {
            outcome.synced_fields.push(log_name);
            continue;
        }
        if !dest.set_field(dest_name, new_value.clone()) {
            continue;
        }
        outcome.synced_fields.push(log_name);
        outcome.changes.push(FieldChange {
            field: log_name.to_string(),
            old: stringify_opt(&old_value),
            new: stringify_opt(&new_value),
        });
        batch.append_sync_log(SyncLogAppend {
            contract_id: contract_id.clone(),
            sync_type,
            entity_type,
            field_name: Some(log_name.to_string()),
            old_value: stringify_opt(&old_value),
            new_value: stringify_opt(&new_value),
            direction,
            synced_by: actor.clone(),
            synced_at: Utc::now(),
        });
        outcome.staged_logs += 1;
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_types::{CompanyId, Employee, PersonAccountId, PersonalProfile};

    fn profile() -> PersonalProfile {
        let mut profile = PersonalProfile::new(PersonAccountId::new("p1"));
        profile.name = Some("Kim Jiwoo".to_string());
        profile.email = Some("jiwoo@example.com".to_string());
        profile.mobile_phone = Some("010-1234-5678".to_string());
        profile
    }

    #[test]
    fn changed_fields_stage_one_log_each() {
        let contract_id = ContractId::new("c1");
        let source = profile();
        let mut dest = Employee::new(CompanyId::new("co1"));
        let mut batch = WriteBatch::new();

        let outcome = sync_personal_to_employee(
            &contract_id,
            &source,
            &mut dest,
            &["name", "email", "mobile_phone"],
            SyncType::Manual,
            &ActorId::new("tester"),
            &mut batch,
        );

        assert_eq!(outcome.changes.len(), 3);
        assert_eq!(outcome.staged_logs, 3);
        assert_eq!(batch.len(), 3);
        assert_eq!(dest.legal_name.as_deref(), Some("Kim Jiwoo"));
        assert_eq!(dest.personal_email.as_deref(), Some("jiwoo@example.com"));
    }

    #[test]
    fn second_pass_with_no_source_change_is_empty() {
        let contract_id = ContractId::new("c1");
        let source = profile();
        let mut dest = Employee::new(CompanyId::new("co1"));
        let mut batch = WriteBatch::new();
        let fields = ["name", "email", "mobile_phone"];
        let actor = ActorId::new("tester");

        sync_personal_to_employee(
            &contract_id,
            &source,
            &mut dest,
            &fields,
            SyncType::Manual,
            &actor,
            &mut batch,
        );
        let mut second_batch = WriteBatch::new();
        let outcome = sync_personal_to_employee(
            &contract_id,
            &source,
            &mut dest,
            &fields,
            SyncType::Manual,
            &actor,
            &mut second_batch,
        );

        assert!(outcome.changes.is_empty());
        assert!(second_batch.is_empty());
        assert_eq!(outcome.synced_fields, vec!["name", "email", "mobile_phone"]);
    }

    #[test]
    fn clearing_to_empty_string_counts_as_change() {
        let contract_id = ContractId::new("c1");
        let mut source = profile();
        source.mobile_phone = Some(String::new());
        let mut dest = Employee::new(CompanyId::new("co1"));
        let mut batch = WriteBatch::new();

        let outcome = sync_personal_to_employee(
            &contract_id,
            &source,
            &mut dest,
            &["mobile_phone"],
            SyncType::Manual,
            &ActorId::new("tester"),
            &mut batch,
        );

        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes[0].old, None);
        assert_eq!(outcome.changes[0].new.as_deref(), Some(""));
    }

    #[test]
    fn reverse_direction_writes_profile_side() {
        let contract_id = ContractId::new("c1");
        let mut employee = Employee::new(CompanyId::new("co1"));
        employee.home_phone = Some("02-555-0100".to_string());
        let mut dest = PersonalProfile::new(PersonAccountId::new("p1"));
        let mut batch = WriteBatch::new();

        let outcome = sync_employee_to_personal(
            &contract_id,
            &employee,
            &mut dest,
            &["phone"],
            SyncType::Manual,
            &ActorId::new("tester"),
            &mut batch,
        );

        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(dest.phone.as_deref(), Some("02-555-0100"));
    }
}
