//! Snapshot engine.
//!
//! A consent-filtered, read-only extraction of a profile "as of now" for
//! one-time disclosure, as opposed to the persisted mirroring the live
//! engines do. The disclosure audit row names only the top-level keys
//! that were shared, never raw values, to bound audit-trail sensitivity.

use crate::registry;
use accord_storage::WriteBatch;
use accord_types::{
    ActorId, BasicFieldSink, BasicFieldSource, ContractId, DataSharingSettings, FieldValue,
    PersonalProfile, RelationKind, RelationSet, SyncDirection, SyncEntityType, SyncLogAppend,
    SyncType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::basic::FieldChange;

/// Point-in-time, consent-filtered view of one profile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub contract_id: ContractId,
    pub captured_at: DateTime<Utc>,
    /// Personal-side registry names to their values at capture time.
    pub fields: BTreeMap<String, Option<FieldValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<BTreeMap<String, serde_json::Value>>,
}

impl ProfileSnapshot {
    /// The top-level keys this snapshot disclosed.
    pub fn disclosed_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.fields.keys().cloned().collect();
        if let Some(relations) = &self.relations {
            keys.extend(relations.keys().cloned());
        }
        keys
    }
}

fn relation_json(relations: &RelationSet, kind: RelationKind) -> serde_json::Value {
    let value = match kind {
        RelationKind::Education => serde_json::to_value(&relations.education),
        RelationKind::Career => serde_json::to_value(&relations.career),
        RelationKind::Certificate => serde_json::to_value(&relations.certificates),
        RelationKind::Language => serde_json::to_value(&relations.languages),
        RelationKind::Military => serde_json::to_value(&relations.military),
        RelationKind::Family => serde_json::to_value(&relations.family),
    };
    value.unwrap_or(serde_json::Value::Null)
}

/// Extract the currently authorized fields (and relations, when asked)
/// and stage the key-only disclosure row. The caller has verified the
/// contract and owns the commit.
pub fn capture(
    contract_id: &ContractId,
    settings: &DataSharingSettings,
    profile: &PersonalProfile,
    include_relations: bool,
    actor: &ActorId,
    batch: &mut WriteBatch,
) -> ProfileSnapshot {
    let mut fields = BTreeMap::new();
    for group in registry::SCALAR_GROUPS {
        if !settings.allows(group) {
            continue;
        }
        for mapping in registry::fields_for_group(group) {
            fields.insert(mapping.personal.to_string(), profile.field(mapping.personal));
        }
    }

    let relations = include_relations.then(|| {
        let mut disclosed = BTreeMap::new();
        for kind in RelationKind::ALL {
            if !settings.allows(kind.consent_group()) {
                continue;
            }
            disclosed.insert(
                kind.label().to_string(),
                relation_json(&profile.relations, kind),
            );
        }
        disclosed
    });

    let snapshot = ProfileSnapshot {
        contract_id: contract_id.clone(),
        captured_at: Utc::now(),
        fields,
        relations,
    };

    batch.append_sync_log(SyncLogAppend {
        contract_id: contract_id.clone(),
        sync_type: SyncType::Manual,
        entity_type: SyncEntityType::PersonalProfile,
        field_name: None,
        old_value: None,
        new_value: Some(snapshot.disclosed_keys().join(",")),
        direction: SyncDirection::PersonalToEmployee,
        synced_by: actor.clone(),
        synced_at: snapshot.captured_at,
    });

    snapshot
}

/// One-way apply of a captured snapshot's basic/contact fields onto an
/// employee record, independent of the live engines. Relations are
/// disclosure-only and never applied. Returns the changes made.
pub fn apply_to_employee<D>(snapshot: &ProfileSnapshot, employee: &mut D) -> Vec<FieldChange>
where
    D: BasicFieldSink + ?Sized,
{
    let mut changes = Vec::new();
    for (personal_name, value) in &snapshot.fields {
        let Some(employee_name) = registry::employee_field(personal_name) else {
            continue;
        };
        let current = employee.field(employee_name);
        if current == *value {
            continue;
        }
        if !employee.set_field(employee_name, value.clone()) {
            continue;
        }
        changes.push(FieldChange {
            field: personal_name.clone(),
            old: accord_types::stringify_opt(&current),
            new: accord_types::stringify_opt(value),
        });
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_types::{CareerRecord, CompanyId, Employee, PersonAccountId};

    fn settings_basic_only(contract_id: &ContractId) -> DataSharingSettings {
        let mut settings = DataSharingSettings::permissive_defaults(contract_id.clone());
        settings.share_contact = false;
        settings
    }

    fn profile_with_career() -> PersonalProfile {
        let mut profile = PersonalProfile::new(PersonAccountId::new("p1"));
        profile.name = Some("Kim Jiwoo".to_string());
        profile.email = Some("jiwoo@example.com".to_string());
        profile.relations.career.push(CareerRecord {
            company_name: "alpha".to_string(),
            position: None,
            department: None,
            start_date: None,
            end_date: None,
        });
        profile
    }

    #[test]
    fn capture_is_consent_filtered() {
        let contract_id = ContractId::new("c1");
        let settings = settings_basic_only(&contract_id);
        let profile = profile_with_career();
        let mut batch = WriteBatch::new();

        let snapshot = capture(
            &contract_id,
            &settings,
            &profile,
            true,
            &ActorId::new("tester"),
            &mut batch,
        );

        assert!(snapshot.fields.contains_key("name"));
        assert!(!snapshot.fields.contains_key("email"));
        // Career consent is off; family rides basic and career stays out.
        let relations = snapshot.relations.as_ref().unwrap();
        assert!(relations.contains_key("family"));
        assert!(!relations.contains_key("career"));
    }

    #[test]
    fn disclosure_row_names_keys_not_values() {
        let contract_id = ContractId::new("c1");
        let settings = settings_basic_only(&contract_id);
        let profile = profile_with_career();
        let mut batch = WriteBatch::new();

        let snapshot = capture(
            &contract_id,
            &settings,
            &profile,
            false,
            &ActorId::new("tester"),
            &mut batch,
        );

        assert_eq!(batch.len(), 1);
        let disclosed = snapshot.disclosed_keys().join(",");
        assert!(disclosed.contains("name"));
        assert!(!disclosed.contains("Jiwoo"));
    }

    #[test]
    fn apply_writes_only_mapped_scalars() {
        let contract_id = ContractId::new("c1");
        let settings = DataSharingSettings::permissive_defaults(contract_id.clone());
        let profile = profile_with_career();
        let mut batch = WriteBatch::new();
        let snapshot = capture(
            &contract_id,
            &settings,
            &profile,
            true,
            &ActorId::new("tester"),
            &mut batch,
        );

        let mut employee = Employee::new(CompanyId::new("co1"));
        let changes = apply_to_employee(&snapshot, &mut employee);

        assert_eq!(employee.legal_name.as_deref(), Some("Kim Jiwoo"));
        assert_eq!(employee.personal_email.as_deref(), Some("jiwoo@example.com"));
        assert!(employee.relations.career.is_empty());
        assert!(changes.iter().any(|change| change.field == "name"));
    }

    #[test]
    fn apply_is_idempotent() {
        let contract_id = ContractId::new("c1");
        let settings = DataSharingSettings::permissive_defaults(contract_id.clone());
        let profile = profile_with_career();
        let mut batch = WriteBatch::new();
        let snapshot = capture(
            &contract_id,
            &settings,
            &profile,
            false,
            &ActorId::new("tester"),
            &mut batch,
        );

        let mut employee = Employee::new(CompanyId::new("co1"));
        apply_to_employee(&snapshot, &mut employee);
        let second = apply_to_employee(&snapshot, &mut employee);
        assert!(second.is_empty());
    }
}
