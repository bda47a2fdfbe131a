//! Relation sync engine.
//!
//! Full replace per relation kind: a non-empty source collection deletes
//! and recreates the destination's collection of that kind; an empty
//! source never wipes existing destination records. One count-only audit
//! row per kind per sync, whatever the per-record change count — payloads
//! are never logged. The replace policy avoids diff/merge across two
//! schemas with no stable shared key; delete+insert is O(n) and fine at
//! human-edit frequency.

use accord_storage::WriteBatch;
use accord_types::{
    ActorId, ContractId, RelationKind, RelationSet, SyncDirection, SyncEntityType, SyncLogAppend,
    SyncType,
};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelationReplace {
    pub kind: RelationKind,
    pub previous_count: usize,
    pub new_count: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RelationSyncOutcome {
    pub replaced: Vec<RelationReplace>,
    /// Kinds left untouched because the source had no records.
    pub skipped_empty: Vec<RelationKind>,
    pub staged_logs: usize,
}

/// Replace `kinds` on the destination side from the source side. The
/// caller has already applied consent and owns the commit.
#[allow(clippy::too_many_arguments)]
pub fn sync_relations(
    contract_id: &ContractId,
    source: &RelationSet,
    dest: &mut RelationSet,
    kinds: &[RelationKind],
    direction: SyncDirection,
    entity_type: SyncEntityType,
    sync_type: SyncType,
    actor: &ActorId,
    batch: &mut WriteBatch,
) -> RelationSyncOutcome {
    let mut outcome = RelationSyncOutcome::default();
    for kind in kinds {
        let records = source.records(*kind);
        if records.is_empty() {
            outcome.skipped_empty.push(*kind);
            continue;
        }
        let previous_count = dest.count(*kind);
        let new_count = records.len();
        dest.replace(records);
        outcome.replaced.push(RelationReplace {
            kind: *kind,
            previous_count,
            new_count,
        });
        batch.append_sync_log(SyncLogAppend {
            contract_id: contract_id.clone(),
            sync_type,
            entity_type,
            // Batch rows carry the kind label, not a scalar field name.
            field_name: Some(kind.label().to_string()),
            old_value: Some(previous_count.to_string()),
            new_value: Some(new_count.to_string()),
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
    use accord_types::{CareerRecord, EducationRecord};

    fn career(company: &str) -> CareerRecord {
        CareerRecord {
            company_name: company.to_string(),
            position: Some("engineer".to_string()),
            department: None,
            start_date: None,
            end_date: None,
        }
    }

    fn sync_all(source: &RelationSet, dest: &mut RelationSet) -> (RelationSyncOutcome, WriteBatch) {
        let mut batch = WriteBatch::new();
        let outcome = sync_relations(
            &ContractId::new("c1"),
            source,
            dest,
            &RelationKind::ALL,
            SyncDirection::PersonalToEmployee,
            SyncEntityType::Employee,
            SyncType::Manual,
            &ActorId::new("tester"),
            &mut batch,
        );
        (outcome, batch)
    }

    #[test]
    fn empty_source_never_deletes_destination() {
        let source = RelationSet::default();
        let mut dest = RelationSet::default();
        dest.career.push(career("previous employer"));

        let (outcome, batch) = sync_all(&source, &mut dest);

        assert!(outcome.replaced.is_empty());
        assert_eq!(outcome.skipped_empty.len(), RelationKind::ALL.len());
        assert!(batch.is_empty());
        assert_eq!(dest.career.len(), 1);
    }

    #[test]
    fn non_empty_source_replaces_exactly() {
        let mut source = RelationSet::default();
        source.career.push(career("alpha"));
        source.career.push(career("beta"));
        let mut dest = RelationSet::default();
        dest.career.push(career("stale"));

        let (outcome, batch) = sync_all(&source, &mut dest);

        assert_eq!(dest.career, source.career);
        assert_eq!(
            outcome.replaced,
            vec![RelationReplace {
                kind: RelationKind::Career,
                previous_count: 1,
                new_count: 2,
            }]
        );
        // One count-only row regardless of how many records moved.
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn one_log_row_per_kind() {
        let mut source = RelationSet::default();
        source.career.push(career("alpha"));
        source.education.push(EducationRecord {
            school_name: "university".to_string(),
            major: None,
            degree: None,
            start_date: None,
            end_date: None,
        });
        let mut dest = RelationSet::default();

        let (outcome, batch) = sync_all(&source, &mut dest);

        assert_eq!(outcome.replaced.len(), 2);
        assert_eq!(outcome.staged_logs, 2);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn rerun_without_source_change_keeps_destination_stable() {
        let mut source = RelationSet::default();
        source.career.push(career("alpha"));
        let mut dest = RelationSet::default();

        sync_all(&source, &mut dest);
        let (outcome, _) = sync_all(&source, &mut dest);

        assert_eq!(dest.career.len(), 1);
        assert_eq!(outcome.replaced[0].previous_count, 1);
        assert_eq!(outcome.replaced[0].new_count, 1);
    }
}
