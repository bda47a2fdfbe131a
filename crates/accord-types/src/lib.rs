//! Accord domain model.
//!
//! Two independently-owned representations of one person's HR data — the
//! self-controlled personal profile and the employer-controlled employee
//! record — plus the consent contract that gates data movement between
//! them, the per-contract sharing settings, and the append-only sync
//! audit rows.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod archive;
mod consent;
mod contract;
mod employee;
mod error;
mod fields;
mod ids;
mod profile;
mod synclog;

pub use archive::{ArchiveState, RetentionArchive};
pub use consent::{ConsentUpdate, DataSharingSettings, RelationKind, ShareGroup};
pub use contract::{Contract, ContractStatus, ContractType};
pub use employee::{CompanyRole, CompanyRoleKind, Employee, EmployeeStatus};
pub use error::{SyncError, SyncResult};
pub use fields::{stringify_opt, BasicFieldSink, BasicFieldSource, FieldValue};
pub use ids::{
    ActorId, CompanyId, ContractId, EmployeeId, EmployeeNumber, PersonAccountId, SyncLogId,
};
pub use profile::{
    CareerRecord, CertificateRecord, EducationRecord, FamilyMemberRecord, LanguageSkillRecord,
    MilitaryServiceRecord, PersonalProfile, RelationRecords, RelationSet,
};
pub use synclog::{SyncDirection, SyncEntityType, SyncLogAppend, SyncLogEntry, SyncType};
