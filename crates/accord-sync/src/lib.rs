//! Accord sync engines.
//!
//! Pure engines over the storage write boundary: the field mapping
//! registry, the scalar diff engine, the relation full-replace engine,
//! and the snapshot engine. Engines stage audit rows into the caller's
//! `WriteBatch` and never commit; the orchestration layer owns the
//! transaction and applies consent before delegating here.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod basic;
pub mod registry;
pub mod relations;
pub mod snapshot;

pub use basic::{FieldChange, FieldSyncOutcome};
pub use registry::FieldMapping;
pub use relations::{RelationReplace, RelationSyncOutcome};
pub use snapshot::ProfileSnapshot;
