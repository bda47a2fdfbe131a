//! Accord storage abstractions.
//!
//! This crate defines the storage contract the sync engines and service
//! layer are built against:
//! - read traits per concern, bundled as `HrStore`
//! - an atomic `WriteBatch` commit boundary owned by the caller
//! - post-commit observers for commit-triggered work
//! - a deterministic in-memory reference backend
//!
//! Design stance: whoever owns the operation owns the transaction. Engines
//! stage writes; exactly one `commit` per logical operation applies them
//! all-or-nothing, and derived work (auto-sync) runs only after that
//! commit is durable.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod batch;
mod error;
pub mod memory;
mod traits;

pub use batch::{CommitEvent, CommitObserver, CommitReceipt, WriteBatch, WriteOp};
pub use error::{StorageError, StorageResult};
pub use traits::{
    ArchiveStore, CommitStore, ContractStore, EmployeeStore, HrStore, ProfileStore, QueryWindow,
    RoleStore, SettingsStore, SyncLogStore,
};
