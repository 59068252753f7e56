//! # Storage
//!
//! Persistence for the hierarchy. A single redb database holds one table per
//! entity plus one foreign-key index per parent/child relation.

mod redb_store;

pub use redb_store::{RedbStore, StoreCounts};
