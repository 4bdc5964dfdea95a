// # zonesync-core
//
// Core library for declarative DNS zone synchronization.
//
// ## Architecture Overview
//
// - **RecordStore**: Canonical normalized record collection; all sources
//   (records file, provider listing, live DNS) converge here
// - **schema**: Static per-record-type metadata (columns, remote names,
//   reconciliation participation)
// - **reconcile**: Pure diff of a local store against a remote store,
//   producing a reasoned action plan
// - **MutationEngine**: Applies a plan through a ZoneApi, one mutation at a
//   time, reporting unit-of-work progress
// - **snapshot**: Populates a store from live DNS resolution
// - **ZoneApi / DnsResolver**: Traits implemented by provider and resolver
//   crates
//
// ## Design Principles
//
// 1. **Normalize first**: Reconciliation only ever compares canonical values
// 2. **Plan, then apply**: Diffing is pure; mutation is a separate engine
// 3. **Serialized writes**: Zone mutations are never concurrent
// 4. **Report, don't destroy**: Whole-record-set removals are surfaced but
//    never executed

pub mod apply;
pub mod error;
pub mod reconcile;
pub mod records_file;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use apply::{MutationEngine, MutationEvent, MAX_TXT_SEGMENT_CHARS, MUTATION_CONCURRENCY};
pub use error::{Error, Result};
pub use reconcile::{
    reconcile, ActionList, ActionPlan, RecordAction, RecordReason, RecordSetAction,
    RecordSetReason,
};
pub use schema::{RecordType, RecordTypeDescriptor};
pub use snapshot::snapshot_from_dns;
pub use store::{CanonicalValue, DeclarativeRow, FieldValue, RecordSetEntry, RecordStore};
pub use traits::{
    DnsResolver, RecordSetProperties, RemoteRecordSet, ResolveError, ResolvedRecord, ZoneApi,
};
