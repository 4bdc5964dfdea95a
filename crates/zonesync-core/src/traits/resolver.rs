//! Live DNS resolver boundary
//!
//! Used only by the snapshot state machine. Implementations live in
//! resolver crates (`zonesync-resolver`).

use crate::schema::RecordType;
use crate::store::FieldValue;
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Resolution failure, split so the snapshot driver can distinguish
/// "this name has no records of that type" from real failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The name exists but has no records of the requested type (NODATA).
    /// Not an error for snapshot purposes.
    #[error("no records of the requested type")]
    NoData,

    /// Any other resolution failure. Fatal for the path's snapshot.
    #[error("resolution failed: {0}")]
    Failed(String),
}

/// One live DNS answer, in the shape the protocol hands back
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRecord {
    /// A single datum (A, AAAA, CNAME, NS, PTR)
    Scalar(String),

    /// TXT character-string segments, in wire order
    Text(Vec<String>),

    /// Multi-field answers (MX, SRV), keyed by the resolver's field names
    Fields(BTreeMap<String, FieldValue>),
}

/// Interface to a live DNS resolver.
///
/// One call resolves one (name, type) pair. Implementations must be
/// thread-safe; the snapshot driver issues queries for different paths
/// concurrently.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolve `name` for the given record type
    async fn resolve(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<ResolvedRecord>, ResolveError>;
}
