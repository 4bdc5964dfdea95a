//! Remote DNS zone API boundary
//!
//! Defines the interface for listing and mutating record sets in a hosted
//! DNS zone, plus the wire shape of a record set payload.
//!
//! Implementations live in provider crates (`zonesync-provider-azure`).
//! They must not retry, cache, or spawn tasks: one call, one request,
//! errors propagated to the mutation engine.

use crate::error::Result;
use crate::schema::{self, RecordType};
use crate::store::CanonicalValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Properties block of a record set payload: the TTL plus the per-type
/// value arrays (`aRecords`, `mxRecords`, ...) and any metadata the
/// provider nests alongside them (`soaRecord`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSetProperties {
    /// Record set TTL, seconds. Accepts the provider's uppercase spelling
    /// on responses.
    #[serde(alias = "TTL")]
    pub ttl: u32,

    /// Per-type value arrays and metadata, keyed by remote property name.
    /// Empty arrays are never emitted: the provider rejects explicit empty
    /// arrays for unused record types.
    #[serde(flatten)]
    pub records: serde_json::Map<String, serde_json::Value>,
}

/// One remote record set, as listed from or submitted to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecordSet {
    /// Record path relative to the zone (`@` for the apex)
    pub name: String,

    /// Fully-qualified remote type identifier
    /// (e.g. `Microsoft.Network/dnszones/A`)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Resource location; DNS record sets are always global
    #[serde(default = "default_location")]
    pub location: String,

    /// Provider resource tags
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub tags: serde_json::Map<String, serde_json::Value>,

    /// Entity tag for optimistic concurrency, when the provider returns one
    #[serde(rename = "eTag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// TTL and per-type values
    pub properties: RecordSetProperties,
}

fn default_location() -> String {
    "global".to_string()
}

impl RemoteRecordSet {
    /// Materialize an empty submission target for a (path, type) pair,
    /// seeded with the local TTL.
    pub fn target(path: impl Into<String>, record_type: RecordType, ttl: u32) -> Self {
        let descriptor = schema::descriptor(record_type);
        Self {
            name: path.into(),
            record_type: descriptor.remote_type_name.to_string(),
            location: default_location(),
            tags: serde_json::Map::new(),
            etag: None,
            properties: RecordSetProperties {
                ttl,
                records: serde_json::Map::new(),
            },
        }
    }

    /// Append one canonical value under the type's remote property array.
    /// The array is created on first use, so unused arrays are never
    /// present to strip.
    pub fn push_value(&mut self, record_type: RecordType, value: &CanonicalValue) -> Result<()> {
        let property = schema::descriptor(record_type).remote_property_name;
        let serialized = serde_json::to_value(value)?;

        match self
            .properties
            .records
            .entry(property.to_string())
            .or_insert_with(|| serde_json::Value::Array(Vec::new()))
        {
            serde_json::Value::Array(items) => items.push(serialized),
            other => *other = serde_json::Value::Array(vec![serialized]),
        }

        Ok(())
    }

    /// Number of values held under the type's remote property array
    pub fn value_count(&self, record_type: RecordType) -> usize {
        let property = schema::descriptor(record_type).remote_property_name;
        self.properties
            .records
            .get(property)
            .and_then(|v| v.as_array())
            .map_or(0, Vec::len)
    }
}

/// Interface to the remote DNS provider.
///
/// # Thread safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Concurrency
///
/// The provider does not guarantee isolation between concurrent mutations
/// to record sets within the same zone. Callers must serialize writes; the
/// mutation engine enforces this with a global concurrency limit of one.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// List every record set in the zone
    async fn list_all(&self, resource_group: &str, zone_name: &str) -> Result<Vec<RemoteRecordSet>>;

    /// Create or replace the record set for a (path, type) pair
    async fn create_or_update(
        &self,
        resource_group: &str,
        zone_name: &str,
        path: &str,
        record_type: RecordType,
        record_set: RemoteRecordSet,
    ) -> Result<()>;

    /// Delete the record set for a (path, type) pair.
    ///
    /// The mutation engine never issues this call: whole-record-set removal
    /// is a deliberately unsupported, report-only action. The method exists
    /// for explicit external tooling.
    async fn delete(
        &self,
        resource_group: &str,
        zone_name: &str,
        path: &str,
        record_type: RecordType,
    ) -> Result<()>;

    /// Provider name, for logging
    fn provider_name(&self) -> &'static str;
}
