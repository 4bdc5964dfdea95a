//! Canonical record store and normalizer
//!
//! Three heterogeneous sources feed this system: declarative file rows,
//! remote provider record sets, and live DNS answers. All of them are
//! normalized into one canonical in-memory shape, [`RecordStore`], so the
//! reconciliation engine only ever compares like with like.

use crate::error::{Error, Result};
use crate::schema::{self, RecordType, SourceColumn};
use crate::traits::RemoteRecordSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single typed field value inside a canonical record value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free text (addresses, host names, TXT data)
    Str(String),
    /// Parsed integer (preference, priority, weight, port)
    Int(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{n}"),
        }
    }
}

/// One DNS value inside a record set (e.g. one MX target+preference pair),
/// keyed by canonical field name.
pub type CanonicalValue = BTreeMap<String, FieldValue>;

/// The TTL and values for one (path, type) pair.
///
/// TTL is per record set, not per value. Value order preserves the order
/// of the source that produced the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSetEntry {
    /// Time-to-live, seconds; always > 0
    pub ttl: u32,
    /// Ordered canonical values
    pub values: Vec<CanonicalValue>,
}

/// One row of the declarative records file, before normalization.
///
/// Columns are positional: `path type ttl data extra1 extra2 extra3`.
/// Extra columns are unread for types that do not need them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarativeRow {
    /// Record path (subdomain label, or `@` for the zone apex)
    pub path: String,
    /// Record type name (e.g. `A`, `MX`)
    pub record_type: String,
    /// Raw TTL column
    pub ttl: String,
    /// Primary data column
    pub data: String,
    /// First extra column
    pub extra1: Option<String>,
    /// Second extra column
    pub extra2: Option<String>,
    /// Third extra column
    pub extra3: Option<String>,
    /// 1-based source line, for error messages
    pub line: usize,
}

impl DeclarativeRow {
    fn column(&self, column: SourceColumn) -> Option<&str> {
        match column {
            SourceColumn::Data => Some(self.data.as_str()).filter(|s| !s.is_empty()),
            SourceColumn::Extra1 => self.extra1.as_deref().filter(|s| !s.is_empty()),
            SourceColumn::Extra2 => self.extra2.as_deref().filter(|s| !s.is_empty()),
            SourceColumn::Extra3 => self.extra3.as_deref().filter(|s| !s.is_empty()),
        }
    }
}

/// Canonical record collection: record path -> record type -> entry.
///
/// Two independently populated instances exist during a sync run: the local
/// store (declarative file) and the remote store (provider listing or, in
/// snapshot mode, live DNS). Stores are built fresh per run and are
/// read-only inputs to reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStore {
    entries: BTreeMap<String, BTreeMap<RecordType, RecordSetEntry>>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from declarative file rows.
    ///
    /// Each violation fails the whole parse: missing path or type, unknown
    /// type, non-positive TTL, empty data, missing per-type extra columns,
    /// or two rows for the same (path, type) that disagree on TTL.
    pub fn from_declarative_rows(rows: &[DeclarativeRow]) -> Result<Self> {
        let mut store = Self::new();

        for row in rows {
            if row.path.is_empty() {
                return Err(Error::input(format!("path cannot be empty (line {})", row.line)));
            }

            if row.record_type.is_empty() {
                return Err(Error::input(format!("type cannot be empty (line {})", row.line)));
            }

            let record_type = RecordType::from_name(&row.record_type).ok_or_else(|| {
                Error::input(format!(
                    "unknown or unsupported record type {:?} (line {})",
                    row.record_type, row.line
                ))
            })?;

            let ttl: u32 = row.ttl.parse().unwrap_or(0);
            if ttl == 0 {
                return Err(Error::input(format!(
                    "TTL must be an integer > 0, got {:?} (line {})",
                    row.ttl, row.line
                )));
            }

            if row.data.is_empty() {
                return Err(Error::input(format!("data cannot be empty (line {})", row.line)));
            }

            let value = canonical_value_from_row(record_type, row)?;

            let entry = store
                .entries
                .entry(row.path.clone())
                .or_default()
                .entry(record_type)
                .or_insert_with(|| RecordSetEntry { ttl, values: Vec::new() });

            if entry.ttl != ttl {
                return Err(Error::input(format!(
                    "conflicting TTLs for {} of type {}: {} and {} (line {})",
                    row.path, record_type, entry.ttl, ttl, row.line
                )));
            }

            entry.values.push(value);
        }

        Ok(store)
    }

    /// Build a store from the provider's record set listing.
    ///
    /// The record set's fully-qualified type must be known (fatal
    /// [`Error::UnknownRemoteType`] otherwise). Metadata properties
    /// (`soaRecord`), non-array properties, and empty arrays are skipped.
    /// The remote TTL is authoritative; one record set maps to exactly one
    /// TTL by construction, so no conflict detection is needed here.
    pub fn from_remote_record_sets(record_sets: &[RemoteRecordSet]) -> Result<Self> {
        let mut store = Self::new();

        for record_set in record_sets {
            let record_type = schema::type_for_remote_type_name(&record_set.record_type)?;
            let path = record_set.name.clone();

            for (property, value) in &record_set.properties.records {
                if property == "soaRecord" {
                    continue;
                }

                let Some(items) = value.as_array() else {
                    continue;
                };

                if items.is_empty() {
                    continue;
                }

                let entry = store
                    .entries
                    .entry(path.clone())
                    .or_default()
                    .entry(record_type)
                    .or_insert_with(|| RecordSetEntry {
                        ttl: record_set.properties.ttl,
                        values: Vec::new(),
                    });

                for item in items {
                    entry.values.push(canonical_value_from_json(item)?);
                }
            }
        }

        Ok(store)
    }

    /// Insert a complete entry, replacing any existing one for the pair
    pub fn insert_entry(&mut self, path: impl Into<String>, record_type: RecordType, entry: RecordSetEntry) {
        self.entries
            .entry(path.into())
            .or_default()
            .insert(record_type, entry);
    }

    /// Look up the entry for a (path, type) pair
    pub fn get(&self, path: &str, record_type: RecordType) -> Option<&RecordSetEntry> {
        self.entries.get(path).and_then(|types| types.get(&record_type))
    }

    /// Iterate over every (path, type, entry) triple
    pub fn iter(&self) -> impl Iterator<Item = (&str, RecordType, &RecordSetEntry)> {
        self.entries.iter().flat_map(|(path, types)| {
            types
                .iter()
                .map(move |(record_type, entry)| (path.as_str(), *record_type, entry))
        })
    }

    /// Number of (path, type) record sets held
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// True when the store holds no record sets
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Map a declarative row's columns through the type's field layout
fn canonical_value_from_row(record_type: RecordType, row: &DeclarativeRow) -> Result<CanonicalValue> {
    let descriptor = schema::descriptor(record_type);
    let mut value = CanonicalValue::new();

    for field in descriptor.fields {
        let raw = row.column(field.column).ok_or_else(|| {
            Error::input(format!(
                "field {} ({} column) cannot be empty for a {} record (line {})",
                field.canonical,
                field.column.name(),
                record_type,
                row.line
            ))
        })?;

        let parsed = field.parser.parse(raw).map_err(|e| {
            Error::input(format!(
                "field {} of {} record: {} (line {})",
                field.canonical, record_type, e, row.line
            ))
        })?;

        value.insert(field.canonical.to_string(), parsed);
    }

    Ok(value)
}

/// Convert one remote value object into a canonical value.
///
/// TXT values arrive as arrays of character-string segments; they are
/// stored concatenated, matching how values read back from live DNS are
/// normalized. Anything else non-scalar is provider drift and fatal.
fn canonical_value_from_json(item: &serde_json::Value) -> Result<CanonicalValue> {
    let object = item.as_object().ok_or_else(|| {
        Error::Other(format!("remote record value is not an object: {item}"))
    })?;

    let mut value = CanonicalValue::new();
    for (field, raw) in object {
        let converted = match raw {
            serde_json::Value::String(s) => FieldValue::Str(s.clone()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => {
                    return Err(Error::Other(format!(
                        "remote record field {field} is not an integer: {n}"
                    )))
                }
            },
            serde_json::Value::Array(segments) => {
                let mut joined = String::new();
                for segment in segments {
                    let s = segment.as_str().ok_or_else(|| {
                        Error::Other(format!(
                            "remote record field {field} has a non-string segment: {segment}"
                        ))
                    })?;
                    joined.push_str(s);
                }
                FieldValue::Str(joined)
            }
            other => {
                return Err(Error::Other(format!(
                    "unsupported remote record field {field}: {other}"
                )))
            }
        };

        value.insert(field.clone(), converted);
    }

    Ok(value)
}
