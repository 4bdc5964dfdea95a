//! Live DNS snapshot state machine
//!
//! Populates a [`RecordStore`] by directly querying a name server, with no
//! provider credentials. Used only in snapshot mode; its output is written
//! to a records file and never fed to reconciliation.
//!
//! One cursor per path, all paths running concurrently. Within a path the
//! cursor is strictly sequential: one resolution query per supported type,
//! advanced only after the previous response arrives, so out-of-order DNS
//! responses can never be attributed to the wrong step.

use crate::error::{Error, Result};
use crate::schema::{self, RecordType};
use crate::store::{CanonicalValue, RecordSetEntry, RecordStore};
use crate::traits::{DnsResolver, ResolveError, ResolvedRecord};
use tracing::debug;

/// Snapshot every supported record type for the given paths.
///
/// The zone apex path `@` is probed implicitly in addition to the explicit
/// list. PTR is skipped unconditionally: reverse lookups are not derivable
/// from a forward resolution sweep.
///
/// Live answers carry no usable per-set TTL through this interface, so
/// every snapshotted entry gets `default_ttl`.
///
/// NODATA responses are empty results, not failures. Any other resolution
/// failure fails the entire snapshot immediately (first failure wins;
/// remaining cursors are abandoned).
pub async fn snapshot_from_dns(
    resolver: &dyn DnsResolver,
    zone_name: &str,
    paths: &[String],
    default_ttl: u32,
) -> Result<RecordStore> {
    let mut all_paths: Vec<&str> = vec!["@"];
    for path in paths {
        if path != "@" && !all_paths.contains(&path.as_str()) {
            all_paths.push(path);
        }
    }

    let cursors = all_paths
        .iter()
        .map(|path| snapshot_path(resolver, zone_name, *path, default_ttl));

    let results = futures::future::try_join_all(cursors).await?;

    let mut store = RecordStore::new();
    for (path, entries) in results {
        for (record_type, entry) in entries {
            store.insert_entry(path, record_type, entry);
        }
    }

    Ok(store)
}

/// Run one path's cursor over the ordered type list
async fn snapshot_path<'a>(
    resolver: &dyn DnsResolver,
    zone_name: &str,
    path: &'a str,
    default_ttl: u32,
) -> Result<(&'a str, Vec<(RecordType, RecordSetEntry)>)> {
    let name = if path == "@" {
        zone_name.to_string()
    } else {
        format!("{path}.{zone_name}")
    };

    let mut entries = Vec::new();

    for record_type in RecordType::ALL {
        if record_type == RecordType::Ptr {
            continue;
        }

        debug!(%name, %record_type, "querying");

        match resolver.resolve(&name, record_type).await {
            Ok(answers) if !answers.is_empty() => {
                let values = answers
                    .iter()
                    .map(|answer| canonical_value_from_answer(record_type, answer))
                    .collect::<Result<Vec<_>>>()?;
                entries.push((record_type, RecordSetEntry { ttl: default_ttl, values }));
            }
            Ok(_) | Err(ResolveError::NoData) => {}
            Err(ResolveError::Failed(message)) => {
                return Err(Error::resolution(format!("{name} {record_type}: {message}")));
            }
        }
    }

    Ok((path, entries))
}

/// Convert one live answer into a canonical value through the type's field
/// layout, preferring each field's DNS-side name where one is declared.
fn canonical_value_from_answer(
    record_type: RecordType,
    answer: &ResolvedRecord,
) -> Result<CanonicalValue> {
    let descriptor = schema::descriptor(record_type);
    let mut value = CanonicalValue::new();

    match answer {
        ResolvedRecord::Scalar(datum) => {
            let [field] = descriptor.fields else {
                return Err(Error::resolution(format!(
                    "scalar answer for multi-field type {record_type}"
                )));
            };
            value.insert(
                field.canonical.to_string(),
                crate::store::FieldValue::Str(datum.clone()),
            );
        }
        ResolvedRecord::Text(segments) => {
            let [field] = descriptor.fields else {
                return Err(Error::resolution(format!(
                    "text answer for multi-field type {record_type}"
                )));
            };
            value.insert(
                field.canonical.to_string(),
                crate::store::FieldValue::Str(segments.concat()),
            );
        }
        ResolvedRecord::Fields(fields) => {
            for spec in descriptor.fields {
                let source = spec.dns_field.unwrap_or(spec.canonical);
                let field_value = fields.get(source).ok_or_else(|| {
                    Error::resolution(format!(
                        "{record_type} answer is missing field {source}"
                    ))
                })?;
                value.insert(spec.canonical.to_string(), field_value.clone());
            }
        }
    }

    Ok(value)
}
