//! Declarative records file codec
//!
//! The file is line-oriented: one value per line, whitespace-delimited
//! columns `path type ttl data [extra1 [extra2 [extra3]]]`. Blank lines and
//! lines starting with `#` are skipped. TXT data may contain spaces, so for
//! TXT rows everything after the TTL column is the data.
//!
//! Import and snapshot modes write the same format back out, so a written
//! file parses into the store that produced it.

use crate::error::{Error, Result};
use crate::schema::{self, RecordType, SourceColumn};
use crate::store::{DeclarativeRow, RecordStore};
use std::path::Path;

/// Parse file contents into raw rows. Column-level validation happens later
/// in [`RecordStore::from_declarative_rows`]; this layer only enforces the
/// line shape.
pub fn parse_records_file(contents: &str) -> Result<Vec<DeclarativeRow>> {
    let mut rows = Vec::new();

    for (index, raw_line) in contents.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw_line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(Error::input(format!(
                "expected at least 4 columns (path type ttl data), got {} (line {line})",
                tokens.len()
            )));
        }

        let record_type = tokens[1];

        // TXT data keeps its spaces; no TXT row has extra columns
        let (data, extras) = if record_type == RecordType::Txt.name() {
            (tokens[3..].join(" "), [None, None, None])
        } else {
            (
                tokens[3].to_string(),
                [
                    tokens.get(4).map(|s| s.to_string()),
                    tokens.get(5).map(|s| s.to_string()),
                    tokens.get(6).map(|s| s.to_string()),
                ],
            )
        };

        let [extra1, extra2, extra3] = extras;

        rows.push(DeclarativeRow {
            path: tokens[0].to_string(),
            record_type: record_type.to_string(),
            ttl: tokens[2].to_string(),
            data,
            extra1,
            extra2,
            extra3,
            line,
        });
    }

    Ok(rows)
}

/// Read and normalize a records file into a store
pub fn load_records_file(path: &Path) -> Result<RecordStore> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::input(format!("cannot read {}: {e}", path.display())))?;
    let rows = parse_records_file(&contents)?;
    RecordStore::from_declarative_rows(&rows)
}

/// Render a store back into file contents.
///
/// Optional header lines are emitted as `#` comments at the top. Row order
/// follows store iteration order (path, then type), values in entry order.
pub fn render_records_file(store: &RecordStore, header: &[&str]) -> Result<String> {
    let mut out = String::new();

    for line in header {
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }

    for (path, record_type, entry) in store.iter() {
        let descriptor = schema::descriptor(record_type);

        for value in &entry.values {
            out.push_str(path);
            out.push(' ');
            out.push_str(record_type.name());
            out.push(' ');
            out.push_str(&entry.ttl.to_string());

            for column in [
                SourceColumn::Data,
                SourceColumn::Extra1,
                SourceColumn::Extra2,
                SourceColumn::Extra3,
            ] {
                let Some(canonical) = descriptor.canonical_for_column(column) else {
                    continue;
                };
                let field_value = value.get(canonical).ok_or_else(|| {
                    Error::Other(format!(
                        "{path} {record_type} value is missing field {canonical}"
                    ))
                })?;
                out.push(' ');
                out.push_str(&field_value.to_string());
            }

            out.push('\n');
        }
    }

    Ok(out)
}

/// Render a store and write it to disk
pub fn write_records_file(path: &Path, store: &RecordStore, header: &[&str]) -> Result<()> {
    let contents = render_records_file(store, header)?;
    std::fs::write(path, contents)
        .map_err(|e| Error::input(format!("cannot write {}: {e}", path.display())))?;
    Ok(())
}
