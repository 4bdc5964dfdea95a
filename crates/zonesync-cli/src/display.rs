//! Plan rendering

use tabled::settings::Style;
use tabled::{Table, Tabled};
use zonesync_core::schema::{self, RecordType};
use zonesync_core::store::CanonicalValue;
use zonesync_core::{ActionPlan, RecordAction, RecordSetAction};

/// Values longer than this are elided in the plan table
const MAX_VALUE_CHARS: usize = 60;

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Action")]
    action: &'static str,
    #[tabled(rename = "Type")]
    record_type: RecordType,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "TTL")]
    ttl: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn set_row(action: &'static str, a: &RecordSetAction) -> PlanRow {
    PlanRow {
        action,
        record_type: a.record_type,
        name: a.path.clone(),
        ttl: a.entry.ttl.to_string(),
        value: format!("{} value(s)", a.entry.values.len()),
        reason: a.reason.to_string(),
    }
}

fn record_row(action: &'static str, a: &RecordAction) -> PlanRow {
    PlanRow {
        action,
        record_type: a.record_type,
        name: a.path.clone(),
        ttl: String::new(),
        value: summarize(&display_value(a.record_type, &a.value)),
        reason: a.reason.to_string(),
    }
}

/// Render a plan as a table. Removal rows are present for visibility even
/// though record-set removals are never executed.
pub fn render_plan(plan: &ActionPlan) -> String {
    let rows: Vec<PlanRow> = plan
        .record_sets
        .create_and_update
        .iter()
        .map(|a| set_row("update set", a))
        .chain(plan.records.create_and_update.iter().map(|a| record_row("add record", a)))
        .chain(plan.record_sets.remove.iter().map(|a| set_row("remove set (skipped)", a)))
        .chain(plan.records.remove.iter().map(|a| record_row("remove record", a)))
        .collect();

    Table::new(rows).with(Style::sharp()).to_string()
}

/// Render a canonical value in the type's field order
fn display_value(record_type: RecordType, value: &CanonicalValue) -> String {
    let descriptor = schema::descriptor(record_type);
    let parts: Vec<String> = descriptor
        .fields
        .iter()
        .filter_map(|field| value.get(field.canonical).map(|v| v.to_string()))
        .collect();

    if parts.is_empty() {
        // value came from an unrecognized remote shape; show it raw
        value.values().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
    } else {
        parts.join(" ")
    }
}

fn summarize(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_CHARS {
        return value.to_string();
    }
    let kept: String = value.chars().take(MAX_VALUE_CHARS - 3).collect();
    format!("{kept}...")
}
