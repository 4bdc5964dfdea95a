//! Reconciliation engine
//!
//! Diffs two canonical record stores into a minimal, type-aware action
//! plan. Pure function of its inputs: no I/O, no shared state.
//!
//! The plan is deliberately asymmetric. Local state can always be pushed
//! to the remote zone, but whole-record-set removals are computed for
//! visibility and never applied (conservative-sync policy, see
//! [`crate::apply`]). Individual remote values that fail to match a local
//! value are removed implicitly, because the submitted record set replaces
//! the remote one wholesale.

use crate::schema::{self, RecordType};
use crate::store::{CanonicalValue, RecordSetEntry, RecordStore};
use std::fmt;

/// Why a record-set-level action was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSetReason {
    /// The (path, type) pair exists locally but not remotely
    New,
    /// Present on both sides, but the TTL differs
    UpdateTtl,
    /// The (path, type) pair exists remotely but not locally
    NoMatchingLocalRecordSet,
}

impl fmt::Display for RecordSetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordSetReason::New => "new",
            RecordSetReason::UpdateTtl => "update-ttl",
            RecordSetReason::NoMatchingLocalRecordSet => "no-matching-local-record-set",
        })
    }
}

/// Why an individual-value action was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordReason {
    /// The value belongs to a record set that is new remotely
    NewRecordSet,
    /// No remote value matched this local value
    NoMatchingRemoteRecord,
    /// The value belongs to a record set absent locally
    RemoveRecordSet,
    /// No local value matched this remote value
    NoMatchingLocalRecord,
}

impl fmt::Display for RecordReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordReason::NewRecordSet => "new-record-set",
            RecordReason::NoMatchingRemoteRecord => "no-matching-remote-record",
            RecordReason::RemoveRecordSet => "remove-record-set",
            RecordReason::NoMatchingLocalRecord => "no-matching-local-record",
        })
    }
}

/// A whole-record-set decision
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSetAction {
    /// Record path relative to the zone
    pub path: String,
    /// Record type
    pub record_type: RecordType,
    /// Why the action exists
    pub reason: RecordSetReason,
    /// The record set the decision was made about
    pub entry: RecordSetEntry,
}

/// An individual-value decision
#[derive(Debug, Clone, PartialEq)]
pub struct RecordAction {
    /// Record path relative to the zone
    pub path: String,
    /// Record type
    pub record_type: RecordType,
    /// Why the action exists
    pub reason: RecordReason,
    /// The value the decision was made about
    pub value: CanonicalValue,
}

/// Create/update and remove lists for one action dimension
#[derive(Debug, Clone, PartialEq)]
pub struct ActionList<T> {
    /// Actions converging remote state toward local state
    pub create_and_update: Vec<T>,
    /// Actions that would delete remote state (record-set removals are
    /// reported but never applied)
    pub remove: Vec<T>,
}

impl<T> Default for ActionList<T> {
    fn default() -> Self {
        Self {
            create_and_update: Vec::new(),
            remove: Vec::new(),
        }
    }
}

impl<T> ActionList<T> {
    /// Total actions across both lists
    pub fn len(&self) -> usize {
        self.create_and_update.len() + self.remove.len()
    }

    /// True when both lists are empty
    pub fn is_empty(&self) -> bool {
        self.create_and_update.is_empty() && self.remove.is_empty()
    }
}

/// The full diff between a local and a remote store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionPlan {
    /// Whole-set-level decisions
    pub record_sets: ActionList<RecordSetAction>,
    /// Individual-value-level decisions
    pub records: ActionList<RecordAction>,
}

impl ActionPlan {
    /// True when the stores are already in sync
    pub fn is_empty(&self) -> bool {
        self.record_sets.is_empty() && self.records.is_empty()
    }

    /// Total units of work in the plan (one per action, either dimension)
    pub fn total_units(&self) -> usize {
        self.record_sets.len() + self.records.len()
    }
}

/// Field-subset equality: `needle` matches `candidate` iff every field
/// present in `needle` exists in `candidate` with an identical value.
/// Extra fields on `candidate` do not disqualify the match. Intentionally
/// asymmetric and order-independent.
fn is_field_subset(needle: &CanonicalValue, candidate: &CanonicalValue) -> bool {
    needle
        .iter()
        .all(|(field, value)| candidate.get(field) == Some(value))
}

/// First candidate satisfying field-subset equality against `needle`.
/// First-match, no best-match scoring.
pub fn find_matching_value<'a>(
    needle: &CanonicalValue,
    candidates: &'a [CanonicalValue],
) -> Option<&'a CanonicalValue> {
    candidates.iter().find(|c| is_field_subset(needle, c))
}

/// Diff `local` against `remote` into an ordered action plan.
///
/// Types flagged `ignore_in_reconciliation` are skipped entirely in both
/// directions.
pub fn reconcile(local: &RecordStore, remote: &RecordStore) -> ActionPlan {
    let mut plan = ActionPlan::default();

    // Forward pass: converge remote toward local.
    for (path, record_type, entry) in local.iter() {
        if schema::descriptor(record_type).ignore_in_reconciliation {
            continue;
        }

        match remote.get(path, record_type) {
            None => {
                plan.record_sets.create_and_update.push(RecordSetAction {
                    path: path.to_string(),
                    record_type,
                    reason: RecordSetReason::New,
                    entry: entry.clone(),
                });

                for value in &entry.values {
                    plan.records.create_and_update.push(RecordAction {
                        path: path.to_string(),
                        record_type,
                        reason: RecordReason::NewRecordSet,
                        value: value.clone(),
                    });
                }
            }
            Some(remote_entry) => {
                if remote_entry.ttl != entry.ttl {
                    plan.record_sets.create_and_update.push(RecordSetAction {
                        path: path.to_string(),
                        record_type,
                        reason: RecordSetReason::UpdateTtl,
                        entry: entry.clone(),
                    });
                }

                for value in &entry.values {
                    if find_matching_value(value, &remote_entry.values).is_none() {
                        plan.records.create_and_update.push(RecordAction {
                            path: path.to_string(),
                            record_type,
                            reason: RecordReason::NoMatchingRemoteRecord,
                            value: value.clone(),
                        });
                    }
                }
            }
        }
    }

    // Reverse pass: remote state not declared locally.
    for (path, record_type, remote_entry) in remote.iter() {
        if schema::descriptor(record_type).ignore_in_reconciliation {
            continue;
        }

        match local.get(path, record_type) {
            None => {
                plan.record_sets.remove.push(RecordSetAction {
                    path: path.to_string(),
                    record_type,
                    reason: RecordSetReason::NoMatchingLocalRecordSet,
                    entry: remote_entry.clone(),
                });

                for value in &remote_entry.values {
                    plan.records.remove.push(RecordAction {
                        path: path.to_string(),
                        record_type,
                        reason: RecordReason::RemoveRecordSet,
                        value: value.clone(),
                    });
                }
            }
            Some(local_entry) => {
                for value in &remote_entry.values {
                    if find_matching_value(value, &local_entry.values).is_none() {
                        plan.records.remove.push(RecordAction {
                            path: path.to_string(),
                            record_type,
                            reason: RecordReason::NoMatchingLocalRecord,
                            value: value.clone(),
                        });
                    }
                }
            }
        }
    }

    tracing::debug!(
        set_creates = plan.record_sets.create_and_update.len(),
        set_removes = plan.record_sets.remove.len(),
        record_creates = plan.records.create_and_update.len(),
        record_removes = plan.records.remove.len(),
        "reconciliation complete"
    );

    plan
}
