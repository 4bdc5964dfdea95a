//! Mutation application engine
//!
//! Executes an action plan against the remote zone API. Targets are
//! materialized from the local store, folded with the plan's record-create
//! actions, and submitted through a single global FIFO queue with exactly
//! one outstanding remote call at a time.
//!
//! ## Serialization
//!
//! The remote API does not guarantee isolation between concurrent mutations
//! to record sets within the same zone. [`MUTATION_CONCURRENCY`] is a
//! correctness requirement, not a tuning knob: it must stay at 1 unless the
//! provider's concurrency contract changes.
//!
//! ## Failure model
//!
//! The first failed mutation aborts the remaining queue. Already-applied
//! mutations are not rolled back and nothing is retried; partial
//! application is a known, accepted outcome.

use crate::error::{Error, Result};
use crate::reconcile::ActionPlan;
use crate::schema::{self, RecordType};
use crate::store::{CanonicalValue, FieldValue, RecordStore};
use crate::traits::{RemoteRecordSet, ZoneApi};
use futures::StreamExt;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Maximum outstanding remote mutations. Must stay at 1: the provider does
/// not isolate concurrent record-set writes within a zone.
pub const MUTATION_CONCURRENCY: usize = 1;

/// DNS caps a single TXT character-string at 255 octets; longer values are
/// split into consecutive segments before submission.
pub const MAX_TXT_SEGMENT_CHARS: usize = 255;

/// Capacity of the progress event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Progress events emitted while a plan is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEvent {
    /// Application started
    Started {
        /// Total units of work in the plan
        total_units: usize,
    },

    /// One record set was submitted and acknowledged
    Submitted {
        /// Record path
        path: String,
        /// Record type
        record_type: RecordType,
        /// Units of work completed so far
        completed_units: usize,
        /// Total units of work in the plan
        total_units: usize,
    },

    /// Every unit of work has been credited
    Completed {
        /// Total units of work in the plan
        total_units: usize,
    },
}

/// One materialized submission: the full replacement record set for a
/// (path, type) pair, plus the units of work it accounts for.
#[derive(Debug)]
struct Target {
    path: String,
    record_type: RecordType,
    record_set: RemoteRecordSet,
    units: usize,
}

/// Applies action plans against a remote zone
pub struct MutationEngine {
    api: Arc<dyn ZoneApi>,
    resource_group: String,
    zone_name: String,
    event_tx: mpsc::Sender<MutationEvent>,
}

impl MutationEngine {
    /// Create an engine for one zone.
    ///
    /// Returns the engine and the receiver side of its progress channel.
    pub fn new(
        api: Arc<dyn ZoneApi>,
        resource_group: impl Into<String>,
        zone_name: impl Into<String>,
    ) -> (Self, mpsc::Receiver<MutationEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let engine = Self {
            api,
            resource_group: resource_group.into(),
            zone_name: zone_name.into(),
            event_tx,
        };

        (engine, event_rx)
    }

    /// Apply a plan produced by [`crate::reconcile::reconcile`] against the
    /// local store it was computed from.
    ///
    /// Completes once every unit of work is credited, or fails on the first
    /// rejected mutation. An empty plan completes immediately with no
    /// remote calls.
    pub async fn apply(&self, local: &RecordStore, plan: &ActionPlan) -> Result<()> {
        let total_units = plan.total_units();
        if total_units == 0 {
            info!("no actions to apply");
            return Ok(());
        }

        self.emit_event(MutationEvent::Started { total_units });

        let targets = materialize_targets(local, plan)?;
        let direct_units: usize = targets.iter().map(|t| t.units).sum();
        // Units not folded into any submission: record-set removals and
        // their implied record removals are reported, never applied.
        let indirect_units = total_units - direct_units;

        debug!(
            targets = targets.len(),
            direct_units, indirect_units, "applying actions"
        );

        let mut completed_units = 0usize;

        // FIFO queue, exactly one outstanding call: the next submission is
        // dispatched only after the previous response arrives.
        let mut submissions = futures::stream::iter(targets)
            .map(|target| self.submit(target))
            .buffered(MUTATION_CONCURRENCY);

        while let Some(result) = submissions.next().await {
            let (path, record_type, units) = result?;
            completed_units += units;

            info!(
                %path,
                %record_type,
                progress = format!("{completed_units}/{total_units}"),
                "record set applied"
            );
            self.emit_event(MutationEvent::Submitted {
                path,
                record_type,
                completed_units,
                total_units,
            });
        }

        // All direct submissions succeeded; credit the unapplied remainder.
        completed_units += indirect_units;
        debug_assert_eq!(completed_units, total_units);

        self.emit_event(MutationEvent::Completed { total_units });
        Ok(())
    }

    /// Submit one target and report the units it carried
    async fn submit(&self, target: Target) -> Result<(String, RecordType, usize)> {
        self.api
            .create_or_update(
                &self.resource_group,
                &self.zone_name,
                &target.path,
                target.record_type,
                target.record_set,
            )
            .await
            .map_err(|e| {
                Error::mutation(&target.path, target.record_type.name(), e.to_string())
            })?;

        Ok((target.path, target.record_type, target.units))
    }

    fn emit_event(&self, event: MutationEvent) {
        // A full channel means the consumer fell behind; drop rather than
        // block the mutation queue.
        if self.event_tx.try_send(event).is_err() {
            warn!("mutation event channel full, dropping event");
        }
    }
}

/// Build the ordered submission list: one full replacement record set per
/// (path, type) present locally, excluding ignored types and pairs slated
/// for (unapplied) removal, with the plan's actions folded in as units of
/// work.
fn materialize_targets(local: &RecordStore, plan: &ActionPlan) -> Result<Vec<Target>> {
    let remove_sets: HashSet<(&str, RecordType)> = plan
        .record_sets
        .remove
        .iter()
        .map(|a| (a.path.as_str(), a.record_type))
        .collect();

    let mut targets: Vec<Target> = Vec::new();
    let mut index: BTreeMap<(String, RecordType), usize> = BTreeMap::new();

    for (path, record_type, entry) in local.iter() {
        if schema::descriptor(record_type).ignore_in_reconciliation {
            continue;
        }
        if remove_sets.contains(&(path, record_type)) {
            continue;
        }

        // A submission replaces the whole remote record set, so it always
        // carries every local value for the pair.
        let mut record_set = RemoteRecordSet::target(path, record_type, entry.ttl);
        for value in &entry.values {
            for segment in expand_txt_segments(record_type, value) {
                record_set.push_value(record_type, &segment)?;
            }
        }

        index.insert((path.to_string(), record_type), targets.len());
        targets.push(Target {
            path: path.to_string(),
            record_type,
            record_set,
            units: 0,
        });
    }

    for action in &plan.record_sets.create_and_update {
        let target = target_for(&mut targets, &index, &action.path, action.record_type)?;
        target.units += 1;
    }

    for action in &plan.records.create_and_update {
        let target = target_for(&mut targets, &index, &action.path, action.record_type)?;
        target.units += 1;
    }

    // Record removals covered by a replacement submission are credited with
    // that submission; the rest stay indirect.
    for action in &plan.records.remove {
        if let Some(&idx) = index.get(&(action.path.clone(), action.record_type)) {
            targets[idx].units += 1;
        }
    }

    // In-sync pairs carry no actions and are never submitted
    targets.retain(|t| t.units > 0);

    Ok(targets)
}

fn target_for<'a>(
    targets: &'a mut [Target],
    index: &BTreeMap<(String, RecordType), usize>,
    path: &str,
    record_type: RecordType,
) -> Result<&'a mut Target> {
    index
        .get(&(path.to_string(), record_type))
        .map(|&idx| &mut targets[idx])
        .ok_or_else(|| {
            Error::Other(format!(
                "plan action for {path} {record_type} has no materialized target"
            ))
        })
}

/// Expand a value into submission entries, splitting over-long TXT values
/// into one entry per 255-character segment. Non-TXT values pass through
/// untouched.
fn expand_txt_segments(record_type: RecordType, value: &CanonicalValue) -> Vec<CanonicalValue> {
    if record_type != RecordType::Txt {
        return vec![value.clone()];
    }

    let Some(FieldValue::Str(text)) = value.get("value") else {
        return vec![value.clone()];
    };

    chunk_txt_value(text)
        .into_iter()
        .map(|segment| {
            let mut entry = value.clone();
            entry.insert("value".to_string(), FieldValue::Str(segment));
            entry
        })
        .collect()
}

/// Split a TXT value into consecutive segments of at most
/// [`MAX_TXT_SEGMENT_CHARS`] characters. Lossless and order-preserving on
/// concatenation; a value at or under the limit yields a single segment.
pub fn chunk_txt_value(value: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for ch in value.chars() {
        if count == MAX_TXT_SEGMENT_CHARS {
            segments.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }

    segments.push(current);
    segments
}
