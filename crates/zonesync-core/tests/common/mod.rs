//! Test doubles and common utilities for architecture contract tests
//!
//! This module provides minimal test doubles that verify architectural
//! constraints without talking to a real provider or resolver.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use zonesync_core::error::{Error, Result};
use zonesync_core::schema::RecordType;
use zonesync_core::store::{DeclarativeRow, RecordStore};
use zonesync_core::traits::{
    DnsResolver, RemoteRecordSet, ResolveError, ResolvedRecord, ZoneApi,
};

/// A mock ZoneApi that records every call and tracks in-flight concurrency
pub struct MockZoneApi {
    /// Record sets returned by list_all()
    listing: Vec<RemoteRecordSet>,
    /// Paths for which create_or_update() fails
    failing_paths: Vec<String>,
    /// Artificial latency per mutation, to surface concurrency violations
    mutation_delay: Duration,
    /// Call counter for list_all()
    list_call_count: AtomicUsize,
    /// Call counter for create_or_update()
    create_call_count: AtomicUsize,
    /// Call counter for delete()
    delete_call_count: AtomicUsize,
    /// Mutations currently in flight
    in_flight: AtomicUsize,
    /// High-water mark of in-flight mutations
    max_in_flight: AtomicUsize,
    /// Submitted record sets, in arrival order
    submissions: Mutex<Vec<(String, RecordType, RemoteRecordSet)>>,
}

impl MockZoneApi {
    pub fn new() -> Self {
        Self {
            listing: Vec::new(),
            failing_paths: Vec::new(),
            mutation_delay: Duration::ZERO,
            list_call_count: AtomicUsize::new(0),
            create_call_count: AtomicUsize::new(0),
            delete_call_count: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_listing(mut self, listing: Vec<RemoteRecordSet>) -> Self {
        self.listing = listing;
        self
    }

    pub fn failing_on(mut self, path: &str) -> Self {
        self.failing_paths.push(path.to_string());
        self
    }

    pub fn with_mutation_delay(mut self, delay: Duration) -> Self {
        self.mutation_delay = delay;
        self
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    pub fn delete_call_count(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<(String, RecordType, RemoteRecordSet)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn submitted_paths(&self) -> Vec<String> {
        self.submissions
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _, _)| path.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ZoneApi for MockZoneApi {
    async fn list_all(&self, _resource_group: &str, _zone_name: &str) -> Result<Vec<RemoteRecordSet>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.listing.clone())
    }

    async fn create_or_update(
        &self,
        _resource_group: &str,
        _zone_name: &str,
        path: &str,
        record_type: RecordType,
        record_set: RemoteRecordSet,
    ) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.mutation_delay.is_zero() {
            tokio::time::sleep(self.mutation_delay).await;
        }

        self.create_call_count.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_paths.iter().any(|p| p == path) {
            return Err(Error::provider("mock", format!("injected failure for {path}")));
        }

        self.submissions
            .lock()
            .unwrap()
            .push((path.to_string(), record_type, record_set));
        Ok(())
    }

    async fn delete(
        &self,
        _resource_group: &str,
        _zone_name: &str,
        _path: &str,
        _record_type: RecordType,
    ) -> Result<()> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A scripted DnsResolver with a query log.
///
/// Unscripted (name, type) pairs answer NODATA, matching a quiet zone.
pub struct MockResolver {
    answers: HashMap<(String, RecordType), std::result::Result<Vec<ResolvedRecord>, ResolveError>>,
    queries: Mutex<Vec<(String, RecordType)>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(
        mut self,
        name: &str,
        record_type: RecordType,
        answers: Vec<ResolvedRecord>,
    ) -> Self {
        self.answers
            .insert((name.to_string(), record_type), Ok(answers));
        self
    }

    pub fn failing_on(mut self, name: &str, record_type: RecordType, message: &str) -> Self {
        self.answers.insert(
            (name.to_string(), record_type),
            Err(ResolveError::Failed(message.to_string())),
        );
        self
    }

    /// Every query issued, in arrival order
    pub fn queries(&self) -> Vec<(String, RecordType)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsResolver for MockResolver {
    async fn resolve(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> std::result::Result<Vec<ResolvedRecord>, ResolveError> {
        self.queries
            .lock()
            .unwrap()
            .push((name.to_string(), record_type));

        match self.answers.get(&(name.to_string(), record_type)) {
            Some(scripted) => scripted.clone(),
            None => Err(ResolveError::NoData),
        }
    }
}

/// Shorthand for building a local store from declarative rows
pub fn local_store(rows: &[(&str, &str, &str, &str, &[&str])]) -> RecordStore {
    let rows: Vec<DeclarativeRow> = rows
        .iter()
        .enumerate()
        .map(|(index, (path, record_type, ttl, data, extras))| DeclarativeRow {
            path: path.to_string(),
            record_type: record_type.to_string(),
            ttl: ttl.to_string(),
            data: data.to_string(),
            extra1: extras.first().map(|s| s.to_string()),
            extra2: extras.get(1).map(|s| s.to_string()),
            extra3: extras.get(2).map(|s| s.to_string()),
            line: index + 1,
        })
        .collect();

    RecordStore::from_declarative_rows(&rows).expect("test rows must be valid")
}

/// Shorthand for a remote record set with the given properties object
pub fn remote_set(
    name: &str,
    type_name: &str,
    ttl: u32,
    records: serde_json::Value,
) -> RemoteRecordSet {
    use zonesync_core::traits::RecordSetProperties;

    RemoteRecordSet {
        name: name.to_string(),
        record_type: type_name.to_string(),
        location: "global".to_string(),
        tags: Default::default(),
        etag: None,
        properties: RecordSetProperties {
            ttl,
            records: records.as_object().cloned().unwrap_or_default(),
        },
    }
}
