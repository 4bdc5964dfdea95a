//! Architectural Contract Test: Live DNS Snapshot
//!
//! This test verifies the snapshot state machine's query discipline against
//! a scripted resolver.
//!
//! Constraints verified:
//! - The zone apex is probed implicitly alongside explicit paths
//! - Queries within a path are strictly sequential and type-ordered
//! - PTR is never queried
//! - NODATA answers are tolerated; any other failure aborts the snapshot
//!
//! If this test fails, the snapshot state machine is broken.

mod common;

use common::*;
use std::collections::BTreeMap;
use zonesync_core::error::Error;
use zonesync_core::schema::RecordType;
use zonesync_core::snapshot_from_dns;
use zonesync_core::store::FieldValue;
use zonesync_core::traits::ResolvedRecord;

const ZONE: &str = "example.com";
const TTL: u32 = 3600;

#[tokio::test]
async fn apex_is_probed_implicitly_and_paths_are_suffixed() {
    let resolver = MockResolver::new()
        .answering(
            "example.com",
            RecordType::Mx,
            vec![ResolvedRecord::Fields(BTreeMap::from([
                ("exchange".to_string(), FieldValue::Str("mail.example.com".into())),
                ("priority".to_string(), FieldValue::Int(10)),
            ]))],
        )
        .answering(
            "www.example.com",
            RecordType::A,
            vec![ResolvedRecord::Scalar("1.2.3.4".to_string())],
        );

    let store = snapshot_from_dns(&resolver, ZONE, &["www".to_string()], TTL)
        .await
        .unwrap();

    let apex = store.get("@", RecordType::Mx).unwrap();
    assert_eq!(apex.ttl, TTL);
    assert_eq!(apex.values[0].get("preference"), Some(&FieldValue::Int(10)));

    let www = store.get("www", RecordType::A).unwrap();
    assert_eq!(
        www.values[0].get("ipv4Address"),
        Some(&FieldValue::Str("1.2.3.4".to_string()))
    );
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn ptr_is_never_queried_and_types_are_probed_in_order() {
    let resolver = MockResolver::new();
    snapshot_from_dns(&resolver, ZONE, &["www".to_string()], TTL)
        .await
        .unwrap();

    let queries = resolver.queries();
    assert!(queries.iter().all(|(_, t)| *t != RecordType::Ptr));

    // every non-PTR type probed once per path
    assert_eq!(queries.len(), 2 * (RecordType::ALL.len() - 1));

    // within one path the probe order follows the canonical type order
    let www_types: Vec<RecordType> = queries
        .iter()
        .filter(|(name, _)| name == "www.example.com")
        .map(|(_, t)| *t)
        .collect();
    let expected: Vec<RecordType> = RecordType::ALL
        .into_iter()
        .filter(|t| *t != RecordType::Ptr)
        .collect();
    assert_eq!(www_types, expected);
}

#[tokio::test]
async fn nodata_is_tolerated_but_failures_abort() {
    // the all-NODATA zone snapshots to an empty store
    let quiet = MockResolver::new();
    let store = snapshot_from_dns(&quiet, ZONE, &[], TTL).await.unwrap();
    assert!(store.is_empty());

    let broken = MockResolver::new().failing_on("www.example.com", RecordType::Cname, "SERVFAIL");
    let err = snapshot_from_dns(&broken, ZONE, &["www".to_string()], TTL)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Resolution(_)));
    assert!(err.to_string().contains("SERVFAIL"));
}

#[tokio::test]
async fn failure_stops_the_failing_paths_cursor() {
    let resolver = MockResolver::new()
        .failing_on("www.example.com", RecordType::A, "REFUSED");

    snapshot_from_dns(&resolver, ZONE, &["www".to_string()], TTL)
        .await
        .unwrap_err();

    // the cursor never advanced past the failing type
    let www_queries: Vec<RecordType> = resolver
        .queries()
        .into_iter()
        .filter(|(name, _)| name == "www.example.com")
        .map(|(_, t)| t)
        .collect();
    assert_eq!(www_queries, vec![RecordType::A]);
}

#[tokio::test]
async fn txt_segments_are_joined_into_one_value() {
    let resolver = MockResolver::new().answering(
        "example.com",
        RecordType::Txt,
        vec![ResolvedRecord::Text(vec![
            "v=spf1 ".to_string(),
            "-all".to_string(),
        ])],
    );

    let store = snapshot_from_dns(&resolver, ZONE, &[], TTL).await.unwrap();
    let entry = store.get("@", RecordType::Txt).unwrap();
    assert_eq!(
        entry.values[0].get("value"),
        Some(&FieldValue::Str("v=spf1 -all".to_string()))
    );
}

#[tokio::test]
async fn duplicate_and_apex_paths_are_probed_once() {
    let resolver = MockResolver::new();
    snapshot_from_dns(
        &resolver,
        ZONE,
        &["@".to_string(), "www".to_string(), "www".to_string()],
        TTL,
    )
    .await
    .unwrap();

    let apex_queries = resolver
        .queries()
        .iter()
        .filter(|(name, _)| name == "example.com")
        .count();
    assert_eq!(apex_queries, RecordType::ALL.len() - 1);

    let www_queries = resolver
        .queries()
        .iter()
        .filter(|(name, _)| name == "www.example.com")
        .count();
    assert_eq!(www_queries, RecordType::ALL.len() - 1);
}
