mod common;

use oplog::destination::memory::MemoryDestination;
use oplog::error::ErrorKind;
use oplog::pipeline::{Pipeline, PipelinePhase};
use oplog_config::shared::{ErrorPolicy, PipelineConfig};
use oplog_telemetry::tracing::init_test_tracing;
use serde_json::json;

use crate::common::{
    batch, delete, insert, lines_for_table, received_phases, run_pipeline, update_set,
    update_unset,
};

#[tokio::test(flavor = "multi_thread")]
async fn translates_first_insert_with_schema_and_table() {
    let input = batch(&[insert(
        "test.student",
        json!({"_id": "1", "name": "John", "age": 5}),
    )]);

    let output = run_pipeline(&input, 5, ErrorPolicy::FailFast).await;

    let summary = output.result.unwrap();
    assert_eq!(summary.records_decoded, 1);
    assert_eq!(summary.records_translated, 1);
    assert_eq!(summary.statements_written, 3);
    assert_eq!(
        output.lines,
        vec![
            "CREATE SCHEMA IF NOT EXISTS test;",
            "CREATE TABLE IF NOT EXISTS student (_id VARCHAR(255) PRIMARY KEY, name VARCHAR(255), age BIGINT);",
            "INSERT INTO student (_id, name, age) VALUES ('1', 'John', 5);",
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn insert_lists_exactly_the_source_fields_in_order() {
    let input = batch(&[insert(
        "test.student",
        json!({"_id": "1", "roll_no": 51, "name": "John", "gpa": 3.5, "is_graduated": false}),
    )]);

    let output = run_pipeline(&input, 1, ErrorPolicy::FailFast).await;

    output.result.unwrap();
    assert_eq!(
        output.lines.last().unwrap(),
        "INSERT INTO student (_id, roll_no, name, gpa, is_graduated) VALUES ('1', 51, 'John', 3.5, false);"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn translates_updates_and_deletes() {
    let input = batch(&[
        update_set("test.student", "635b79e231d82a8ab1de863b", json!({"is_graduated": true})),
        update_unset("test.student", "635b79e231d82a8ab1de863b", json!({"roll_no": false})),
        delete("test.student", "635b79e231d82a8ab1de863b"),
    ]);

    let output = run_pipeline(&input, 3, ErrorPolicy::FailFast).await;

    output.result.unwrap();
    assert_eq!(
        output.lines,
        vec![
            "UPDATE student SET is_graduated = true WHERE _id = '635b79e231d82a8ab1de863b';",
            "UPDATE student SET roll_no = NULL WHERE _id = '635b79e231d82a8ab1de863b';",
            "DELETE FROM student WHERE _id = '635b79e231d82a8ab1de863b';",
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_operation_aborts_the_run() {
    let input = batch(&[
        insert("test.student", json!({"_id": "1"})),
        json!({"op": "g", "ns": "test.student", "o": {"_id": "2"}}),
    ]);

    let output = run_pipeline(&input, 5, ErrorPolicy::FailFast).await;

    let err = output.result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOperation);
    assert!(output.lines.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn skip_policy_never_skips_structural_errors() {
    let input = batch(&[
        insert("test.student", json!({"_id": "1"})),
        json!({"op": "i", "ns": "student", "o": {"_id": "2"}}),
    ]);

    let output = run_pipeline(&input, 5, ErrorPolicy::SkipAndReport).await;

    assert_eq!(output.result.unwrap_err().kind(), ErrorKind::InvalidNamespace);
}

#[tokio::test(flavor = "multi_thread")]
async fn fail_fast_stops_on_unsupported_values() {
    let input = batch(&[insert(
        "test.student",
        json!({"_id": "1", "address": {"city": "Lagos"}}),
    )]);

    let output = run_pipeline(&input, 2, ErrorPolicy::FailFast).await;

    assert_eq!(
        output.result.unwrap_err().kind(),
        ErrorKind::UnsupportedValueType
    );
    assert!(output.lines.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn skip_policy_reports_records_and_keeps_catalog_consistent() {
    let input = batch(&[
        insert("test.student", json!({"_id": "1", "name": "John"})),
        // Rejected before the catalog learns about `tags`.
        insert("test.student", json!({"_id": "2", "tags": ["a", "b"]})),
        json!({"op": "u", "ns": "test.student", "o": {"$v": 2}, "o2": {"_id": "1"}}),
        insert("test.student", json!({"_id": "3", "tags": "a"})),
    ]);

    let output = run_pipeline(&input, 4, ErrorPolicy::SkipAndReport).await;

    let summary = output.result.unwrap();
    assert_eq!(summary.records_decoded, 3);
    assert_eq!(summary.records_translated, 2);
    let skipped = summary
        .skipped
        .iter()
        .map(|record| (record.position, record.error.kind()))
        .collect::<Vec<_>>();
    assert_eq!(
        skipped,
        vec![
            (1, ErrorKind::UnsupportedValueType),
            (2, ErrorKind::MissingDiff),
        ]
    );

    assert_eq!(
        output.lines,
        vec![
            "CREATE SCHEMA IF NOT EXISTS test;",
            "CREATE TABLE IF NOT EXISTS student (_id VARCHAR(255) PRIMARY KEY, name VARCHAR(255));",
            "INSERT INTO student (_id, name) VALUES ('1', 'John');",
            "ALTER TABLE student ADD COLUMN tags VARCHAR(255);",
            "INSERT INTO student (_id, tags) VALUES ('3', 'a');",
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn accepts_concatenated_json_values() {
    let input = br#"
        {"op": "i", "ns": "test.student", "o": {"_id": "1"}}
        [{"op": "d", "ns": "test.student", "o": {"_id": "1"}}]
    "#;

    let output = run_pipeline(input, 2, ErrorPolicy::FailFast).await;

    assert_eq!(output.result.unwrap().records_translated, 2);
    assert_eq!(
        output.lines.last().unwrap(),
        "DELETE FROM student WHERE _id = '1';"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn keeps_per_table_order_with_many_workers() {
    let mut entries = Vec::new();
    for i in 0..200 {
        let table = if i % 2 == 0 { "shop.orders" } else { "shop.customers" };
        entries.push(insert(table, json!({"_id": i.to_string(), "seq": i})));
        entries.push(update_set(table, &i.to_string(), json!({"seq": i + 1000})));
    }
    let input = batch(&entries);

    let output = run_pipeline(&input, 16, ErrorPolicy::FailFast).await;

    output.result.unwrap();
    for (table, parity) in [("orders", 0), ("customers", 1)] {
        let lines = lines_for_table(&output.statements, table);
        assert!(lines[0].starts_with(&format!("CREATE TABLE IF NOT EXISTS {table} ")));

        let expected = (0..200)
            .filter(|i| i % 2 == parity)
            .flat_map(|i| {
                [
                    format!("INSERT INTO {table} (_id, seq) VALUES ('{i}', {i});"),
                    format!("UPDATE {table} SET seq = {} WHERE _id = '{i}';", i + 1000),
                ]
            })
            .collect::<Vec<_>>();
        assert_eq!(lines[1..], expected[..]);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_run_passes_through_every_phase() {
    init_test_tracing();

    let mut pipeline = Pipeline::new(PipelineConfig::default(), MemoryDestination::new());
    let mut phases = pipeline.subscribe_phase();
    let input = batch(&[
        insert("test.student", json!({"_id": "1", "name": "John"})),
        delete("test.student", "1"),
    ]);

    pipeline.run(&input).await.unwrap();

    assert_eq!(
        received_phases(&mut phases),
        vec![
            PipelinePhase::Decoding,
            PipelinePhase::Dispatching,
            PipelinePhase::Draining,
            PipelinePhase::Done,
        ]
    );
    assert_eq!(pipeline.phase(), PipelinePhase::Done);
}

#[tokio::test(flavor = "multi_thread")]
async fn decode_failure_aborts_right_after_decoding() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let mut pipeline = Pipeline::new(PipelineConfig::default(), destination.clone());
    let mut phases = pipeline.subscribe_phase();
    let input = batch(&[
        insert("test.student", json!({"_id": "1"})),
        json!({"op": "i", "ns": "invalid", "o": {"_id": "2"}}),
    ]);

    let err = pipeline.run(&input).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidNamespace);
    assert_eq!(
        received_phases(&mut phases),
        vec![PipelinePhase::Decoding, PipelinePhase::Aborted]
    );
    assert!(destination.statements().await.is_empty());
}
