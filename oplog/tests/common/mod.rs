#![allow(dead_code)]

use oplog::destination::memory::MemoryDestination;
use oplog::error::OplogResult;
use oplog::pipeline::{Pipeline, PipelinePhase, PipelineSummary};
use oplog::types::{Statement, StatementKind};
use oplog_config::shared::{ErrorPolicy, PipelineConfig};
use oplog_telemetry::tracing::init_test_tracing;
use serde_json::{Value, json};
use tokio::sync::broadcast;

/// Output of a pipeline run against a memory destination.
pub struct RunOutput {
    pub result: OplogResult<PipelineSummary>,
    pub statements: Vec<Statement>,
    pub lines: Vec<String>,
}

/// Runs a pipeline with `workers` workers over `input` and collects the written lines.
pub async fn run_pipeline(input: &[u8], workers: u16, error_policy: ErrorPolicy) -> RunOutput {
    init_test_tracing();

    let config = PipelineConfig {
        max_workers: workers,
        queue_capacity: None,
        error_policy,
    };
    let destination = MemoryDestination::new();
    let mut pipeline = Pipeline::new(config, destination.clone());

    let result = pipeline.run(input).await;
    let statements = destination.statements().await;
    let lines = destination.lines().await;

    RunOutput {
        result,
        statements,
        lines,
    }
}

/// Serializes oplog entries as a JSON array.
pub fn batch(entries: &[Value]) -> Vec<u8> {
    serde_json::to_vec(entries).unwrap()
}

pub fn insert(ns: &str, document: Value) -> Value {
    json!({"op": "i", "ns": ns, "o": document})
}

pub fn update_set(ns: &str, id: &str, fields: Value) -> Value {
    json!({"op": "u", "ns": ns, "o": {"$v": 2, "diff": {"u": fields}}, "o2": {"_id": id}})
}

pub fn update_unset(ns: &str, id: &str, fields: Value) -> Value {
    json!({"op": "u", "ns": ns, "o": {"$v": 2, "diff": {"d": fields}}, "o2": {"_id": id}})
}

pub fn delete(ns: &str, id: &str) -> Value {
    json!({"op": "d", "ns": ns, "o": {"_id": id}})
}

/// Returns the rendered statements targeting `table`, keeping their order.
pub fn lines_for_table(statements: &[Statement], table: &str) -> Vec<String> {
    statements
        .iter()
        .filter(|statement| {
            statement.kind() != StatementKind::CreateSchema && statement.target() == table
        })
        .map(ToString::to_string)
        .collect()
}

/// Returns the phases received so far, in transition order.
pub fn received_phases(phases: &mut broadcast::Receiver<PipelinePhase>) -> Vec<PipelinePhase> {
    let mut received = Vec::new();
    while let Ok(phase) = phases.try_recv() {
        received.push(phase);
    }

    received
}
