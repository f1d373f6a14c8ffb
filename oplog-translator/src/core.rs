use std::path::Path;

use oplog::destination::file::FileDestination;
use oplog::error::{ErrorKind, OplogResult};
use oplog::oplog_error;
use oplog::pipeline::{Pipeline, PipelineSummary};
use oplog_config::shared::TranslatorConfig;
use tracing::{info, warn};

use crate::error::TranslatorResult;

/// Translates the oplog file at `input` into the configured output file.
///
/// The input is read before the output file is created, so a missing input leaves an existing
/// output untouched.
pub async fn translate_file(
    config: TranslatorConfig,
    input: &Path,
) -> TranslatorResult<PipelineSummary> {
    let bytes = read_input(input).await?;
    let destination = FileDestination::create(&config.output.path).await?;

    info!(
        input = %input.display(),
        output = %destination.path().display(),
        bytes = bytes.len(),
        "starting translation"
    );

    let mut pipeline = Pipeline::new(config.pipeline, destination);
    let summary = pipeline.run(&bytes).await?;

    for skipped in &summary.skipped {
        warn!(position = skipped.position, error = %skipped.error, "record skipped");
    }

    info!(
        records = summary.records_decoded,
        statements = summary.statements_written,
        skipped = summary.skipped.len(),
        "translation finished"
    );

    Ok(summary)
}

async fn read_input(path: &Path) -> OplogResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|err| {
        oplog_error!(
            ErrorKind::NoFileFound,
            "No file found",
            format!("{}: {err}", path.display()),
            source: err
        )
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use oplog_config::shared::ErrorPolicy;

    use super::*;

    const OPLOG: &str = r#"[
        {"op": "i", "ns": "test.student", "o": {"_id": "1", "name": "John", "age": 5}},
        {"op": "u", "ns": "test.student", "o": {"$v": 2, "diff": {"u": {"age": 6}}}, "o2": {"_id": "1"}},
        {"op": "d", "ns": "test.student", "o": {"_id": "1"}}
    ]"#;

    fn config_with_output(output: &Path) -> TranslatorConfig {
        let mut config = TranslatorConfig::default();
        config.output.path = output.to_path_buf();
        config
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn translates_file_into_one_statement_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("oplog.json");
        let output = dir.path().join("output.sql");
        fs::write(&input, OPLOG).unwrap();

        let summary = translate_file(config_with_output(&output), &input)
            .await
            .unwrap();

        assert_eq!(summary.records_translated, 3);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "CREATE SCHEMA IF NOT EXISTS test;\n\
             CREATE TABLE IF NOT EXISTS student (_id VARCHAR(255) PRIMARY KEY, name VARCHAR(255), age BIGINT);\n\
             INSERT INTO student (_id, name, age) VALUES ('1', 'John', 5);\n\
             UPDATE student SET age = 6 WHERE _id = '1';\n\
             DELETE FROM student WHERE _id = '1';\n"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_input_is_reported_without_touching_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.sql");
        fs::write(&output, "previous\n").unwrap();

        let err = translate_file(config_with_output(&output), &dir.path().join("missing.json"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::NoFileFound));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn skip_policy_reports_invalid_records() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("oplog.json");
        let output = dir.path().join("output.sql");
        fs::write(
            &input,
            r#"[
                {"op": "i", "ns": "test.student", "o": {"_id": "1"}},
                {"op": "u", "ns": "test.student", "o": {"$v": 2}, "o2": {"_id": "1"}}
            ]"#,
        )
        .unwrap();

        let mut config = config_with_output(&output);
        config.pipeline.error_policy = ErrorPolicy::SkipAndReport;

        let summary = translate_file(config, &input).await.unwrap();

        assert_eq!(summary.records_translated, 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].position, 1);
        assert_eq!(summary.skipped[0].error.kind(), ErrorKind::MissingDiff);
    }
}
