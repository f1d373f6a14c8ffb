//! Translation of document-store oplog entries into relational SQL.
//!
//! The crate decodes oplog entries describing inserts, updates and deletes, infers relational
//! column types from their dynamically typed values, and renders the DDL and DML statements
//! that replicate them. A [`pipeline::Pipeline`] runs the translation over a pool of concurrent
//! workers, keeping the statements of each table in input order, and hands the statements to a
//! [`destination::Destination`].
//!
//! ```rust,no_run
//! use oplog::destination::file::FileDestination;
//! use oplog::pipeline::Pipeline;
//! use oplog_config::shared::PipelineConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = std::fs::read("oplog.json")?;
//! let destination = FileDestination::create("output.sql").await?;
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::default(), destination);
//! let summary = pipeline.run(&input).await?;
//! println!("wrote {} statements", summary.statements_written);
//! # Ok(())
//! # }
//! ```

pub mod concurrency;
pub mod conversions;
pub mod destination;
pub mod error;
mod macros;
pub mod pipeline;
pub mod schema;
pub mod translation;
pub mod types;
pub mod workers;
