//! Oplog translator binary.
//!
//! Reads a file of oplog entries, translates them into SQL and writes one statement per line to
//! the output file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use oplog_telemetry::tracing::init_tracing;

use crate::config::load_translator_config;
use crate::core::translate_file;
use crate::error::TranslatorResult;

mod config;
mod core;
mod error;

/// Translates a document-store oplog into SQL statements.
#[derive(Debug, Parser)]
#[command(name = "oplog-translator", version, about)]
pub struct Args {
    /// Oplog file to translate, holding a JSON array of entries or a stream of JSON values.
    #[arg(short, long)]
    pub input: PathBuf,

    /// File receiving the SQL statements [default: output.sql].
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of translation workers.
    #[arg(short, long)]
    pub workers: Option<u16>,

    /// Skip records that cannot be translated instead of aborting, and report them.
    #[arg(long)]
    pub skip_invalid: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = init_tracing(env!("CARGO_BIN_NAME")) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", err.render_report());
            ExitCode::FAILURE
        }
    }
}

/// Loads the configuration and runs the translation on a multi-threaded runtime.
fn run(args: Args) -> TranslatorResult<()> {
    let config = load_translator_config(&args)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(translate_file(config, &args.input))?;

    Ok(())
}
