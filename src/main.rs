//! Multi-call pipeline resource entrypoint.
//!
//! One step runs per process: `check` reads its request from stdin and
//! writes a version array, `in <destination>` materializes a version, and
//! `out <directory>` reports a build outcome. The resource image installs
//! thin step shims that exec this binary with the matching subcommand.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;

use tugboat::logging;
use tugboat::resource::models::{CheckRequest, InRequest, OutRequest};
use tugboat::resource::{ResourceError, check, in_step, out_step};

#[derive(Debug, Parser)]
#[command(
    name = "tugboat",
    about = "Pipeline resource for Bitbucket Cloud pull requests"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll for the ordered sequence of pull-request versions.
    Check,
    /// Materialize a version into the destination directory.
    In {
        /// Directory to clone the working tree into.
        destination: Utf8PathBuf,
    },
    /// Report a build outcome for a previously materialized version.
    Out {
        /// Step input directory containing the materialized tree.
        directory: Utf8PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Command) -> Result<(), ResourceError> {
    match command {
        Command::Check => {
            let request: CheckRequest = read_request()?;
            logging::init_tracing(request.source.debug);
            let versions = check::run(&request)?;
            write_response(&versions)
        }
        Command::In { destination } => {
            let request: InRequest = read_request()?;
            logging::init_tracing(request.source.debug);
            let response = in_step::run(destination, &request)?;
            write_response(&response)
        }
        Command::Out { directory } => {
            let request: OutRequest = read_request()?;
            logging::init_tracing(request.source.debug);
            let response = out_step::run(directory, &request)?;
            write_response(&response)
        }
    }
}

fn read_request<T: DeserializeOwned>() -> Result<T, ResourceError> {
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .map_err(|error| ResourceError::Protocol {
            message: error.to_string(),
        })?;

    serde_json::from_str(&raw).map_err(|error| ResourceError::Protocol {
        message: error.to_string(),
    })
}

/// Responses are buffered and written whole: stdout carries either one
/// complete JSON document or nothing at all.
fn write_response<T: Serialize>(response: &T) -> Result<(), ResourceError> {
    let payload = serde_json::to_string(response).map_err(|error| ResourceError::Protocol {
        message: error.to_string(),
    })?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{payload}").map_err(|error| ResourceError::Io {
        operation: "writing response to stdout".to_owned(),
        message: error.to_string(),
    })
}
