//! Pipeline driver: parse, build, write, and pick the exit code.
//!
//! Terminal states:
//! - parse/IO failure: `Err`, nothing written;
//! - findings present: report written, exit with the configured code;
//! - no findings: synthetic passing report written, exit 0.

use crate::env::Env;
use crate::error::Result;
use crate::output::write_report;
use crate::parser::parse_file;
use crate::report::{build, build_success, Shape};
use std::path::Path;
use tracing::info;

/// Process exit code for any parse, config or IO failure.
pub const FAILURE_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a successful conversion ended.
pub enum Outcome {
    FindingsReported { findings: usize, exit_code: i32 },
    NoFindings,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::FindingsReported { exit_code, .. } => *exit_code,
            Outcome::NoFindings => 0,
        }
    }
}

/// Convert `input` into a JUnit report at `output`.
///
/// `shape` only matters when there are findings; the passing report is
/// always the single-suite layout.
pub fn run(
    input: &Path,
    output: &Path,
    shape: Shape,
    error_exitcode: i32,
    env: &Env,
) -> Result<Outcome> {
    let findings = parse_file(input)?;

    if findings.is_empty() {
        info!("no findings; writing passing report");
        write_report(&build_success(env), output)?;
        return Ok(Outcome::NoFindings);
    }

    info!(?shape, files = findings.len(), "building report");
    let doc = build(&findings, shape, env);
    write_report(&doc, output)?;
    Ok(Outcome::FindingsReported {
        findings: findings.total(),
        exit_code: error_exitcode,
    })
}
