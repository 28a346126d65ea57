//! cppcheck-junit core library.
//!
//! Converts Cppcheck XML (version 2) defect reports into JUnit XML so CI
//! dashboards can show static-analysis findings as test errors.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: `--config` file loading and effective settings resolution.
//! - `models`: `Finding` and the per-file grouping.
//! - `parser`: Cppcheck XML reader.
//! - `report`: JUnit tree builders (standard and Bitbucket layouts).
//! - `env`: Clock, host name and working-directory capabilities.
//! - `output`: XML serialization.
//! - `app`: Parse → build → write driver.
//! - `utils`: Terminal helpers.
pub mod app;
pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod models;
pub mod output;
pub mod parser;
pub mod report;
pub mod utils;

pub use error::{Error, Result};
