//! CLI argument parsing via `clap`.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cppcheck_junit",
    version,
    about = "Converts Cppcheck XML version 2 to JUnit XML format.",
    long_about = "Converts Cppcheck XML version 2 to JUnit XML format.\n\nConfiguration precedence: CLI > --config file > defaults.",
    after_help = "Usage:\n  $ cppcheck --xml-version=2 --enable=all . 2> cppcheck-result.xml\n  $ cppcheck_junit cppcheck-result.xml cppcheck-junit.xml",
    arg_required_else_help = true
)]
/// Command-line surface: input, output, optional exit code and layout flag.
pub struct Cli {
    #[arg(help = "Cppcheck XML version 2 stderr file.")]
    pub input_file: PathBuf,

    #[arg(help = "JUnit XML output file.")]
    pub output_file: PathBuf,

    #[arg(
        allow_negative_numbers = true,
        help = "If errors are found, integer <n> is returned instead of default 0."
    )]
    pub error_exitcode: Option<i32>,

    #[arg(long, action = clap::ArgAction::SetTrue, help = "Formats output for use in Bitbucket Pipelines")]
    pub bitbucket: bool,

    #[arg(long, help = "Path to a toml|yaml settings file (default: none)")]
    pub config: Option<PathBuf>,
}
