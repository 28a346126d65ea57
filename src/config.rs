//! Optional config file and effective settings resolution.
//!
//! A config file is read only when `--config` names one; nothing is
//! discovered from the working directory.
//! Defaults:
//! - `bitbucket`: false
//! - `error_exitcode`: unset (exit 0 when findings are present)
//! - `log`: `warn`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{Error, Result};
use crate::report::Shape;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default tracing filter when neither env nor config set one.
pub const DEFAULT_LOG: &str = "warn";

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
/// Root configuration loaded from a `--config` toml or yaml file.
pub struct FileConfig {
    pub bitbucket: Option<bool>,
    pub error_exitcode: Option<i32>,
    pub log: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// Fully-resolved settings used by the driver after applying precedence.
pub struct Effective {
    pub shape: Shape,
    /// Exit code returned when findings were written.
    pub error_exitcode: i32,
    pub log: String,
    /// Config file that contributed, if any.
    pub source: Option<PathBuf>,
}

/// Load a config file, picking the format from its extension.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let s = fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed = if is_yaml {
        serde_yaml::from_str::<Option<FileConfig>>(&s)
            .map(Option::unwrap_or_default)
            .map_err(|e| e.to_string())
    } else {
        toml::from_str::<FileConfig>(&s).map_err(|e| e.to_string())
    };
    parsed.map_err(|detail| Error::Config {
        path: path.to_path_buf(),
        detail: detail.trim().to_string(),
    })
}

/// Resolve `Effective` by merging CLI flags, the `--config` file, and defaults.
pub fn resolve_effective(
    cli_config: Option<&Path>,
    cli_bitbucket: bool,
    cli_error_exitcode: Option<i32>,
) -> Result<Effective> {
    let cfg = match cli_config {
        Some(p) => load_config(p)?,
        None => FileConfig::default(),
    };

    let bitbucket = cli_bitbucket || cfg.bitbucket.unwrap_or(false);
    let error_exitcode = cli_error_exitcode.or(cfg.error_exitcode).unwrap_or(0);
    let log = cfg.log.unwrap_or_else(|| DEFAULT_LOG.to_string());

    Ok(Effective {
        shape: if bitbucket {
            Shape::Bitbucket
        } else {
            Shape::Standard
        },
        error_exitcode,
        log,
        source: cli_config.map(Path::to_path_buf),
    })
}
