//! Access to the execution environment: wall clock, host name and working
//! directory, plus the path helpers that depend on them.
//!
//! Report builders only see these through [`Env`], so tests can pin every
//! value and compare output byte for byte.

use crate::error::{Error, Result};
use chrono::{DateTime, Local, TimeZone};
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Source of report timestamps.
pub trait Clock {
    /// Current local time rendered as ISO-8601.
    fn now(&self) -> String;
}

/// Source of the `hostname` report attribute.
pub trait HostIdentity {
    fn hostname(&self) -> String;
}

/// Local wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        iso_timestamp(&Local::now())
    }
}

/// Host name as reported by the operating system, resolved on every call.
pub struct SystemHost;

impl HostIdentity for SystemHost {
    fn hostname(&self) -> String {
        system_hostname()
    }
}

/// Fixed clock value.
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}

/// Fixed host name.
pub struct FixedHost(pub String);

impl HostIdentity for FixedHost {
    fn hostname(&self) -> String {
        self.0.clone()
    }
}

/// Capabilities handed to the report builders.
pub struct Env {
    pub clock: Box<dyn Clock>,
    pub host: Box<dyn HostIdentity>,
    /// Base directory for relativizing finding paths.
    pub cwd: PathBuf,
}

impl Env {
    /// Real clock, real host name, process working directory.
    pub fn system() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::Io {
            path: PathBuf::from("."),
            source: e,
        })?;
        Ok(Env {
            clock: Box::new(SystemClock),
            host: Box::new(SystemHost),
            cwd,
        })
    }

    /// Deterministic environment for golden comparisons.
    pub fn fixed(timestamp: &str, hostname: &str, cwd: impl Into<PathBuf>) -> Self {
        Env {
            clock: Box::new(FixedClock(timestamp.to_string())),
            host: Box::new(FixedHost(hostname.to_string())),
            cwd: cwd.into(),
        }
    }

    /// `path` relative to the working directory.
    pub fn relpath(&self, path: &str) -> String {
        relpath(path, &self.cwd)
    }
}

/// Render `t` like `datetime.isoformat()`: microseconds are printed only
/// when non-zero.
pub fn iso_timestamp<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let base = t.format("%Y-%m-%dT%H:%M:%S").to_string();
    match t.timestamp_subsec_micros() {
        0 => base,
        us => format!("{}.{:06}", base, us),
    }
}

/// Lexically relativize `path` against `base`.
///
/// Relative inputs are taken relative to `base`; `.` and `..` segments are
/// collapsed without touching the filesystem. The base itself yields `"."`.
pub fn relpath(path: &str, base: &Path) -> String {
    let base = normalize(base);
    let target = normalize(&base.join(path));
    match pathdiff::diff_paths(&target, &base) {
        Some(p) if p.as_os_str().is_empty() => ".".to_string(),
        Some(p) => p.to_string_lossy().into_owned(),
        None => target.to_string_lossy().into_owned(),
    }
}

/// Final `/`-separated segment of `path` (empty for `""` or a trailing slash).
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn normalize(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in p.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn system_hostname() -> String {
    let name = gethostname::gethostname().to_string_lossy().into_owned();
    if name.is_empty() {
        warn!("host name could not be resolved; writing an empty hostname");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    #[test]
    fn test_relpath_inside_and_outside_base() {
        let base = Path::new("/work/proj");
        assert_eq!(relpath("src/a.cpp", base), "src/a.cpp");
        assert_eq!(relpath("./src/../src/a.cpp", base), "src/a.cpp");
        assert_eq!(relpath("/work/proj/lib/b.c", base), "lib/b.c");
        assert_eq!(relpath("/work/other/c.c", base), "../other/c.c");
        assert_eq!(relpath("/work/proj", base), ".");
        assert_eq!(relpath("include/", base), "include");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("src/a.cpp"), "a.cpp");
        assert_eq!(basename("a.cpp"), "a.cpp");
        assert_eq!(basename(""), "");
        assert_eq!(basename("dir/"), "");
    }

    #[test]
    fn test_iso_timestamp_micro_handling() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let whole = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap()
            .and_local_timezone(tz)
            .unwrap();
        assert_eq!(iso_timestamp(&whole), "2024-03-09T07:05:01");

        let frac = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(7, 5, 1, 42)
            .unwrap()
            .and_local_timezone(tz)
            .unwrap();
        assert_eq!(iso_timestamp(&frac), "2024-03-09T07:05:01.000042");
    }

    #[test]
    fn test_fixed_env() {
        let env = Env::fixed("2020-01-01T00:00:00", "builder", "/repo");
        assert_eq!(env.clock.now(), "2020-01-01T00:00:00");
        assert_eq!(env.host.hostname(), "builder");
        assert_eq!(env.relpath("/repo/x/y.c"), "x/y.c");
    }

    #[test]
    fn test_system_host_is_resolved() {
        assert!(!SystemHost.hostname().is_empty());
    }
}
