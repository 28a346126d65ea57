//! JUnit report tree and the builders that map findings onto it.
//!
//! Two layouts exist:
//! - standard: one `<testsuite>`, one `<testcase>` per file, one `<error>`
//!   per finding with a composed `"<line>: (<severity>) <msg>"` message;
//! - Bitbucket: `<testsuites>` with one `<testsuite>` per file, one
//!   `<testcase>` per finding, `type` set to the severity and the raw message.
//!
//! Findings are always reported as errors; `failures` is always zero.

use crate::env::{basename, Env};
use crate::models::{Finding, FindingsByFile};
use tracing::debug;

/// Name of the single suite in the standard layout.
pub const SUITE_NAME: &str = "Cppcheck errors";
/// Label used for findings without a location, and the standard classname.
pub const NO_LOCATION_LABEL: &str = "Cppcheck error";
/// Name and classname of the synthetic passing case.
pub const SUCCESS_LABEL: &str = "Cppcheck success";
/// Nominal duration written on suites and cases.
pub const NOMINAL_TIME: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Output layout selector.
pub enum Shape {
    #[default]
    Standard,
    Bitbucket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// `<error>` element nested in a test case.
pub struct Detail {
    pub kind: String,
    pub file: String,
    pub line: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// `<testcase>` element.
pub struct Case {
    pub name: String,
    pub classname: String,
    /// Present in the standard layout.
    pub time: Option<u32>,
    /// Present in the Bitbucket layout.
    pub line: Option<u32>,
    pub details: Vec<Detail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// `<testsuite>` element with its summary counters.
pub struct Suite {
    pub name: String,
    pub timestamp: String,
    pub hostname: String,
    pub tests: usize,
    pub failures: usize,
    pub errors: usize,
    pub time: u32,
    pub cases: Vec<Case>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Complete output document.
pub enum ReportDocument {
    /// Root `<testsuite>`.
    Single(Suite),
    /// Root `<testsuites>`.
    Multi(Vec<Suite>),
}

impl ReportDocument {
    pub fn suites(&self) -> &[Suite] {
        match self {
            ReportDocument::Single(s) => std::slice::from_ref(s),
            ReportDocument::Multi(v) => v,
        }
    }

    /// Sum of `tests` over all suites.
    pub fn total_tests(&self) -> usize {
        self.suites().iter().map(|s| s.tests).sum()
    }

    /// Sum of `errors` over all suites.
    pub fn total_errors(&self) -> usize {
        self.suites().iter().map(|s| s.errors).sum()
    }
}

/// Build a report in the requested layout.
pub fn build(findings: &FindingsByFile, shape: Shape, env: &Env) -> ReportDocument {
    match shape {
        Shape::Standard => build_standard(findings, env),
        Shape::Bitbucket => build_bitbucket(findings, env),
    }
}

/// Single suite, one case per file.
pub fn build_standard(findings: &FindingsByFile, env: &Env) -> ReportDocument {
    let total = findings.total();
    let cases = findings
        .iter()
        .map(|(file, group)| Case {
            name: file_label(file, env),
            classname: NO_LOCATION_LABEL.to_string(),
            time: Some(NOMINAL_TIME),
            line: None,
            details: group
                .iter()
                .map(|f| Detail {
                    kind: String::new(),
                    file: finding_path(f, env),
                    line: f.line,
                    message: format!("{}: ({}) {}", f.line, f.severity, f.message),
                })
                .collect(),
        })
        .collect();

    ReportDocument::Single(Suite {
        name: SUITE_NAME.to_string(),
        timestamp: env.clock.now(),
        hostname: env.host.hostname(),
        tests: total,
        failures: 0,
        errors: total,
        time: NOMINAL_TIME,
        cases,
    })
}

/// One suite per file, one case per finding.
///
/// Timestamp and host name are read again for every suite.
pub fn build_bitbucket(findings: &FindingsByFile, env: &Env) -> ReportDocument {
    let suites = findings
        .iter()
        .map(|(file, group)| {
            debug!(file, findings = group.len(), "bitbucket suite");
            Suite {
                name: file_label(file, env),
                timestamp: env.clock.now(),
                hostname: env.host.hostname(),
                tests: group.len(),
                failures: 0,
                errors: group.len(),
                time: NOMINAL_TIME,
                cases: group
                    .iter()
                    .map(|f| Case {
                        name: format!("{}:{}", basename(file), f.line),
                        classname: format!("({})", f.severity),
                        time: None,
                        line: Some(f.line),
                        details: vec![Detail {
                            kind: f.severity.clone(),
                            file: finding_path(f, env),
                            line: f.line,
                            message: f.message.clone(),
                        }],
                    })
                    .collect(),
            }
        })
        .collect();
    ReportDocument::Multi(suites)
}

/// Single passing case used when Cppcheck reported nothing.
pub fn build_success(env: &Env) -> ReportDocument {
    ReportDocument::Single(Suite {
        name: SUITE_NAME.to_string(),
        timestamp: env.clock.now(),
        hostname: env.host.hostname(),
        tests: 1,
        failures: 0,
        errors: 0,
        time: NOMINAL_TIME,
        cases: vec![Case {
            name: SUCCESS_LABEL.to_string(),
            classname: SUCCESS_LABEL.to_string(),
            time: Some(NOMINAL_TIME),
            line: None,
            details: Vec::new(),
        }],
    })
}

fn file_label(file: &str, env: &Env) -> String {
    if file.is_empty() {
        NO_LOCATION_LABEL.to_string()
    } else {
        env.relpath(file)
    }
}

fn finding_path(f: &Finding, env: &Env) -> String {
    if f.file.is_empty() {
        String::new()
    } else {
        env.relpath(&f.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Clock, FixedHost, HostIdentity};
    use std::cell::Cell;
    use std::path::PathBuf;

    fn finding(file: &str, line: u32, severity: &str, msg: &str) -> Finding {
        Finding {
            file: file.into(),
            line,
            message: msg.into(),
            severity: severity.into(),
            error_id: "id".into(),
            verbose: String::new(),
        }
    }

    fn env() -> Env {
        Env::fixed("2024-01-02T03:04:05", "ci-host", "/repo")
    }

    fn sample() -> FindingsByFile {
        vec![
            finding("/repo/src/a.cpp", 42, "warning", "X"),
            finding("src/b.cpp", 7, "style", "Y"),
            finding("/repo/src/a.cpp", 50, "error", "Z"),
            finding("", 0, "information", "missing include"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_standard_counts_and_cases() {
        let doc = build_standard(&sample(), &env());
        let ReportDocument::Single(suite) = &doc else {
            panic!("standard layout must be a single suite");
        };
        assert_eq!(suite.name, SUITE_NAME);
        assert_eq!(suite.tests, 4);
        assert_eq!(suite.errors, 4);
        assert_eq!(suite.failures, 0);
        assert_eq!(suite.time, 1);
        assert_eq!(suite.timestamp, "2024-01-02T03:04:05");
        assert_eq!(suite.hostname, "ci-host");

        let names: Vec<&str> = suite.cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["src/a.cpp", "src/b.cpp", "Cppcheck error"]);
        let details: usize = suite.cases.iter().map(|c| c.details.len()).sum();
        assert_eq!(details, 4);
        assert!(suite.cases.iter().all(|c| c.classname == "Cppcheck error"));
        assert!(suite.cases.iter().all(|c| c.time == Some(1) && c.line.is_none()));
    }

    #[test]
    fn test_standard_detail_layout() {
        let doc = build_standard(&sample(), &env());
        let suite = &doc.suites()[0];
        let d = &suite.cases[0].details[0];
        assert_eq!(d.kind, "");
        assert_eq!(d.file, "src/a.cpp");
        assert_eq!(d.line, 42);
        assert_eq!(d.message, "42: (warning) X");

        let none = &suite.cases[2].details[0];
        assert_eq!(none.file, "");
        assert_eq!(none.message, "0: (information) missing include");
    }

    #[test]
    fn test_bitbucket_counts_and_cases() {
        let doc = build_bitbucket(&sample(), &env());
        let ReportDocument::Multi(suites) = &doc else {
            panic!("bitbucket layout must be multi-suite");
        };
        assert_eq!(suites.len(), 3);
        assert_eq!(doc.total_tests(), 4);
        assert_eq!(doc.total_errors(), 4);
        let cases: usize = suites.iter().map(|s| s.cases.len()).sum();
        assert_eq!(cases, 4);
        assert!(suites
            .iter()
            .flat_map(|s| s.cases.iter())
            .all(|c| c.details.len() == 1));

        let a = &suites[0];
        assert_eq!(a.name, "src/a.cpp");
        assert_eq!(a.tests, 2);
        assert_eq!(a.failures, 0);
        assert_eq!(a.cases[0].name, "a.cpp:42");
        assert_eq!(a.cases[0].classname, "(warning)");
        assert_eq!(a.cases[0].line, Some(42));
        assert_eq!(a.cases[0].time, None);

        let d = &a.cases[0].details[0];
        assert_eq!(d.kind, "warning");
        assert_eq!(d.message, "X");
        assert_eq!(d.file, "src/a.cpp");
    }

    #[test]
    fn test_bitbucket_no_location_suite() {
        let doc = build_bitbucket(&sample(), &env());
        let suite = &doc.suites()[2];
        assert_eq!(suite.name, "Cppcheck error");
        assert_eq!(suite.cases[0].name, ":0");
        assert_eq!(suite.cases[0].details[0].file, "");
    }

    struct CountingClock(Cell<u32>);

    impl Clock for CountingClock {
        fn now(&self) -> String {
            self.0.set(self.0.get() + 1);
            format!("t{}", self.0.get())
        }
    }

    struct CountingHost(Cell<u32>);

    impl HostIdentity for CountingHost {
        fn hostname(&self) -> String {
            self.0.set(self.0.get() + 1);
            format!("h{}", self.0.get())
        }
    }

    #[test]
    fn test_bitbucket_reads_environment_per_suite() {
        let env = Env {
            clock: Box::new(CountingClock(Cell::new(0))),
            host: Box::new(CountingHost(Cell::new(0))),
            cwd: PathBuf::from("/repo"),
        };
        let doc = build_bitbucket(&sample(), &env);
        let stamps: Vec<&str> = doc.suites().iter().map(|s| s.timestamp.as_str()).collect();
        let hosts: Vec<&str> = doc.suites().iter().map(|s| s.hostname.as_str()).collect();
        assert_eq!(stamps, vec!["t1", "t2", "t3"]);
        assert_eq!(hosts, vec!["h1", "h2", "h3"]);
    }

    #[test]
    fn test_standard_reads_environment_once() {
        let env = Env {
            clock: Box::new(CountingClock(Cell::new(0))),
            host: Box::new(FixedHost("h".into())),
            cwd: PathBuf::from("/repo"),
        };
        let doc = build_standard(&sample(), &env);
        assert_eq!(doc.suites()[0].timestamp, "t1");
    }

    #[test]
    fn test_success_suite() {
        let doc = build_success(&env());
        let suite = &doc.suites()[0];
        assert!(matches!(doc, ReportDocument::Single(_)));
        assert_eq!((suite.tests, suite.errors, suite.failures), (1, 0, 0));
        assert_eq!(suite.cases.len(), 1);
        assert_eq!(suite.cases[0].name, "Cppcheck success");
        assert_eq!(suite.cases[0].classname, "Cppcheck success");
        assert!(suite.cases[0].details.is_empty());
    }

    #[test]
    fn test_build_dispatches_on_shape() {
        let f = sample();
        assert!(matches!(build(&f, Shape::Standard, &env()), ReportDocument::Single(_)));
        assert!(matches!(build(&f, Shape::Bitbucket, &env()), ReportDocument::Multi(_)));
    }
}
