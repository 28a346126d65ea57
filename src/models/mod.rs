//! Data models for parsed Cppcheck findings.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// A single Cppcheck diagnostic with its (optional) location.
pub struct Finding {
    /// Source path as written by Cppcheck; empty when no `<location>` was given.
    pub file: String,
    /// 1-based line, or 0 when unknown.
    pub line: u32,
    pub message: String,
    pub severity: String,
    pub error_id: String,
    /// Extended explanation. Carried along but not rendered.
    pub verbose: String,
}

#[derive(Debug, Clone, Default)]
/// Findings grouped by their `file`, keyed in first-seen order.
///
/// The empty string is a valid key and stands for "no location".
pub struct FindingsByFile {
    order: Vec<String>,
    groups: HashMap<String, Vec<Finding>>,
}

impl FindingsByFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `finding` under its own `file`, creating the group on first use.
    pub fn push(&mut self, finding: Finding) {
        match self.groups.get_mut(&finding.file) {
            Some(group) => group.push(finding),
            None => {
                self.order.push(finding.file.clone());
                self.groups.insert(finding.file.clone(), vec![finding]);
            }
        }
    }

    /// Number of distinct file keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of findings across all files.
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn get(&self, file: &str) -> Option<&[Finding]> {
        self.groups.get(file).map(Vec::as_slice)
    }

    /// Iterate `(file, findings)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Finding])> + '_ {
        self.order.iter().map(move |file| {
            let findings = self.groups.get(file).map(Vec::as_slice).unwrap_or_default();
            (file.as_str(), findings)
        })
    }
}

impl FromIterator<Finding> for FindingsByFile {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        let mut out = FindingsByFile::new();
        for f in iter {
            out.push(f);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(file: &str, line: u32) -> Finding {
        Finding {
            file: file.into(),
            line,
            message: format!("m{}", line),
            severity: "style".into(),
            error_id: "id".into(),
            verbose: String::new(),
        }
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let by_file: FindingsByFile = vec![
            finding("b.cpp", 1),
            finding("a.cpp", 2),
            finding("b.cpp", 3),
            finding("", 0),
        ]
        .into_iter()
        .collect();

        let keys: Vec<&str> = by_file.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b.cpp", "a.cpp", ""]);
        assert_eq!(by_file.len(), 3);
        assert_eq!(by_file.total(), 4);
        let lines: Vec<u32> = by_file.get("b.cpp").unwrap().iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn test_every_finding_sits_under_its_own_file() {
        let by_file: FindingsByFile = vec![finding("x.c", 4), finding("y.c", 5), finding("x.c", 6)]
            .into_iter()
            .collect();
        for (key, findings) in by_file.iter() {
            assert!(findings.iter().all(|f| f.file == key));
        }
    }

    #[test]
    fn test_empty_mapping() {
        let by_file = FindingsByFile::new();
        assert!(by_file.is_empty());
        assert_eq!(by_file.total(), 0);
        assert_eq!(by_file.iter().count(), 0);
    }
}
