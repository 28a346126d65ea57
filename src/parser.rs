//! Cppcheck XML (version 2) reader.
//!
//! Expected shape:
//!
//! ```xml
//! <results version="2">
//!   <cppcheck version="2.13"/>
//!   <errors>
//!     <error id="nullPointer" severity="error" msg="..." verbose="...">
//!       <location file="src/a.cpp" line="42"/>
//!     </error>
//!   </errors>
//! </results>
//! ```
//!
//! The whole document is walked before any semantic check, so a file that is
//! both malformed and of the wrong version reports as malformed.

use crate::error::{Error, Result};
use crate::models::{Finding, FindingsByFile};
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SUPPORTED_VERSION: i64 = 2;

/// Parse a Cppcheck report file into findings grouped by source file.
pub fn parse_file(path: &Path) -> Result<FindingsByFile> {
    let file = File::open(path).map_err(|e| Error::from_io(path, e))?;
    parse_reader(BufReader::new(file), path)
}

/// Parse an in-memory Cppcheck report; `origin` is only used in diagnostics.
pub fn parse_str(xml: &str, origin: &Path) -> Result<FindingsByFile> {
    parse_reader(xml.as_bytes(), origin)
}

/// Parse a Cppcheck report from any buffered source.
pub fn parse_reader<R: BufRead>(source: R, origin: &Path) -> Result<FindingsByFile> {
    let doc = walk(source, origin)?;

    match doc.version.as_deref().map(str::trim) {
        Some(v) if v.parse::<i64>().ok() == Some(SUPPORTED_VERSION) => {}
        _ => {
            return Err(Error::UnsupportedVersion {
                found: doc.version,
            })
        }
    }
    if !doc.errors_seen {
        return Err(Error::malformed(origin, "missing <errors> element"));
    }

    let mut out = FindingsByFile::new();
    for raw in doc.findings {
        let finding = raw.into_finding(origin)?;
        debug!(file = %finding.file, line = finding.line, id = %finding.error_id, "finding");
        out.push(finding);
    }
    info!(
        findings = out.total(),
        files = out.len(),
        "parsed {}",
        origin.display()
    );
    Ok(out)
}

#[derive(Default)]
struct RawDocument {
    version: Option<String>,
    errors_seen: bool,
    findings: Vec<RawFinding>,
}

#[derive(Default)]
struct RawFinding {
    attrs: HashMap<String, String>,
    location: Option<HashMap<String, String>>,
}

impl RawFinding {
    fn into_finding(mut self, origin: &Path) -> Result<Finding> {
        let mut take = |k: &str| self.attrs.remove(k).unwrap_or_default();
        let message = take("msg");
        let severity = take("severity");
        let error_id = take("id");
        let verbose = take("verbose");

        let (file, line) = match self.location {
            Some(mut loc) => {
                let file = loc.remove("file").unwrap_or_default();
                let line = match loc.remove("line") {
                    Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                        Error::malformed(
                            origin,
                            format!("invalid line number '{}' in <location> of '{}'", raw, error_id),
                        )
                    })?,
                    None => {
                        return Err(Error::malformed(
                            origin,
                            format!("<location> of '{}' has no line attribute", error_id),
                        ))
                    }
                };
                (file, line)
            }
            None => {
                warn!(id = %error_id, "finding has no location");
                (String::new(), 0)
            }
        };

        Ok(Finding {
            file,
            line,
            message,
            severity,
            error_id,
            verbose,
        })
    }
}

/// Where the walker currently is relative to `<results>/<errors>/<error>`.
struct Walker {
    depth: usize,
    root_seen: bool,
    in_errors: bool,
    current: Option<RawFinding>,
    doc: RawDocument,
}

impl Walker {
    fn open(&mut self, e: &BytesStart, decoder: Decoder, origin: &Path) -> Result<()> {
        match self.depth {
            0 => {
                if self.root_seen {
                    return Err(Error::malformed(origin, "junk after document element"));
                }
                self.root_seen = true;
                self.doc.version = attributes(e, decoder, origin)?.remove("version");
            }
            1 if e.name().as_ref() == b"errors" && !self.doc.errors_seen => {
                self.doc.errors_seen = true;
                self.in_errors = true;
            }
            2 if self.in_errors => {
                self.current = Some(RawFinding {
                    attrs: attributes(e, decoder, origin)?,
                    location: None,
                });
            }
            3 => {
                if let Some(cur) = self.current.as_mut() {
                    if cur.location.is_none() && e.name().as_ref() == b"location" {
                        cur.location = Some(attributes(e, decoder, origin)?);
                    }
                }
            }
            _ => {}
        }
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, origin: &Path) -> Result<()> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or_else(|| Error::malformed(origin, "unexpected closing tag"))?;
        match self.depth {
            1 => self.in_errors = false,
            2 => {
                if let Some(f) = self.current.take() {
                    self.doc.findings.push(f);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn walk<R: BufRead>(source: R, origin: &Path) -> Result<RawDocument> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut w = Walker {
        depth: 0,
        root_seen: false,
        in_errors: false,
        current: None,
        doc: RawDocument::default(),
    };

    loop {
        let decoder = reader.decoder();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => w.open(&e, decoder, origin)?,
            Ok(Event::Empty(e)) => {
                w.open(&e, decoder, origin)?;
                w.close(origin)?;
            }
            Ok(Event::End(_)) => w.close(origin)?,
            Ok(Event::Text(t)) => {
                if w.depth == 0 && !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(Error::malformed(origin, "text outside of the document element"));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(quick_xml::Error::Io(e)) => {
                let source = Arc::try_unwrap(e)
                    .unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string()));
                return Err(Error::from_io(origin, source));
            }
            Err(e) => {
                return Err(Error::malformed(
                    origin,
                    format!("{} (at byte {})", e, reader.error_position()),
                ))
            }
        }
        buf.clear();
    }

    if !w.root_seen {
        return Err(Error::malformed(origin, "no element found"));
    }
    if w.depth > 0 {
        return Err(Error::malformed(origin, "unexpected end of file"));
    }
    Ok(w.doc)
}

fn attributes(e: &BytesStart, decoder: Decoder, origin: &Path) -> Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::malformed(origin, err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|err| Error::malformed(origin, err.to_string()))?;
        out.insert(key, value.into_owned());
    }
    Ok(out)
}
