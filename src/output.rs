//! XML serialization of a [`ReportDocument`].
//!
//! Attribute order follows the layout: standard cases carry
//! `name, classname, time`; Bitbucket cases carry `classname, name, line`.
//! Tabs and line breaks in attribute values are written as character
//! references so readers do not normalize them to spaces.

use crate::error::{Error, Result};
use crate::report::{Case, ReportDocument, Suite};
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Render the document as UTF-8 XML with a declaration.
pub fn render(doc: &ReportDocument) -> Result<Vec<u8>> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(render_err)?;
    match doc {
        ReportDocument::Single(suite) => write_suite(&mut w, suite, false)?,
        ReportDocument::Multi(suites) => {
            w.write_event(Event::Start(BytesStart::new("testsuites")))
                .map_err(render_err)?;
            for suite in suites {
                write_suite(&mut w, suite, true)?;
            }
            w.write_event(Event::End(BytesEnd::new("testsuites")))
                .map_err(render_err)?;
        }
    }
    let mut out = w.into_inner();
    out.push(b'\n');
    Ok(out)
}

/// Render and write the document to `path`, replacing any existing file.
pub fn write_report(doc: &ReportDocument, path: &Path) -> Result<()> {
    let bytes = render(doc)?;
    let mut file = fs::File::create(path).map_err(|e| Error::from_io(path, e))?;
    file.write_all(&bytes)
        .map_err(|e| Error::from_io(path, e))?;
    info!(bytes = bytes.len(), "wrote {}", path.display());
    Ok(())
}

fn write_suite<W: Write>(w: &mut Writer<W>, suite: &Suite, bitbucket: bool) -> Result<()> {
    let mut start = BytesStart::new("testsuite");
    start.push_attribute(attr("name", suite.name.as_str()));
    start.push_attribute(attr("timestamp", suite.timestamp.as_str()));
    start.push_attribute(attr("hostname", suite.hostname.as_str()));
    start.push_attribute(attr("tests", suite.tests.to_string().as_str()));
    start.push_attribute(attr("failures", suite.failures.to_string().as_str()));
    start.push_attribute(attr("errors", suite.errors.to_string().as_str()));
    start.push_attribute(attr("time", suite.time.to_string().as_str()));
    w.write_event(Event::Start(start)).map_err(render_err)?;
    for case in &suite.cases {
        write_case(w, case, bitbucket)?;
    }
    w.write_event(Event::End(BytesEnd::new("testsuite")))
        .map_err(render_err)?;
    Ok(())
}

fn write_case<W: Write>(w: &mut Writer<W>, case: &Case, bitbucket: bool) -> Result<()> {
    let mut start = BytesStart::new("testcase");
    if bitbucket {
        start.push_attribute(attr("classname", case.classname.as_str()));
        start.push_attribute(attr("name", case.name.as_str()));
        if let Some(line) = case.line {
            start.push_attribute(attr("line", line.to_string().as_str()));
        }
    } else {
        start.push_attribute(attr("name", case.name.as_str()));
        start.push_attribute(attr("classname", case.classname.as_str()));
        if let Some(time) = case.time {
            start.push_attribute(attr("time", time.to_string().as_str()));
        }
    }

    if case.details.is_empty() {
        return w.write_event(Event::Empty(start)).map_err(render_err);
    }
    w.write_event(Event::Start(start)).map_err(render_err)?;
    for d in &case.details {
        let mut err = BytesStart::new("error");
        err.push_attribute(attr("type", d.kind.as_str()));
        err.push_attribute(attr("file", d.file.as_str()));
        err.push_attribute(attr("line", d.line.to_string().as_str()));
        err.push_attribute(attr("message", d.message.as_str()));
        w.write_event(Event::Empty(err)).map_err(render_err)?;
    }
    w.write_event(Event::End(BytesEnd::new("testcase")))
        .map_err(render_err)
}

/// Attribute with `value` escaped, including `\t`, `\n` and `\r`.
fn attr<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    let mut out = String::with_capacity(value.len());
    for c in escape(value).chars() {
        match c {
            '\t' => out.push_str("&#09;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(out.into_bytes()),
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}
