//! Classification of a single LTX line.

use once_cell::sync::Lazy;
use regex::Regex;

static INCLUDE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^#include\s+"([^"]+)""#).expect("invalid regex"));
static HEADER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([\w@.-]+)\]$").expect("invalid regex"));
static INHERIT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([\w@.-]+)\]:(.*)$").expect("invalid regex"));

/// Marker opening a verbatim multi-line value.
pub const BLOCK_OPEN: &str = "<<END";
/// Line closing a verbatim multi-line value.
pub const BLOCK_CLOSE: &str = "END";

#[derive(Debug, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Include(&'a str),
    Header(&'a str),
    Inherit { id: &'a str, parents: Vec<String> },
    MalformedHeader(&'a str),
    Field { key: &'a str, value: &'a str },
    Flag(&'a str),
}

/// Drop everything from the first `;` and trim.
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

/// Classify a line that has already been through [`strip_comment`].
pub fn classify(line: &str) -> Line<'_> {
    if line.is_empty() {
        return Line::Blank;
    }

    if let Some(caps) = INCLUDE_REGEX.captures(line) {
        if let Some(target) = caps.get(1) {
            return Line::Include(target.as_str());
        }
    }

    if line.starts_with('[') {
        if let Some(id) = HEADER_REGEX.captures(line).and_then(|c| c.get(1)) {
            return Line::Header(id.as_str());
        }
        if let Some(caps) = INHERIT_REGEX.captures(line) {
            if let (Some(id), Some(parents)) = (caps.get(1), caps.get(2)) {
                // Empty names between commas are kept and fail lookup
                let parents = match parents.as_str().trim() {
                    "" => vec![],
                    list => list.split(',').map(|p| p.trim().to_lowercase()).collect(),
                };
                return Line::Inherit {
                    id: id.as_str(),
                    parents,
                };
            }
        }
        return Line::MalformedHeader(line);
    }

    match line.split_once('=') {
        Some((key, value)) => Line::Field {
            key: key.trim(),
            value: value.trim(),
        },
        None => Line::Flag(line),
    }
}
