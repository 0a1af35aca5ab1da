//! Rendering a document back to LTX text.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::LtxError;
use crate::parser::{BLOCK_CLOSE, BLOCK_OPEN};

use super::{Document, FieldValue, Section};

/// Options for [`Document::write`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Only sections whose id matches at the start are written.
    pub mask: Option<Regex>,
    /// Fields written first, in this order, when a section has them.
    pub order: Vec<String>,
    /// A value that marks a field as not filled in yet.
    ///
    /// Placeholder fields are replaced from `fallbacks`, then from
    /// `id_fields`; one left unresolved fails the write.
    pub placeholder: Option<String>,
    /// Field -> field whose value replaces it when it holds the placeholder.
    pub fallbacks: IndexMap<String, String>,
    /// Fields that take the section id when they hold the placeholder.
    pub id_fields: Vec<String>,
}

impl WriteOptions {
    pub fn with_mask(mut self, mask: Regex) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_fallback(mut self, field: impl Into<String>, source: impl Into<String>) -> Self {
        self.fallbacks.insert(field.into(), source.into());
        self
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_fields.push(field.into());
        self
    }

    fn accepts(&self, id: &str) -> bool {
        match &self.mask {
            Some(mask) => mask.find(id).is_some_and(|m| m.start() == 0),
            None => true,
        }
    }
}

impl Document {
    /// Write every selected section as LTX text.
    ///
    /// Flags are written as bare keys and multi-line values as
    /// `key = <<END` blocks, so the output parses back to the same fields.
    /// A placeholder that can't be resolved is an `InvalidData` error.
    pub fn write<W: Write>(&self, out: &mut W, options: &WriteOptions) -> io::Result<()> {
        for section in self.sections().filter(|s| options.accepts(s.id())) {
            write_section(out, section, options)?;
        }
        Ok(())
    }

    /// Write the document to a file, replacing it.
    pub fn save(&self, path: &Path, options: &WriteOptions) -> Result<(), LtxError> {
        let mut buffer = Vec::new();
        let io_error = |e: io::Error| LtxError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        self.write(&mut buffer, options).map_err(io_error)?;
        fs::write(path, buffer).map_err(io_error)
    }
}

fn write_section<W: Write>(out: &mut W, section: &Section, options: &WriteOptions) -> io::Result<()> {
    writeln!(out, "[{}]", section.id())?;

    let order = &options.order;
    for key in order {
        if let Some(value) = section.get(key) {
            write_field(out, key, resolve(section, key, value, options)?)?;
        }
    }
    for (key, value) in section.fields() {
        if !order.iter().any(|k| k == key) {
            write_field(out, key, resolve(section, key, value, options)?)?;
        }
    }

    writeln!(out)
}

/// The text to write for a field, `None` for a flag.
fn resolve<'a>(
    section: &'a Section,
    key: &str,
    value: &'a FieldValue,
    options: &WriteOptions,
) -> io::Result<Option<&'a str>> {
    let (Some(mut text), Some(placeholder)) = (value.as_str(), options.placeholder.as_deref()) else {
        return Ok(value.as_str());
    };

    if text == placeholder {
        if let Some(source) = options.fallbacks.get(key) {
            if let Some(replacement) = section.get(source).and_then(FieldValue::as_str) {
                text = replacement;
            }
        }
    }
    if text == placeholder && options.id_fields.iter().any(|f| f == key) {
        text = section.id();
    }
    if text == placeholder {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("field '{key}' in section [{}] is not filled in", section.id()),
        ));
    }
    Ok(Some(text))
}

fn write_field<W: Write>(out: &mut W, key: &str, value: Option<&str>) -> io::Result<()> {
    match value {
        None => writeln!(out, "{key}"),
        Some(text) if text.contains('\n') => {
            writeln!(out, "{key} = {BLOCK_OPEN}")?;
            out.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(out)?;
            }
            writeln!(out, "{BLOCK_CLOSE}")
        }
        Some(text) => writeln!(out, "{key} = {text}"),
    }
}
