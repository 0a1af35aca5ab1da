//! In-memory LTX documents.
//!
//! A [`Document`] is the full expansion of one file and everything it
//! includes: an ordered map of [`Section`]s keyed by lowercase id. Sections
//! keep their fields as written; the typed `get_*` accessors coerce
//! on demand.

mod accessors;
mod section;
mod writer;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{FieldError, ParseError};
use crate::gamedata::Gamedata;
use crate::number::Number;
use crate::parser;

pub use section::{FieldValue, Section};
pub use writer::WriteOptions;

/// A predicate over sections, used to select which sections a report covers.
pub type SectionFilter<'a> = dyn Fn(&Section) -> bool + 'a;

/// A parsed LTX document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    name: String,
    sections: IndexMap<String, Section>,
    gamedata: Option<Gamedata>,
}

impl Document {
    /// Create an empty document without gamedata roots.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: IndexMap::new(),
            gamedata: None,
        }
    }

    /// Create an empty document that resolves paths against `gamedata`.
    pub fn with_gamedata(name: impl Into<String>, gamedata: Gamedata) -> Self {
        Self {
            gamedata: Some(gamedata),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gamedata(&self) -> Option<&Gamedata> {
        self.gamedata.as_ref()
    }

    /// Parse text into this document.
    ///
    /// `source` is the path the text was read from, if any. Without it,
    /// `#include` is an error.
    pub fn read_str(&mut self, raw: &str, source: Option<&Path>) -> Result<(), ParseError> {
        parser::parse_into(self, raw, source)
    }

    /// Read and parse a file by plain path.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<(), ParseError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ParseError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = parser::read_source(path)?;
        self.read_str(&raw, Some(path))
    }

    /// Read and parse a gamedata-relative file, main root first.
    pub fn read_gamedata(&mut self, relative: &str) -> Result<PathBuf, ParseError> {
        let path = self
            .gamedata
            .as_ref()
            .ok_or(ParseError::NoGamedata)?
            .locate(relative)?;
        let raw = parser::read_source(&path)?;
        self.read_str(&raw, Some(&path))?;
        Ok(path)
    }

    /// Look up a section; ids are matched case-insensitively.
    pub fn section(&self, id: &str) -> Result<&Section, FieldError> {
        self.get_section(id)
            .ok_or_else(|| FieldError::UnknownSection {
                section: id.to_string(),
            })
    }

    pub fn get_section(&self, id: &str) -> Option<&Section> {
        self.sections.get(id.to_lowercase().as_str())
    }

    pub fn section_exist(&self, id: &str) -> bool {
        self.get_section(id).is_some()
    }

    /// Whether `field` is declared in section `id`.
    pub fn line_exist(&self, id: &str, field: &str) -> Result<bool, FieldError> {
        Ok(self.section(id)?.line_exist(field))
    }

    /// Section ids in first-occurrence order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(|k| k.as_str())
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Sections accepted by `filter`, in document order.
    pub fn sections_where<'a>(
        &'a self,
        filter: &'a SectionFilter<'a>,
    ) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections.values().filter(move |s| filter(s))
    }

    /// Position of a section in document order.
    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.get_index_of(id.to_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Insert or replace a section. A replaced section keeps its position.
    pub fn insert_section(&mut self, section: Section) -> Option<Section> {
        self.sections.insert(section.id().to_string(), section)
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }

    pub(crate) fn push_section(&mut self, section: Section) {
        self.sections.insert(section.id().to_string(), section);
    }

    pub(crate) fn last_section_mut(&mut self) -> Option<&mut Section> {
        self.sections.last_mut().map(|(_, s)| s)
    }

    pub fn get_string(&self, id: &str, field: &str) -> Result<&str, FieldError> {
        self.section(id)?.get_string(field)
    }

    pub fn get_strings(&self, id: &str, field: &str) -> Result<Vec<&str>, FieldError> {
        self.section(id)?.get_strings(field)
    }

    pub fn get_uint(&self, id: &str, field: &str) -> Result<u64, FieldError> {
        self.section(id)?.get_uint(field)
    }

    pub fn get_uint_or(&self, id: &str, field: &str, default: u64) -> Result<u64, FieldError> {
        self.section(id)?.get_uint_or(field, default)
    }

    pub fn get_number(&self, id: &str, field: &str) -> Result<Number, FieldError> {
        self.section(id)?.get_number(field)
    }

    pub fn get_number_or(
        &self,
        id: &str,
        field: &str,
        default: Number,
    ) -> Result<Number, FieldError> {
        self.section(id)?.get_number_or(field, default)
    }

    pub fn get_float(&self, id: &str, field: &str) -> Result<f64, FieldError> {
        self.section(id)?.get_float(field)
    }

    pub fn get_numbers(&self, id: &str, field: &str) -> Result<Vec<Number>, FieldError> {
        self.section(id)?.get_numbers(field)
    }

    pub fn get_bool(&self, id: &str, field: &str) -> Result<bool, FieldError> {
        self.section(id)?.get_bool(field)
    }

    pub fn get_bool_or(&self, id: &str, field: &str, default: bool) -> Result<bool, FieldError> {
        self.section(id)?.get_bool_or(field, default)
    }

    pub fn get_items(&self, id: &str, field: &str) -> Result<Vec<(&str, i64)>, FieldError> {
        self.section(id)?.get_items(field)
    }
}
