//! A single `[id]` block and its ordered fields.

use indexmap::IndexMap;

/// Value of a declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// `key = value` (the value may be empty).
    Value(String),
    /// A bare `key` line with no `=`.
    Flag,
}

impl FieldValue {
    /// The textual value, or `None` for a bare flag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Value(v) => Some(v),
            FieldValue::Flag => None,
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, FieldValue::Flag)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Value(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Value(value)
    }
}

/// One section of an LTX document.
///
/// Field names are matched exactly. Values are stored verbatim and only
/// coerced by the typed accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    id: String,
    fields: IndexMap<String, FieldValue>,
    source: String,
}

impl Section {
    /// Create an empty section. The id is stored lowercase.
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into().to_lowercase(),
            fields: IndexMap::new(),
            source: source.into(),
        }
    }

    /// Create a section initialised with a copy of `init`'s fields.
    ///
    /// An empty `source` keeps the source of `init`.
    pub fn derived(id: impl Into<String>, init: &Section, source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            id: id.into().to_lowercase(),
            fields: init.fields.clone(),
            source: if source.is_empty() {
                init.source.clone()
            } else {
                source
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the file the section was read from (may be empty).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Copy every field of `other` onto this section.
    ///
    /// Fields already present keep their position and take `other`'s value;
    /// new fields are appended in `other`'s order.
    pub fn overwrite(&mut self, other: &Section) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Set a field, keeping its position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// Remove a field, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Whether the field is declared (with or without a value).
    pub fn line_exist(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names in declaration order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn section(id: &str, fields: &[(&str, &str)]) -> Section {
        let mut s = Section::new(id, "test.ltx");
        for (k, v) in fields {
            s.set(*k, FieldValue::from(*v));
        }
        s
    }

    #[test]
    fn test_id_is_lowercased() {
        assert_eq!(Section::new("Wpn_PM", "").id(), "wpn_pm");
    }

    #[test]
    fn test_overwrite_keeps_positions_and_appends() {
        let mut child = section("c", &[("a", "1"), ("b", "2")]);
        let other = section("o", &[("c", "3"), ("a", "9")]);

        child.overwrite(&other);

        let fields: Vec<(&str, Option<&str>)> =
            child.fields().map(|(k, v)| (k, v.as_str())).collect();
        assert_eq!(
            fields,
            vec![("a", Some("9")), ("b", Some("2")), ("c", Some("3"))]
        );
    }

    #[test]
    fn test_flag_is_distinct_from_absent() {
        let mut s = Section::new("s", "");
        s.set("flag", FieldValue::Flag);

        assert!(s.line_exist("flag"));
        assert!(s.get("flag").unwrap().is_flag());
        assert!(s.get("other").is_none());
    }

    #[test]
    fn test_derived_copies_fields_and_source() {
        let base = section("base", &[("cost", "100")]);
        let copy = Section::derived("copy", &base, "");

        assert_eq!(copy.id(), "copy");
        assert_eq!(copy.source(), "test.ltx");
        assert_eq!(copy.get("cost"), Some(&FieldValue::from("100")));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut s = section("s", &[("a", "1"), ("b", "2"), ("c", "3")]);
        s.remove("b");
        assert_eq!(s.lines().collect::<Vec<_>>(), vec!["a", "c"]);
    }
}
