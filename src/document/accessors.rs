//! Typed field accessors.
//!
//! Every accessor follows the same policy:
//! - an absent field or a bare flag yields the default when one is given,
//!   and [`FieldError::Missing`] otherwise;
//! - a value that fails to coerce is always [`FieldError::InvalidFormat`],
//!   even when a default is given.

use crate::error::{FieldError, MissingReason};
use crate::number::Number;

use super::section::{FieldValue, Section};

const STRING: &str = "<string>";
const STRINGS: &str = "a list of strings";
const UINT: &str = "<uint>";
const NUMBER: &str = "a number";
const NUMBERS: &str = "a list of numbers";
const BOOL: &str = "<bool>";
const ITEMS: &str = "a list of items";

impl Section {
    fn lookup(&self, field: &str) -> Result<&str, MissingReason> {
        match self.get(field) {
            Some(FieldValue::Value(v)) => Ok(v),
            Some(FieldValue::Flag) => Err(MissingReason::NoValue),
            None => Err(MissingReason::NonExistent),
        }
    }

    fn missing(&self, field: &str, expected: &'static str, reason: MissingReason) -> FieldError {
        FieldError::Missing {
            section: self.id().to_string(),
            field: field.to_string(),
            expected,
            reason,
        }
    }

    fn invalid(&self, field: &str, expected: &'static str, detail: Option<String>) -> FieldError {
        FieldError::InvalidFormat {
            section: self.id().to_string(),
            field: field.to_string(),
            expected,
            detail,
        }
    }

    /// Shared skeleton: look the field up, coerce a present value, fall back
    /// to the default only when the field has no value.
    fn read<T>(
        &self,
        field: &str,
        expected: &'static str,
        default: Option<T>,
        coerce: impl FnOnce(&str) -> Result<T, Option<String>>,
    ) -> Result<T, FieldError> {
        match self.lookup(field) {
            Ok(raw) => coerce(raw).map_err(|detail| self.invalid(field, expected, detail)),
            Err(reason) => default.ok_or_else(|| self.missing(field, expected, reason)),
        }
    }

    /// The raw string value of a field.
    pub fn get_string(&self, field: &str) -> Result<&str, FieldError> {
        self.lookup(field)
            .map_err(|reason| self.missing(field, STRING, reason))
    }

    /// The raw string value, or `default` when absent or a bare flag.
    pub fn get_string_or<'a>(&'a self, field: &str, default: &'a str) -> &'a str {
        self.lookup(field).unwrap_or(default)
    }

    /// Comma-separated strings, each trimmed. An empty value gives an empty list.
    pub fn get_strings(&self, field: &str) -> Result<Vec<&str>, FieldError> {
        self.lookup(field)
            .map(split_list)
            .map_err(|reason| self.missing(field, STRINGS, reason))
    }

    /// Like [`Section::get_strings`], but an absent field gives an empty list.
    pub fn get_strings_or_empty(&self, field: &str) -> Vec<&str> {
        self.lookup(field).map(split_list).unwrap_or_default()
    }

    /// A non-negative integer written with digits only.
    pub fn get_uint(&self, field: &str) -> Result<u64, FieldError> {
        self.read(field, UINT, None, parse_uint)
    }

    pub fn get_uint_or(&self, field: &str, default: u64) -> Result<u64, FieldError> {
        self.read(field, UINT, Some(default), parse_uint)
    }

    /// An integer when the literal parses as one, a float otherwise.
    pub fn get_number(&self, field: &str) -> Result<Number, FieldError> {
        self.read(field, NUMBER, None, parse_number)
    }

    pub fn get_number_or(&self, field: &str, default: Number) -> Result<Number, FieldError> {
        self.read(field, NUMBER, Some(default), parse_number)
    }

    /// A number widened to `f64`.
    pub fn get_float(&self, field: &str) -> Result<f64, FieldError> {
        self.get_number(field).map(Number::as_f64)
    }

    pub fn get_float_or(&self, field: &str, default: f64) -> Result<f64, FieldError> {
        self.get_number_or(field, Number::Float(default))
            .map(Number::as_f64)
    }

    /// Comma-separated numbers. Fails as a whole if any token is not a number.
    pub fn get_numbers(&self, field: &str) -> Result<Vec<Number>, FieldError> {
        self.read(field, NUMBERS, None, parse_numbers)
    }

    pub fn get_numbers_or_empty(&self, field: &str) -> Result<Vec<Number>, FieldError> {
        self.read(field, NUMBERS, Some(Vec::new()), parse_numbers)
    }

    /// `on/yes/true/1` or `off/no/false/0`, case-insensitively.
    pub fn get_bool(&self, field: &str) -> Result<bool, FieldError> {
        self.read(field, BOOL, None, parse_bool)
    }

    pub fn get_bool_or(&self, field: &str, default: bool) -> Result<bool, FieldError> {
        self.read(field, BOOL, Some(default), parse_bool)
    }

    /// Parse `"<section>,<count>,<section>,<section>,..."` into pairs.
    ///
    /// A token following a section that is not an integer starts the next
    /// pair, and the section gets a count of 1.
    pub fn get_items(&self, field: &str) -> Result<Vec<(&str, i64)>, FieldError> {
        self.lookup(field)
            .map(parse_items)
            .map_err(|reason| self.missing(field, ITEMS, reason))
    }

    pub fn get_items_or_empty(&self, field: &str) -> Vec<(&str, i64)> {
        self.lookup(field).map(parse_items).unwrap_or_default()
    }
}

pub(crate) fn split_list(raw: &str) -> Vec<&str> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::trim).collect()
}

fn parse_uint(raw: &str) -> Result<u64, Option<String>> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(None);
    }
    raw.parse::<u64>()
        .map_err(|_| Some("value is out of range".to_string()))
}

fn parse_number(raw: &str) -> Result<Number, Option<String>> {
    Number::parse(raw).ok_or(None)
}

fn parse_numbers(raw: &str) -> Result<Vec<Number>, Option<String>> {
    split_list(raw)
        .into_iter()
        .enumerate()
        .map(|(i, token)| {
            Number::parse(token).ok_or_else(|| Some(format!("value #{} is not a number", i + 1)))
        })
        .collect()
}

fn parse_bool(raw: &str) -> Result<bool, Option<String>> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        _ => Err(None),
    }
}

fn parse_items(raw: &str) -> Vec<(&str, i64)> {
    let tokens = split_list(raw);
    let mut items = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let section = tokens[i];
        match tokens.get(i + 1).and_then(|t| t.parse::<i64>().ok()) {
            Some(count) => {
                items.push((section, count));
                i += 2;
            }
            None => {
                items.push((section, 1));
                i += 1;
            }
        }
    }
    items
}
