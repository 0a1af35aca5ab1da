//! Trader buy coefficients.
//!
//! A buy section lists `item = min, max` pairs; the coefficient used for a
//! neutral relationship is their mean. Keys written as `/regex/` match item
//! ids by pattern and are tried in declaration order after exact ids.

use std::collections::HashMap;

use regex::Regex;

use crate::document::Section;
use crate::number::Number;
use crate::validation::{Diagnostic, ValidationResult};

const DEFAULT_BUY_K: f64 = 1.0;

/// Exact and pattern-based buy coefficients.
#[derive(Debug, Clone, Default)]
pub struct BuyCoefficients {
    exact: HashMap<String, f64>,
    patterns: Vec<(Regex, f64)>,
}

impl BuyCoefficients {
    /// An empty table: every item gets the default coefficient.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from a trader's buy section.
    ///
    /// Values that are not exactly two numbers become 0.0 (no trade) and are
    /// reported as warnings. An empty value or a bare key is 0.0 silently.
    pub fn from_section(section: &Section) -> (Self, ValidationResult) {
        let mut table = Self::new();
        let mut warnings = ValidationResult::new();

        for (key, value) in section.fields() {
            let k = match section.get_numbers_or_empty(key) {
                Ok(nums) if nums.is_empty() => 0.0,
                Ok(nums) if nums.len() == 2 => nums.iter().copied().map(Number::as_f64).sum::<f64>() / 2.0,
                Ok(nums) => {
                    warnings.push(
                        Diagnostic::warning(
                            "ltx::trade::count",
                            format!(
                                "unexpected count ({}) of numbers: '{} = {}', assuming zero (no trade)",
                                nums.len(),
                                key,
                                value.as_str().unwrap_or_default()
                            ),
                        )
                        .with_subject(section.id()),
                    );
                    0.0
                }
                Err(err) => {
                    warnings.push(
                        Diagnostic::warning(
                            "ltx::trade::format",
                            format!("{err}, assuming zero (no trade)"),
                        )
                        .with_subject(section.id()),
                    );
                    0.0
                }
            };

            match pattern_of(key) {
                Some(pattern) => match Regex::new(pattern) {
                    Ok(regex) => table.patterns.push((regex, k)),
                    Err(err) => warnings.push(
                        Diagnostic::warning(
                            "ltx::trade::pattern",
                            format!("invalid pattern '{key}': {err}"),
                        )
                        .with_subject(section.id()),
                    ),
                },
                None => {
                    table.exact.insert(key.to_string(), k);
                }
            }
        }

        (table, warnings)
    }

    pub fn insert(&mut self, id: impl Into<String>, k: f64) {
        self.exact.insert(id.into(), k);
    }

    pub fn push_pattern(&mut self, pattern: Regex, k: f64) {
        self.patterns.push((pattern, k));
    }

    /// Coefficient for `id`: exact entry, then the first matching pattern,
    /// then 1.0.
    pub fn get(&self, id: &str) -> f64 {
        if let Some(k) = self.exact.get(id) {
            return *k;
        }
        self.patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(id))
            .map(|(_, k)| *k)
            .unwrap_or(DEFAULT_BUY_K)
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }
}

/// `/body/` with a non-empty body.
fn pattern_of(key: &str) -> Option<&str> {
    key.strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
        .filter(|body| !body.is_empty())
}
