//! Inline item lists: `bread, vodka (2), wpn_pm (1, silencer)`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::ItemCatalog;
use crate::error::SpawnError;
use crate::number::Number;
use crate::validation::{Diagnostic, ValidationResult};

use super::entry::SpawnEntry;

static WITH_PARAMS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+)\s*\(([^)]+)\)$").expect("invalid regex"));
static BARE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+$").expect("invalid regex"));

/// One slot of an item list, before validation against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec<'a> {
    pub name: &'a str,
    pub params: &'a str,
}

/// Split an item list into slots. Commas inside parentheses belong to the
/// item's parameters. Empty slots are kept as `None` so positions survive.
pub fn parse_item_list(raw: &str) -> Result<Vec<Option<ItemSpec<'_>>>, SpawnError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let malformed = || SpawnError::Syntax(format!("wrong item list format: \"{raw}\""));
    if raw.contains('|') {
        return Err(malformed());
    }

    let mut slots = Vec::new();
    let mut start = 0;
    let mut in_parens = false;
    for (pos, c) in raw.char_indices() {
        match (c, in_parens) {
            ('(', true) | (')', false) => return Err(malformed()),
            ('(', false) => in_parens = true,
            (')', true) => in_parens = false,
            (',', false) => {
                slots.push(&raw[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    if in_parens {
        return Err(malformed());
    }
    slots.push(&raw[start..]);

    slots
        .into_iter()
        .map(str::trim)
        .map(|slot| {
            if slot.is_empty() {
                return Ok(None);
            }
            if let Some(caps) = WITH_PARAMS_REGEX.captures(slot) {
                if let (Some(name), Some(params)) = (caps.get(1), caps.get(2)) {
                    return Ok(Some(ItemSpec {
                        name: name.as_str(),
                        params: params.as_str().trim(),
                    }));
                }
            }
            if BARE_REGEX.is_match(slot) {
                return Ok(Some(ItemSpec {
                    name: slot,
                    params: "1",
                }));
            }
            Err(malformed())
        })
        .collect()
}

/// Parse an item list into spawn entries.
///
/// Slots that fail to validate, or that can never spawn (zero count or zero
/// probability), become `None`; validation failures are also reported.
pub fn read_items(
    catalog: &ItemCatalog,
    raw: &str,
) -> Result<(Vec<Option<SpawnEntry>>, ValidationResult), SpawnError> {
    let mut report = ValidationResult::new();
    let items = parse_item_list(raw)?
        .into_iter()
        .map(|slot| {
            let spec = slot?;
            match SpawnEntry::new(catalog, spec.name, Some(spec.params)) {
                Ok(entry) if entry.count() > Number::ZERO && entry.prob() != Some(0) => Some(entry),
                Ok(_) => None,
                Err(err) => {
                    report.push(
                        Diagnostic::error("ltx::items::entry", err.to_string())
                            .with_subject(format!("{} ({})", spec.name, spec.params)),
                    );
                    None
                }
            }
        })
        .collect();
    Ok((items, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::entry::tests::catalog;
    use pretty_assertions::assert_eq;

    fn spec<'a>(name: &'a str, params: &'a str) -> Option<ItemSpec<'a>> {
        Some(ItemSpec { name, params })
    }

    #[test]
    fn test_parse_item_list() {
        assert_eq!(
            parse_item_list("bread, vodka (2), wpn_pm (1, silencer)").unwrap(),
            vec![
                spec("bread", "1"),
                spec("vodka", "2"),
                spec("wpn_pm", "1, silencer"),
            ]
        );
    }

    #[test]
    fn test_empty_slots_kept() {
        assert_eq!(
            parse_item_list("bread,, vodka").unwrap(),
            vec![spec("bread", "1"), None, spec("vodka", "1")]
        );
        assert!(parse_item_list("  ").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lists() {
        for raw in [
            "bread | vodka",
            "wpn_pm (1, (2))",
            "wpn_pm 1)",
            "wpn_pm (1",
            "two words",
            "wpn_pm ()",
        ] {
            assert!(
                matches!(parse_item_list(raw), Err(SpawnError::Syntax(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_read_items() {
        let c = catalog();
        let (items, report) =
            read_items(&c, "bread (2), unknown_item, wpn_pm (1, unload), bread (1, prob=0)").unwrap();

        assert_eq!(items.len(), 4);
        assert_eq!(items[0].as_ref().unwrap().to_string(), "bread = 2");
        assert!(items[1].is_none());
        assert_eq!(items[2].as_ref().unwrap().to_string(), "wpn_pm = 1, unload");
        assert!(items[3].is_none());
        assert_eq!(report.error_count(), 1);
    }
}
