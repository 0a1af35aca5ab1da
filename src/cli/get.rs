use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::document::Document;
use crate::error::Result;

use super::GamedataArgs;

/// Read one field as a typed value
#[derive(Args, Debug)]
pub struct GetArgs {
    /// File to parse
    pub file: PathBuf,

    /// Section id
    pub section: String,

    /// Field name
    pub field: String,

    /// How to read the value
    #[arg(long = "as", value_enum, default_value_t = ValueKind::String)]
    pub kind: ValueKind,

    #[command(flatten)]
    pub gamedata: GamedataArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValueKind {
    String,
    Strings,
    Uint,
    Number,
    Numbers,
    Bool,
    Items,
}

pub fn run(args: GetArgs) -> Result<()> {
    let doc = args.gamedata.read(&args.file)?;
    for line in render(&doc, &args.section, &args.field, args.kind)? {
        println!("{line}");
    }
    Ok(())
}

/// The value as output lines; list kinds print one element per line.
fn render(doc: &Document, section: &str, field: &str, kind: ValueKind) -> Result<Vec<String>> {
    let lines = match kind {
        ValueKind::String => vec![doc.get_string(section, field)?.to_string()],
        ValueKind::Strings => doc
            .get_strings(section, field)?
            .into_iter()
            .map(str::to_string)
            .collect(),
        ValueKind::Uint => vec![doc.get_uint(section, field)?.to_string()],
        ValueKind::Number => vec![doc.get_number(section, field)?.to_string()],
        ValueKind::Numbers => doc
            .get_numbers(section, field)?
            .into_iter()
            .map(|n| n.to_string())
            .collect(),
        ValueKind::Bool => vec![doc.get_bool(section, field)?.to_string()],
        ValueKind::Items => doc
            .get_items(section, field)?
            .into_iter()
            .map(|(id, count)| format!("{id} {count}"))
            .collect(),
    };
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FieldError, LtxError};
    use pretty_assertions::assert_eq;

    fn doc() -> Document {
        let mut doc = Document::new("test.ltx");
        doc.read_str(
            "[wpn_pm]\n\
             cost = 500\n\
             ammo_class = ammo_9x18_fmj, ammo_9x18_pmm\n\
             position = 1, 2.5, -3\n\
             quest_item = true\n",
            None,
        )
        .unwrap();
        doc
    }

    #[test]
    fn test_render_kinds() {
        let d = doc();
        assert_eq!(render(&d, "wpn_pm", "cost", ValueKind::Uint).unwrap(), vec!["500"]);
        assert_eq!(
            render(&d, "wpn_pm", "ammo_class", ValueKind::Strings).unwrap(),
            vec!["ammo_9x18_fmj", "ammo_9x18_pmm"]
        );
        assert_eq!(
            render(&d, "wpn_pm", "position", ValueKind::Numbers).unwrap(),
            vec!["1", "2.5", "-3"]
        );
        assert_eq!(render(&d, "WPN_PM", "quest_item", ValueKind::Bool).unwrap(), vec!["true"]);
    }

    #[test]
    fn test_render_errors() {
        let d = doc();
        assert!(matches!(
            render(&d, "wpn_pm", "ammo_class", ValueKind::Uint),
            Err(LtxError::Field(FieldError::InvalidFormat { .. }))
        ));
        assert!(matches!(
            render(&d, "nope", "cost", ValueKind::String),
            Err(LtxError::Field(FieldError::UnknownSection { .. }))
        ));
    }
}
