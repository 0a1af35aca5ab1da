//! Dump command: parse a file and write it back out with includes and
//! inheritance expanded.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use regex::Regex;

use crate::document::WriteOptions;
use crate::error::{LtxError, Result};
use crate::output::{display_path, plural, Printer};

use super::GamedataArgs;

/// Parse a file and print the expanded document
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// File to parse
    pub file: PathBuf,

    #[command(flatten)]
    pub gamedata: GamedataArgs,

    /// Only write sections whose id matches this regex (anchored at the start)
    #[arg(long)]
    pub mask: Option<String>,

    /// Fields written first in every section, comma separated
    #[arg(long, value_delimiter = ',')]
    pub order: Vec<String>,

    /// Value that marks a field as not filled in; such fields must resolve
    #[arg(long)]
    pub placeholder: Option<String>,

    /// Fill a placeholder field from another field (FIELD=SOURCE)
    #[arg(long = "fallback", value_parser = parse_fallback, requires = "placeholder")]
    pub fallbacks: Vec<(String, String)>,

    /// Fill a placeholder field with the section id
    #[arg(long = "id-field", value_delimiter = ',', requires = "placeholder")]
    pub id_fields: Vec<String>,

    /// Write to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: DumpArgs) -> Result<()> {
    let printer = Printer::new();
    let doc = args.gamedata.read(&args.file)?;
    printer.status(
        "Parsed",
        &format!(
            "{} ({})",
            display_path(&args.file),
            plural(doc.len(), "section", "sections")
        ),
    );

    let mut options = WriteOptions::default().with_order(args.order);
    if let Some(mask) = &args.mask {
        let regex = Regex::new(mask).map_err(|e| LtxError::Config {
            message: format!("Invalid --mask: {}", e),
            help: None,
        })?;
        options = options.with_mask(regex);
    }

    if let Some(placeholder) = args.placeholder {
        options = options.with_placeholder(placeholder);
    }
    for (field, source) in args.fallbacks {
        options = options.with_fallback(field, source);
    }
    for field in args.id_fields {
        options = options.with_id_field(field);
    }

    match &args.output {
        Some(path) => {
            doc.save(path, &options)?;
            printer.success("Wrote", &printer.cyan(&display_path(path)));
        }
        None => {
            let mut stdout = io::stdout().lock();
            doc.write(&mut stdout, &options)
                .and_then(|()| stdout.flush())
                .map_err(|e| LtxError::Io {
                    path: PathBuf::from("<stdout>"),
                    message: e.to_string(),
                })?;
        }
    }
    Ok(())
}

fn parse_fallback(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, source)) if !field.trim().is_empty() && !source.trim().is_empty() => {
            Ok((field.trim().to_string(), source.trim().to_string()))
        }
        _ => Err(format!("expected FIELD=SOURCE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_fallback() {
        assert_eq!(
            parse_fallback("short_name = inv_name").unwrap(),
            ("short_name".to_string(), "inv_name".to_string())
        );
        assert!(parse_fallback("short_name").is_err());
        assert!(parse_fallback("=inv_name").is_err());
    }
}
