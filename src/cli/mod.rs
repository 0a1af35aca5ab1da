pub mod check;
pub mod completions;
pub mod dump;
pub mod get;
pub mod loot;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::document::Document;
use crate::error::Result;
use crate::gamedata::Gamedata;

/// ltx - X-Ray LTX configuration toolkit
#[derive(Parser, Debug)]
#[command(name = "ltx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a file and print the expanded document
    Dump(dump::DumpArgs),

    /// Read one field as a typed value
    Get(get::GetArgs),

    /// Collect loot from the project's spawn data
    Loot(loot::LootArgs),

    /// Report loot entries and trade data that fail to validate
    Check(check::CheckArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Gamedata roots given on the command line.
#[derive(Args, Debug, Default)]
pub struct GamedataArgs {
    /// Main gamedata root; includes are resolved through it
    #[arg(long)]
    pub gamedata: Option<PathBuf>,

    /// Fallback gamedata root (requires --gamedata)
    #[arg(long, requires = "gamedata")]
    pub alt: Option<PathBuf>,
}

impl GamedataArgs {
    /// Read `file` into a new document, resolving includes through the
    /// gamedata roots when given.
    pub fn read(&self, file: &Path) -> Result<Document> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut doc = match &self.gamedata {
            Some(main) => Document::with_gamedata(name, Gamedata::new(main, self.alt.clone())),
            None => Document::new(name),
        };
        doc.read_file(file)?;
        Ok(doc)
    }
}
