use std::path::PathBuf;

use clap::Args;

use crate::error::{LtxError, Result};
use crate::manifest::Manifest;
use crate::output::{display_path, Printer};
use crate::project::Project;
use crate::validation::{print_diagnostics, validate_project};

/// Report loot entries and trade data that fail to validate
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Project manifest (ltx.yaml, or a legacy meta .ltx file)
    #[arg(long, short, default_value = "ltx.yaml")]
    pub manifest: PathBuf,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let printer = Printer::new();
    printer.status("Checking", &display_path(&args.manifest));

    let project = Project::load(Manifest::load(&args.manifest)?)?;
    let result = validate_project(&project);
    print_diagnostics(&printer, &result);

    if result.has_errors() {
        return Err(LtxError::Config {
            message: format!("{} invalid loot entries", result.error_count()),
            help: Some("Fix the [spawn] sections listed above".to_string()),
        });
    }
    Ok(())
}
