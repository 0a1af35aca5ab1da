//! Loot command: collect, price and count the loot in the spawn data.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::error::{LtxError, Result};
use crate::manifest::Manifest;
use crate::number::Number;
use crate::output::{display_path, plural, Printer};
use crate::project::Project;
use crate::spawn::{SpawnEntry, SpawnPool};
use crate::validation::{print_diagnostics, ValidationResult};

/// Collect loot from the project's spawn data
#[derive(Args, Debug)]
pub struct LootArgs {
    /// Project manifest (ltx.yaml, or a legacy meta .ltx file)
    #[arg(long, short, default_value = "ltx.yaml")]
    pub manifest: PathBuf,

    /// Price items with the trader buy coefficients
    #[arg(long)]
    pub trade: bool,

    /// Rewrite the pool into independent items before printing
    #[arg(long)]
    pub compress: bool,

    /// Print loot grouped by spawn object
    #[arg(long)]
    pub per_object: bool,

    /// Print a JSON report on stdout
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable loot summary.
#[derive(Serialize)]
struct LootReport<'a> {
    cost: f64,
    objects: Number,
    entries: Vec<&'a SpawnEntry>,
    diagnostics: &'a ValidationResult,
}

pub fn run(args: LootArgs) -> Result<()> {
    let printer = Printer::new();
    let manifest = Manifest::load(&args.manifest)?;
    let project = Project::load(manifest)?;
    printer.status(
        "Loaded",
        &format!(
            "{} ({})",
            display_path(&args.manifest),
            plural(project.spawn().len(), "spawn object", "spawn objects")
        ),
    );

    let (loot, mut report) = project.collect_loot();
    report.merge(project.warnings().clone());
    let catalog = project.catalog();

    if args.per_object && !args.json {
        for object in &loot {
            println!("[{}]", object.label);
            print_pool(&object.pool);
            println!();
        }
    }

    let mut pool = SpawnPool::new();
    for object in &loot {
        pool.merge(&object.pool);
    }

    // cost is defined on the uncompressed pool
    let cost = pool.cost(catalog, args.trade)?;
    let objects = pool.game_objects_count(catalog, false)?;
    if args.compress {
        pool.compress(catalog)?;
    }

    if args.json {
        let json = serde_json::to_string_pretty(&LootReport {
            cost,
            objects,
            entries: pool.entries().collect(),
            diagnostics: &report,
        })
        .map_err(|e| LtxError::Config {
            message: format!("Failed to serialize loot report: {}", e),
            help: None,
        })?;
        println!("{json}");
        return Ok(());
    }

    if !args.per_object {
        print_pool(&pool);
    }
    if !report.is_empty() {
        print_diagnostics(&printer, &report);
    }
    printer.info(
        "Loot",
        &format!(
            "{} from {}",
            plural(pool.len(), "entry", "entries"),
            plural(loot.len(), "object", "objects")
        ),
    );
    printer.info("Cost", &format!("{:.2}{}", cost, if args.trade { " (trade)" } else { "" }));
    printer.info("Objects", &format!("{objects}"));
    Ok(())
}

fn print_pool(pool: &SpawnPool) {
    for entry in pool.entries() {
        println!("{entry}");
    }
}
