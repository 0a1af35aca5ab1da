//! Project loading: manifest -> gamedata -> system, trade and spawn data.
//!
//! A [`Project`] is built once at startup and passed by reference to
//! whatever needs item metadata or spawn data.

use crate::catalog::{BuyCoefficients, ItemCatalog};
use crate::document::{Document, Section};
use crate::error::Result;
use crate::gamedata::Gamedata;
use crate::manifest::{Manifest, TradeConfig};
use crate::spawn::{SpawnEntry, SpawnPool};
use crate::validation::{Diagnostic, ValidationResult};

/// Custom-data sections whose fields are loot.
const LOOT_SECTIONS: [&str; 2] = ["spawn", "spawn_tm"];

/// Loaded project data.
#[derive(Debug, Clone)]
pub struct Project {
    manifest: Manifest,
    catalog: ItemCatalog,
    spawn: Document,
    warnings: ValidationResult,
}

/// The loot of one spawn object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLoot {
    /// Id of the object's section in the spawn data.
    pub id: String,
    /// The object's `name`, or `[id]` when it has none.
    pub label: String,
    pub pool: SpawnPool,
}

impl Project {
    /// Read every file the manifest names.
    pub fn load(manifest: Manifest) -> Result<Self> {
        let gamedata = manifest.gamedata()?;
        log::debug!(
            "gamedata: main={} alt={}",
            gamedata.main().display(),
            gamedata.alt().map(|p| p.display().to_string()).unwrap_or_else(|| "-".to_string())
        );

        let system = read_document(&gamedata, "system.ltx", [manifest.system.as_str()])?;

        let mut warnings = ValidationResult::new();
        let trade = match &manifest.trade {
            Some(config) => {
                let (trade, report) = load_trade(&gamedata, config)?;
                warnings.merge(report);
                trade
            }
            None => BuyCoefficients::new(),
        };

        let catalog = ItemCatalog::new(system, manifest.class_to_type.clone())
            .with_trade(trade)
            .with_ignored(manifest.ignored_sections.iter().cloned());

        let spawn = read_document(&gamedata, "all.spawn", manifest.spawn.iter().map(String::as_str))?;
        log::debug!("spawn data: {} objects", spawn.len());

        Ok(Self {
            manifest,
            catalog,
            spawn,
            warnings,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn spawn(&self) -> &Document {
        &self.spawn
    }

    /// Non-fatal problems found while loading (trade table entries).
    pub fn warnings(&self) -> &ValidationResult {
        &self.warnings
    }

    /// Loot of every spawn object that has any.
    ///
    /// An entry that fails to build is reported and the whole loot of its
    /// object is dropped; other objects are unaffected.
    pub fn collect_loot(&self) -> (Vec<ObjectLoot>, ValidationResult) {
        let mut report = ValidationResult::new();
        let loot = self
            .spawn
            .sections()
            .filter_map(|object| {
                let (loot, object_report) = object_loot(&self.catalog, object);
                report.merge(object_report);
                loot
            })
            .collect();
        (loot, report)
    }

    /// All loot merged into one pool.
    pub fn loot_pool(&self) -> (SpawnPool, ValidationResult) {
        let (loot, report) = self.collect_loot();
        let mut pool = SpawnPool::new();
        for object in &loot {
            pool.merge(&object.pool);
        }
        (pool, report)
    }
}

fn read_document<'a>(
    gamedata: &Gamedata,
    name: &str,
    files: impl IntoIterator<Item = &'a str>,
) -> Result<Document> {
    let mut doc = Document::with_gamedata(name, gamedata.clone());
    for file in files {
        let path = doc.read_gamedata(file)?;
        log::debug!("read {} ({} sections total)", path.display(), doc.len());
    }
    Ok(doc)
}

/// Read the trader buy table.
///
/// An incomplete config or a missing buy section leaves the table empty,
/// so every item trades at 1.0; only an unreadable file is fatal.
fn load_trade(gamedata: &Gamedata, config: &TradeConfig) -> Result<(BuyCoefficients, ValidationResult)> {
    let mut report = ValidationResult::new();
    if config.file.is_empty() || config.buy_section.is_empty() {
        report.push(
            Diagnostic::warning(
                "ltx::trade::config",
                "trade table needs both a file and a buy section; buy coefficients disabled",
            )
            .with_help("Set trade.file and trade.buy_section in the manifest"),
        );
        return Ok((BuyCoefficients::new(), report));
    }

    let doc = read_document(gamedata, &config.file, [config.file.as_str()])?;
    let Some(section) = doc.get_section(&config.buy_section) else {
        report.push(
            Diagnostic::warning(
                "ltx::trade::section",
                format!(
                    "trade file has no section [{}]; buy coefficients disabled",
                    config.buy_section
                ),
            )
            .with_subject(config.file.clone())
            .with_help("Check trade.buy_section in the manifest"),
        );
        return Ok((BuyCoefficients::new(), report));
    };
    Ok(BuyCoefficients::from_section(section))
}

/// Parse one object's `custom_data` and collect its loot sections.
fn object_loot(catalog: &ItemCatalog, object: &Section) -> (Option<ObjectLoot>, ValidationResult) {
    let mut report = ValidationResult::new();
    let label = match object.get_string_or("name", "") {
        "" => format!("[{}]", object.id()),
        name => name.to_string(),
    };

    let raw = object.get_string_or("custom_data", "");
    if raw.trim().is_empty() {
        return (None, report);
    }
    let mut custom_data = Document::new("custom_data");
    if let Err(err) = custom_data.read_str(raw, None) {
        report.push(
            Diagnostic::error("ltx::loot::custom_data", err.to_string()).with_subject(label),
        );
        return (None, report);
    }

    let mut pool = SpawnPool::new();
    let mut failed = false;
    for section in LOOT_SECTIONS.iter().filter_map(|id| custom_data.get_section(id)) {
        for (key, value) in section.fields() {
            match SpawnEntry::from_field(catalog, key, value) {
                Ok(entry) => pool.add(&entry),
                Err(err) => {
                    let line = match value.as_str() {
                        Some(value) => format!("{key} = {value}"),
                        None => key.to_string(),
                    };
                    report.push(
                        Diagnostic::error(
                            "ltx::loot::entry",
                            format!("can't process loot entry '{line}' ({err})"),
                        )
                        .with_subject(label.clone()),
                    );
                    failed = true;
                }
            }
        }
    }

    if failed || pool.is_empty() {
        return (None, report);
    }
    let loot = ObjectLoot {
        id: object.id().to_string(),
        label,
        pool,
    };
    (Some(loot), report)
}
