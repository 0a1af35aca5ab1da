//! Project manifest (ltx.yaml) parsing.
//!
//! The manifest tells the loader where the gamedata roots are, which files
//! hold the system and spawn data, and how engine classes map to item
//! types. The older `meta.ltx` form carries the same information in LTX
//! sections and is still accepted.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{LtxError, ParseError, Result};
use crate::gamedata::Gamedata;

/// Project manifest loaded from ltx.yaml or meta.ltx.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Gamedata search roots.
    pub gamedata: GamedataConfig,

    /// Gamedata-relative path of the system document.
    #[serde(default = "default_system")]
    pub system: String,

    /// Gamedata-relative spawn data files, read into one document.
    pub spawn: Vec<String>,

    /// Trader buy table used for trade-mode prices.
    pub trade: Option<TradeConfig>,

    /// Engine class -> item type (`T_WPN`, `T_AMMO`, ...).
    pub class_to_type: IndexMap<String, String>,

    /// Section ids excluded from reports.
    pub ignored_sections: Vec<String>,

    /// Directory relative gamedata roots are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamedataConfig {
    pub main: Option<PathBuf>,
    #[serde(default)]
    pub alt: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeConfig {
    pub file: String,
    pub buy_section: String,
}

fn default_system() -> String {
    "config/system.ltx".to_string()
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            gamedata: GamedataConfig::default(),
            system: default_system(),
            spawn: vec![],
            trade: None,
            class_to_type: IndexMap::new(),
            ignored_sections: vec![],
            base_dir: PathBuf::new(),
        }
    }
}

impl Manifest {
    /// Load a manifest, choosing the format by extension (`.ltx` is the
    /// legacy meta file, anything else YAML).
    pub fn load(path: &Path) -> Result<Self> {
        let is_ltx = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ltx"));

        let mut manifest = if is_ltx {
            let mut meta = Document::new(file_name(path));
            meta.read_file(path)?;
            Self::from_meta(&meta)?
        } else {
            let content = std::fs::read_to_string(path).map_err(|e| LtxError::Io {
                path: path.to_path_buf(),
                message: format!("Failed to read manifest: {}", e),
            })?;
            Self::parse(&content)?
        };

        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| LtxError::Config {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check ltx.yaml syntax".to_string()),
        })
    }

    /// Build a manifest from a parsed legacy meta document.
    pub fn from_meta(meta: &Document) -> Result<Self> {
        let mut manifest = Manifest::default();

        if let Some(settings) = meta.get_section("settings") {
            let main = settings.get_string_or("gamedata_path_mod", "");
            let alt = settings.get_string_or("gamedata_path_original", "");
            manifest.gamedata = GamedataConfig {
                main: non_empty(main).map(PathBuf::from),
                alt: non_empty(alt).map(PathBuf::from),
            };
        }

        if let Some(classes) = meta.get_section("inv_class_to_type") {
            manifest.class_to_type = classes
                .fields()
                .filter_map(|(class, ty)| Some((class.to_string(), ty.as_str()?.to_string())))
                .collect();
        }

        if let Some(trade) = meta.get_section("trade") {
            let file = trade.get_string_or("file_path", "");
            let buy_section = trade.get_string_or("buy_section", "");
            // A half-filled table is kept so loading can report it
            if !file.is_empty() || !buy_section.is_empty() {
                manifest.trade = Some(TradeConfig {
                    file: file.to_string(),
                    buy_section: buy_section.to_string(),
                });
            }
        }

        if let Some(spawn) = meta.get_section("spawn") {
            manifest.spawn = spawn.lines().map(str::to_string).collect();
        }

        if let Some(ignored) = meta.get_section("ignore_sections") {
            manifest.ignored_sections = ignored.lines().map(str::to_string).collect();
        }

        Ok(manifest)
    }

    /// Gamedata roots, with relative paths resolved against the manifest.
    pub fn gamedata(&self) -> Result<Gamedata> {
        let main = self.gamedata.main.as_ref().ok_or(ParseError::NoGamedata)?;
        let alt = self.gamedata.alt.as_ref().map(|p| self.base_dir.join(p));
        Ok(Gamedata::new(self.base_dir.join(main), alt))
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_manifest() {
        let manifest = Manifest::parse("gamedata:\n  main: mod/gamedata\n").unwrap();

        assert_eq!(manifest.gamedata.main, Some(PathBuf::from("mod/gamedata")));
        assert_eq!(manifest.gamedata.alt, None);
        assert_eq!(manifest.system, "config/system.ltx");
        assert!(manifest.spawn.is_empty());
        assert!(manifest.trade.is_none());
    }

    #[test]
    fn test_parse_full_manifest() {
        let yaml = r#"
gamedata:
  main: mod/gamedata
  alt: game/gamedata
system: config/system.ltx
spawn:
  - spawns/all.ltx
trade:
  file: config/misc/trade_generic.ltx
  buy_section: trade_generic_buy
class_to_type:
  WP_PM: T_WPN
  AMMO: T_AMMO
ignored_sections:
  - wpn_binoc
"#;
        let manifest = Manifest::parse(yaml).unwrap();

        assert_eq!(manifest.gamedata.alt, Some(PathBuf::from("game/gamedata")));
        assert_eq!(manifest.spawn, vec!["spawns/all.ltx"]);
        assert_eq!(
            manifest.trade,
            Some(TradeConfig {
                file: "config/misc/trade_generic.ltx".to_string(),
                buy_section: "trade_generic_buy".to_string(),
            })
        );
        let classes: Vec<(&str, &str)> = manifest
            .class_to_type
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(classes, vec![("WP_PM", "T_WPN"), ("AMMO", "T_AMMO")]);
        assert_eq!(manifest.ignored_sections, vec!["wpn_binoc"]);
    }

    #[test]
    fn test_invalid_manifest() {
        let err = Manifest::parse("spawn: 12").unwrap_err();
        assert!(matches!(err, LtxError::Config { .. }));
    }

    #[test]
    fn test_gamedata_requires_main() {
        let manifest = Manifest::default();
        assert!(matches!(
            manifest.gamedata(),
            Err(LtxError::Parse(ParseError::NoGamedata))
        ));
    }

    #[test]
    fn test_relative_roots_follow_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ltx.yaml");
        fs::write(&path, "gamedata:\n  main: gamedata\n").unwrap();

        let manifest = Manifest::load(&path).unwrap();
        let gamedata = manifest.gamedata().unwrap();
        assert_eq!(gamedata.main(), dir.path().join("gamedata"));
    }

    #[test]
    fn test_load_legacy_meta() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_meta.ltx");
        fs::write(
            &path,
            "[settings]\n\
             gamedata_path_mod = mod\n\
             gamedata_path_original =\n\
             [inv_class_to_type]\n\
             WP_PM = T_WPN\n\
             [trade]\n\
             file_path = config/misc/trade.ltx\n\
             buy_section = buy\n\
             [spawn]\n\
             spawns/a.ltx\n\
             spawns/b.ltx\n\
             [ignore_sections]\n\
             wpn_binoc\n",
        )
        .unwrap();

        let manifest = Manifest::load(&path).unwrap();

        assert_eq!(manifest.gamedata.main, Some(PathBuf::from("mod")));
        assert_eq!(manifest.gamedata.alt, None);
        assert_eq!(manifest.class_to_type.get("WP_PM").map(String::as_str), Some("T_WPN"));
        assert_eq!(manifest.trade.as_ref().unwrap().buy_section, "buy");
        assert_eq!(manifest.spawn, vec!["spawns/a.ltx", "spawns/b.ltx"]);
        assert_eq!(manifest.ignored_sections, vec!["wpn_binoc"]);
        assert_eq!(manifest.base_dir, dir.path());
    }

    #[test]
    fn test_legacy_trade_keeps_half_filled_table() {
        let mut meta = Document::new("_meta.ltx");
        meta.read_str("[trade]\nfile_path = trade.ltx\n", None).unwrap();

        let manifest = Manifest::from_meta(&meta).unwrap();
        assert_eq!(
            manifest.trade,
            Some(TradeConfig {
                file: "trade.ltx".to_string(),
                buy_section: String::new(),
            })
        );
    }

    #[test]
    fn test_legacy_empty_trade_is_ignored() {
        let mut meta = Document::new("_meta.ltx");
        meta.read_str("[trade]\nfile_path =\n", None).unwrap();
        assert!(Manifest::from_meta(&meta).unwrap().trade.is_none());
    }
}
