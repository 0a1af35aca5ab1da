//! Manifest -> project -> loot, against the fixture project in
//! `tests/fixtures/project` (mod gamedata in `mod/`, base game in `base/`).

use std::path::PathBuf;

use ltx::{validate_project, Manifest, Number, ParseError, Project, SpawnPool};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("project")
        .join(name)
}

fn project() -> Project {
    Project::load(Manifest::load(&fixture("ltx.yaml")).unwrap()).unwrap()
}

fn summary(pool: &SpawnPool) -> Vec<String> {
    pool.entries().map(|e| e.to_string()).collect()
}

#[test]
fn test_system_layers_mod_over_base() {
    let project = project();
    let system = project.catalog().system();

    // weapons.ltx comes from the mod, items.ltx only exists in the base game
    assert_eq!(system.get_uint("wpn_pm", "cost").unwrap(), 600);
    assert_eq!(system.get_uint("ammo_9x18_fmj", "box_size").unwrap(), 8);
    assert_eq!(system.get_uint("wpn_ak74_scope", "cost").unwrap(), 4000);
    assert_eq!(
        system.get_string("bread", "description").unwrap(),
        "Plain bread; ; not a comment\n"
    );
    assert_eq!(system.section("wpn_pm").unwrap().source(), "weapons.ltx");
}

#[test]
fn test_trade_warnings_are_collected() {
    let project = project();

    assert_eq!(project.warnings().warning_count(), 1);
    let trade = project.catalog().trade();
    assert!((trade.get("wpn_pm") - 0.6).abs() < 1e-9);
    assert!((trade.get("ammo_5.45x39_fmj") - 0.3).abs() < 1e-9);
    assert_eq!(trade.get("bread"), 0.0);
    assert_eq!(trade.get("wpn_ak74"), 1.0);
}

#[test]
fn test_collect_loot_skips_broken_objects() {
    let project = project();
    let (loot, report) = project.collect_loot();

    let labels: Vec<&str> = loot.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["esc_stash_1", "esc_stash_2"]);
    assert_eq!(report.error_count(), 1);
    assert_eq!(
        report.iter().next().unwrap().subject.as_deref(),
        Some("esc_broken_stash")
    );
}

#[test]
fn test_loot_cost_and_count() {
    let project = project();
    let catalog = project.catalog();
    let (pool, _) = project.loot_pool();

    assert_eq!(
        summary(&pool),
        vec![
            "wpn_pm = 1, silencer",
            "ammo_9x18_fmj = 2",
            "bread = 3, prob=0.50",
            "wpn_ak74_scope = 1, scope unload",
            "bread = 1",
        ]
    );
    // 1250 (pm + silencer + magazine) + 100 + 60 + 4900 (ak + scope) + 40
    assert_eq!(pool.cost(catalog, false).unwrap(), 6350.0);
    // 975 + 30 + 0 + 4900 + 0
    assert!((pool.cost(catalog, true).unwrap() - 5905.0).abs() < 1e-6);
    assert_eq!(pool.game_objects_count(catalog, false).unwrap(), Number::Float(6.5));
    assert_eq!(pool.game_objects_count(catalog, true).unwrap(), Number::Int(8));
}

#[test]
fn test_compressed_loot() {
    let project = project();
    let (mut pool, _) = project.loot_pool();

    pool.compress(project.catalog()).unwrap();

    assert_eq!(
        summary(&pool),
        vec![
            "wpn_addon_silencer = 1",
            "wpn_pm = 1, unload",
            "bread = 2.50",
            "wpn_addon_scope = 1",
            "wpn_ak74 = 1, unload",
            "ammo_9x18_fmj = 1, box_size=24",
        ]
    );
}

#[test]
fn test_legacy_meta_matches_yaml() {
    let yaml = project();
    let meta = Project::load(Manifest::load(&fixture("_meta.ltx")).unwrap()).unwrap();

    assert_eq!(
        summary(&yaml.loot_pool().0),
        summary(&meta.loot_pool().0)
    );
    assert_eq!(yaml.catalog().system().len(), meta.catalog().system().len());
}

#[test]
fn test_validate_project() {
    let result = validate_project(&project());
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.warning_count(), 1);
}

#[test]
fn test_missing_spawn_file_is_fatal() {
    let mut manifest = Manifest::load(&fixture("ltx.yaml")).unwrap();
    manifest.spawn.push("spawns/missing.ltx".to_string());

    let err = Project::load(manifest).unwrap_err();
    assert!(matches!(
        err,
        ltx::LtxError::Parse(ParseError::GamedataFileNotFound { .. })
    ));
}

#[test]
fn test_unknown_buy_section_is_not_fatal() {
    let mut manifest = Manifest::load(&fixture("ltx.yaml")).unwrap();
    manifest.trade.as_mut().unwrap().buy_section = "no_such_buy_section".to_string();

    let project = Project::load(manifest).unwrap();

    assert_eq!(project.warnings().warning_count(), 1);
    assert_eq!(
        project.warnings().iter().next().unwrap().code,
        "ltx::trade::section"
    );
    assert_eq!(project.catalog().trade().get("wpn_pm"), 1.0);
}
