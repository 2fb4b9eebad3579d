//! Integration tests for ConfigManager and configuration file handling
//!
//! These tests verify:
//! - Configuration loading and saving
//! - Default configuration generation through init
//! - Catalog extensions from the config file reaching the extractor
//! - Invalid catalog extensions being rejected

use camino::Utf8PathBuf;
use slotswap::ConfigManager;
use slotswap::catalog::{Catalog, CatalogError, Classification};
use slotswap::models::{ManifestState, ModPackage, PackageEntry};
use slotswap::services::{Session, SlotExtractor};
use std::fs;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path);

    assert_eq!(manager.config_dir(), config_path.as_path());
    assert_eq!(
        manager.config_path(),
        config_path.join("slotswap.yaml").as_path()
    );
}

#[test]
fn test_init_writes_loadable_defaults() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(config_path.join("nested"));

    assert!(manager.init().unwrap());
    assert!(manager.config_path().exists());

    let config = manager.load().unwrap();
    assert!(config.settings.confirm_before_staging);
    assert_eq!(config.settings.fuzzy_threshold, 0.75);
}

#[test]
fn test_extra_rules_from_yaml() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(
        config_path.join("slotswap.yaml"),
        r#"
catalog:
  extra_named_subfolders:
    pacman:
      - pacman_wear
  extra_rules:
    - id: stage-skin
      pattern: "stage/custom/{fighter}/{slot}/**"
    - id: readme
      pattern: "readme_{slot}.txt"
      classification: excluded
"#,
    )
    .unwrap();

    let config = ConfigManager::new(&config_path).load().unwrap();
    let catalog = Catalog::build(&config.catalog).unwrap();
    let extractor = SlotExtractor::new(&catalog);

    let wear = extractor
        .extract("fighter/pacman/model/pacman_wear/c03/model.numdlb")
        .unwrap();
    assert_eq!(wear.rule.id, "fighter-named:pacman/pacman_wear");

    let stage = extractor
        .extract("stage/custom/captain/c03/texture.nutexb")
        .unwrap();
    assert_eq!(stage.rule.id, "stage-skin");
    assert_eq!(stage.classification(), Classification::Rename);

    let readme = extractor.extract("readme_c03.txt").unwrap();
    assert_eq!(readme.classification(), Classification::Excluded);
}

#[test]
fn test_config_drives_session() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(
        config_path.join("slotswap.yaml"),
        "settings:\n  suggest_fighter_codes: true\n",
    )
    .unwrap();

    let config = ConfigManager::new(&config_path).load().unwrap();
    let session = Session::from_config(&config).unwrap();

    let package = ModPackage::new(
        "falcon_c00",
        vec![PackageEntry::file("fighter/captian/model/body/c00/model.numatb")],
        ManifestState::Absent,
        Vec::new(),
    );
    let report = session.verify(&package);
    assert_eq!(report.warning_count(), 1);
    assert!(report.issues[0].message.contains("did you mean"));
}

#[test]
fn test_invalid_extra_rule_rejected() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(
        config_path.join("slotswap.yaml"),
        "catalog:\n  extra_rules:\n    - id: broken\n      pattern: \"x/{slot}/{colour}\"\n",
    )
    .unwrap();

    let config = ConfigManager::new(&config_path).load().unwrap();
    assert!(matches!(
        Session::from_config(&config),
        Err(CatalogError::Pattern { .. })
    ));
}

#[test]
fn test_malformed_yaml_is_an_error() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(config_path.join("slotswap.yaml"), "settings: [unclosed\n").unwrap();

    assert!(ConfigManager::new(&config_path).load().is_err());
}
