//! Integration tests for configuration module

use sdc_core::config::{Browser, Config, DEFAULT_WHITELIST};
use sdc_core::{DataCategory, DataTypes};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_config_for_browser() {
    let config = Config::for_browser(Browser::Firefox);
    assert_eq!(config.general.browser, Browser::Firefox);
    assert_eq!(config.whitelist.origins.len(), DEFAULT_WHITELIST.len());
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_whitelist_roots() {
    let whitelist = Config::default().whitelist().unwrap();

    for root in ["proton.me", "simplelogin.io", "google.com", "microsoft.com", "notion.so"] {
        assert!(whitelist.contains_root(root), "{root} should be whitelisted");
    }
    assert!(whitelist.is_exempt("docs.google.com"));
    assert!(!whitelist.is_exempt("example.com"));
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[general]
name = "work"
browser = "chrome"

[whitelist]
origins = ["https://intranet.corp.example", "https://www.github.com"]

[schedule]
grace_period_secs = 120
sweep_interval_secs = 30

[deletion]
site_data = ["cache", "localStorage"]
reset_on_startup = false
"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.general.name, "work");
    assert_eq!(config.schedule.grace_period_secs, 120);
    assert_eq!(config.schedule.sweep_delay_secs, 60);
    assert_eq!(
        config.deletion.site_data,
        vec![DataCategory::Cache, DataCategory::LocalStorage]
    );
    assert!(!config.deletion.reset_on_startup);
    assert_eq!(config.deletion.reset_data_types(), DataTypes::all());

    let whitelist = config.whitelist().unwrap();
    assert!(whitelist.contains_root("corp.example"));
    assert!(whitelist.contains_root("github.com"));
}

#[test]
fn test_generated_config_validates() {
    let toml = Config::default().to_toml().unwrap();
    assert!(toml.contains("[whitelist]"));
    assert!(toml.contains("grace_period_secs = 60"));

    let parsed = Config::from_toml(&toml).unwrap();
    assert!(parsed.validate().is_ok());
}

#[test]
fn test_unknown_category_rejected() {
    let toml = r#"
[deletion]
site_data = ["cache", "history"]
"#;
    assert!(Config::from_toml(toml).is_err());
}
