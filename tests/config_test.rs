//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Merge Semantics:
//! - Defaults → Global: REPLACE (global defines the real baseline)
//! - Global → Project: UNION with negation support
//! - Any → Env vars: REPLACE (explicit user override)
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test project config merging with defaults.

use std::fs;

use tempfile::TempDir;

use portviz::application::ApplicationError;
use portviz::config::{Settings, ALL_VIEWS};

fn write_project_config(dir: &TempDir, content: &str) {
    fs::write(dir.path().join(".portviz.toml"), content).unwrap();
}

#[test]
fn given_no_project_config_when_load_then_every_view_enabled() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.views.len(), ALL_VIEWS.len());
    assert_eq!(settings.tree.duration_ms, 500);
}

#[test]
fn given_project_config_with_negation_when_load_then_views_removed_in_order() {
    let dir = TempDir::new().unwrap();
    write_project_config(
        &dir,
        r#"
views = ["!visitor", "!map"]
"#,
    );

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert!(!settings.views.contains(&"map".to_string()));
    assert!(!settings.views.contains(&"visitor".to_string()));
    assert_eq!(settings.views.first().map(String::as_str), Some("tree"));
    assert_eq!(settings.views.len(), ALL_VIEWS.len() - 2);
}

#[test]
fn given_project_tree_section_when_load_then_only_named_fields_change() {
    let dir = TempDir::new().unwrap();
    write_project_config(
        &dir,
        r##"
[tree]
duration_ms = 800
collapsed_fill = "#ff8800"
"##,
    );

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.tree.duration_ms, 800);
    assert_eq!(settings.tree.collapsed_fill, "#ff8800");
    assert_eq!(settings.tree.level_spacing, 220.0);
}

#[test]
fn given_unknown_view_in_project_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    write_project_config(&dir, r#"views = ["pie"]"#);

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_inverted_zoom_extent_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    write_project_config(
        &dir,
        r#"
[map]
min_zoom = 5.0
max_zoom = 2.0
"#,
    );

    assert!(Settings::load(Some(dir.path())).is_err());
}

#[test]
fn given_malformed_toml_when_load_then_error_names_file() {
    let dir = TempDir::new().unwrap();
    write_project_config(&dir, "views = [");

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(err.to_string().contains(".portviz.toml"));
}
