//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/portviz/portviz.toml`
//! 3. Project config: `<project_dir>/.portviz.toml`
//! 4. Environment variables: `PORTVIZ_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Every view the page knows how to draw, in page order.
pub const ALL_VIEWS: [&str; 10] = [
    "tree", "bar", "scatter", "sf36", "skills", "network", "scrolly", "timeline", "map", "visitor",
];

pub const DEFAULT_BOUNDARY_URL: &str =
    "https://raw.githubusercontent.com/holtzy/D3-graph-gallery/master/DATA/world.geojson";

/// Expandable tree view settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreeConfig {
    /// Breadth distance between adjacent siblings
    pub node_spacing: f64,
    /// Depth distance between levels
    pub level_spacing: f64,
    /// Transition duration in milliseconds
    pub duration_ms: u64,
    pub node_radius: f64,
    /// Fill of collapsed nodes
    pub collapsed_fill: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            node_spacing: 40.0,
            level_spacing: 220.0,
            duration_ms: 500,
            node_radius: 8.0,
            collapsed_fill: "#c10df3".into(),
        }
    }
}

/// World map settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub boundary_url: String,
    pub fetch_timeout_secs: u64,
    pub width: f64,
    pub height: f64,
    pub projection_scale: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            boundary_url: DEFAULT_BOUNDARY_URL.into(),
            fetch_timeout_secs: 10,
            width: 1000.0,
            height: 600.0,
            projection_scale: 180.0,
            min_zoom: 1.0,
            max_zoom: 10.0,
        }
    }
}

/// Live visitor map settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VisitorConfig {
    pub count: usize,
    pub interval_ms: u64,
}

impl Default for VisitorConfig {
    fn default() -> Self {
        Self {
            count: 40,
            interval_ms: 2000,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub output_dir: Option<PathBuf>,
    pub views: Option<Vec<String>>,
    pub tree: RawTreeConfig,
    pub map: RawMapConfig,
    pub visitor: RawVisitorConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeConfig {
    pub node_spacing: Option<f64>,
    pub level_spacing: Option<f64>,
    pub duration_ms: Option<u64>,
    pub node_radius: Option<f64>,
    pub collapsed_fill: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawMapConfig {
    pub boundary_url: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub projection_scale: Option<f64>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawVisitorConfig {
    pub count: Option<usize>,
    pub interval_ms: Option<u64>,
}

impl TreeConfig {
    fn overlay(&self, raw: &RawTreeConfig) -> Self {
        Self {
            node_spacing: raw.node_spacing.unwrap_or(self.node_spacing),
            level_spacing: raw.level_spacing.unwrap_or(self.level_spacing),
            duration_ms: raw.duration_ms.unwrap_or(self.duration_ms),
            node_radius: raw.node_radius.unwrap_or(self.node_radius),
            collapsed_fill: raw
                .collapsed_fill
                .clone()
                .unwrap_or_else(|| self.collapsed_fill.clone()),
        }
    }
}

impl MapConfig {
    fn overlay(&self, raw: &RawMapConfig) -> Self {
        Self {
            boundary_url: raw
                .boundary_url
                .clone()
                .unwrap_or_else(|| self.boundary_url.clone()),
            fetch_timeout_secs: raw.fetch_timeout_secs.unwrap_or(self.fetch_timeout_secs),
            width: raw.width.unwrap_or(self.width),
            height: raw.height.unwrap_or(self.height),
            projection_scale: raw.projection_scale.unwrap_or(self.projection_scale),
            min_zoom: raw.min_zoom.unwrap_or(self.min_zoom),
            max_zoom: raw.max_zoom.unwrap_or(self.max_zoom),
        }
    }
}

impl VisitorConfig {
    fn overlay(&self, raw: &RawVisitorConfig) -> Self {
        Self {
            count: raw.count.unwrap_or(self.count),
            interval_ms: raw.interval_ms.unwrap_or(self.interval_ms),
        }
    }
}

/// Unified configuration for portviz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Where `render` writes the page (default: ./portviz-out)
    pub output_dir: PathBuf,
    /// Views drawn on the page
    pub views: Vec<String>,
    pub tree: TreeConfig,
    pub map: MapConfig,
    pub visitor: VisitorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("portviz-out"),
            views: ALL_VIEWS.iter().map(|v| v.to_string()).collect(),
            tree: TreeConfig::default(),
            map: MapConfig::default(),
            visitor: VisitorConfig::default(),
        }
    }
}

/// Get the XDG config directory for portviz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "portviz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("portviz.toml"))
}

/// Get the path to the project config file.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".portviz.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge arrays with union semantics and negation support.
    ///
    /// Items prefixed with `!` remove the corresponding item. Base order is
    /// kept and new items are appended, so the page order stays stable.
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let removed: HashSet<&str> = overlay
            .iter()
            .filter_map(|p| p.strip_prefix('!'))
            .collect();
        let mut result: Vec<String> = Vec::new();
        for item in base
            .iter()
            .chain(overlay.iter().filter(|p| !p.starts_with('!')))
        {
            if !removed.contains(item.as_str()) && !result.contains(item) {
                result.push(item.clone());
            }
        }
        result
    }

    /// Expand `~` and `$VAR` in the output directory.
    fn expand_paths(&mut self) {
        let raw = self.output_dir.to_string_lossy().to_string();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.output_dir = PathBuf::from(expanded.as_ref());
        }
    }

    /// Apply global config onto defaults: arrays REPLACE.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            output_dir: global
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            views: global.views.clone().unwrap_or_else(|| self.views.clone()),
            tree: self.tree.overlay(&global.tree),
            map: self.map.overlay(&global.map),
            visitor: self.visitor.overlay(&global.visitor),
        }
    }

    /// Merge project config: arrays UNION with `!` negation.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            output_dir: overlay
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            views: overlay
                .views
                .as_ref()
                .map(|o| Self::merge_array(&self.views, o))
                .unwrap_or_else(|| self.views.clone()),
            tree: self.tree.overlay(&overlay.tree),
            map: self.map.overlay(&overlay.map),
            visitor: self.visitor.overlay(&overlay.visitor),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Project: UNION with negation support
    /// - Any → Env vars: REPLACE
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(project) = project_dir {
            let local_path = project_config_path(project);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current, env_source())?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply PORTVIZ_* environment variables as explicit overrides.
    pub(crate) fn apply_env_overrides(
        mut settings: Self,
        source: Environment,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(source)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("output_dir") {
            settings.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<Vec<String>>("views") {
            settings.views = val;
        }
        if let Ok(val) = config.get_float("tree.node_spacing") {
            settings.tree.node_spacing = val;
        }
        if let Ok(val) = config.get_float("tree.level_spacing") {
            settings.tree.level_spacing = val;
        }
        if let Ok(val) = config.get::<u64>("tree.duration_ms") {
            settings.tree.duration_ms = val;
        }
        if let Ok(val) = config.get_float("tree.node_radius") {
            settings.tree.node_radius = val;
        }
        if let Ok(val) = config.get_string("tree.collapsed_fill") {
            settings.tree.collapsed_fill = val;
        }
        if let Ok(val) = config.get_string("map.boundary_url") {
            settings.map.boundary_url = val;
        }
        if let Ok(val) = config.get::<u64>("map.fetch_timeout_secs") {
            settings.map.fetch_timeout_secs = val;
        }
        if let Ok(val) = config.get_float("map.width") {
            settings.map.width = val;
        }
        if let Ok(val) = config.get_float("map.height") {
            settings.map.height = val;
        }
        if let Ok(val) = config.get_float("map.projection_scale") {
            settings.map.projection_scale = val;
        }
        if let Ok(val) = config.get_float("map.min_zoom") {
            settings.map.min_zoom = val;
        }
        if let Ok(val) = config.get_float("map.max_zoom") {
            settings.map.max_zoom = val;
        }
        if let Ok(val) = config.get::<usize>("visitor.count") {
            settings.visitor.count = val;
        }
        if let Ok(val) = config.get::<u64>("visitor.interval_ms") {
            settings.visitor.interval_ms = val;
        }

        Ok(settings)
    }

    /// Reject values no view can work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let invalid = |message: String| Err(ApplicationError::Config { message });
        if let Some(view) = self.views.iter().find(|v| !ALL_VIEWS.contains(&v.as_str())) {
            return invalid(format!(
                "unknown view '{view}' (known: {})",
                ALL_VIEWS.join(", ")
            ));
        }
        if self.tree.node_spacing <= 0.0 || self.tree.level_spacing <= 0.0 {
            return invalid("tree spacing must be positive".into());
        }
        if self.map.min_zoom <= 0.0 || self.map.min_zoom > self.map.max_zoom {
            return invalid(format!(
                "zoom extent [{}, {}] is empty",
                self.map.min_zoom, self.map.max_zoom
            ));
        }
        if self.visitor.interval_ms == 0 {
            return invalid("visitor interval must be positive".into());
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r##"# portviz configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/portviz/portviz.toml  (defines your baseline)
#   Project: <project_dir>/.portviz.toml      (project-specific changes)
#   Env:     PORTVIZ_* environment variables   (explicit overrides, e.g. PORTVIZ_TREE__DURATION_MS=800)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Project config UNIONS with global.
#   Use "!name" in project config to REMOVE an inherited item:
#     views = ["!visitor"]  # draw everything except the visitor map

# Output directory for `portviz render`
# output_dir = "portviz-out"

# Views on the page
# views = ["tree", "bar", "scatter", "sf36", "skills", "network", "scrolly", "timeline", "map", "visitor"]

[tree]
# node_spacing = 40.0
# level_spacing = 220.0
# duration_ms = 500
# node_radius = 8.0
# collapsed_fill = "#c10df3"

[map]
# boundary_url = "https://raw.githubusercontent.com/holtzy/D3-graph-gallery/master/DATA/world.geojson"
# fetch_timeout_secs = 10
# width = 1000.0
# height = 600.0
# projection_scale = 180.0
# min_zoom = 1.0
# max_zoom = 10.0

[visitor]
# count = 40
# interval_ms = 2000
"##
        .to_string()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("PORTVIZ")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("views")
        .try_parsing(true)
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn given_defaults_when_validating_then_ok() {
        let settings = Settings::default();
        settings.validate().expect("defaults are valid");
        assert_eq!(settings.views.len(), ALL_VIEWS.len());
        assert_eq!(settings.tree.duration_ms, 500);
        assert_eq!(settings.map.max_zoom, 10.0);
    }

    #[test]
    fn test_merge_array_union_keeps_order() {
        let result = Settings::merge_array(&strings(&["a", "b"]), &strings(&["c", "a"]));
        assert_eq!(result, strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_merge_array_negation() {
        let result = Settings::merge_array(&strings(&["a", "b"]), &strings(&["!a", "c"]));
        assert_eq!(result, strings(&["b", "c"]));
    }

    #[test]
    fn test_merge_array_negation_nonexistent() {
        let result = Settings::merge_array(&strings(&["a", "b"]), &strings(&["!x"]));
        assert_eq!(result, strings(&["a", "b"]));
    }

    #[test]
    fn test_apply_global_replaces_views() {
        let global = RawSettings {
            views: Some(strings(&["tree"])),
            ..Default::default()
        };
        let result = Settings::default().apply_global(&global);
        assert_eq!(result.views, strings(&["tree"]));
    }

    #[test]
    fn test_merge_with_keeps_unspecified_scalars() {
        let overlay = RawSettings {
            tree: RawTreeConfig {
                duration_ms: Some(750),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = Settings::default().merge_with(&overlay);
        assert_eq!(result.tree.duration_ms, 750);
        assert_eq!(result.tree.level_spacing, 220.0);
    }

    #[test]
    fn given_env_overrides_when_applied_then_replace_values() {
        let vars: config::Map<String, String> = [
            ("PORTVIZ_VIEWS".to_string(), "tree,map".to_string()),
            ("PORTVIZ_TREE__DURATION_MS".to_string(), "900".to_string()),
            ("PORTVIZ_MAP__BOUNDARY_URL".to_string(), "http://localhost/w.json".to_string()),
        ]
        .into_iter()
        .collect();

        let settings =
            Settings::apply_env_overrides(Settings::default(), env_source().source(Some(vars)))
                .expect("apply env");

        assert_eq!(settings.views, strings(&["tree", "map"]));
        assert_eq!(settings.tree.duration_ms, 900);
        assert_eq!(settings.map.boundary_url, "http://localhost/w.json");
        assert_eq!(settings.map.width, 1000.0);
    }

    #[test]
    fn given_unknown_view_when_validating_then_config_error() {
        let settings = Settings {
            views: strings(&["tree", "pie"]),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { message }) if message.contains("pie")
        ));
    }

    #[test]
    fn given_tilde_in_output_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            output_dir: PathBuf::from("~/portviz"),
            ..Default::default()
        };
        settings.expand_paths();
        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.output_dir.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn test_template_parses_as_settings() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template is TOML");
        assert!(raw.views.is_none());
    }
}
