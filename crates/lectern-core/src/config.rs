//! Configuration types for Lectern.
//!
//! Root configuration struct and nested section types with full defaults,
//! validation, YAML file loading, and tilde path expansion.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::{Channel, Coordinate};

/// Default number of entries kept per channel history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Documents above this many bytes are delivered through a file.
pub const DEFAULT_LARGE_DOCUMENT_THRESHOLD: usize = 2 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

/// Root configuration for Lectern.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub global: GlobalConfig,
    pub logging: LoggingConfig,
    pub history: HistoryConfig,
    pub render: RenderConfig,
    pub tabs: TabsConfig,
    pub defaults: ReferenceDefaults,
}

impl Default for Config {
    fn default() -> Self {
        let home = home_dir();
        Self {
            global: GlobalConfig {
                data_dir: home.join(".local/share/lectern").display().to_string(),
                config_dir: home.join(".config/lectern").display().to_string(),
            },
            logging: LoggingConfig::default(),
            history: HistoryConfig::default(),
            render: RenderConfig::default(),
            tabs: TabsConfig::default(),
            defaults: ReferenceDefaults::default(),
        }
    }
}

impl Config {
    /// Returns the effective session file path (explicit or derived from data_dir).
    pub fn session_path(&self) -> PathBuf {
        if !self.history.session_file.is_empty() {
            return PathBuf::from(&self.history.session_file);
        }
        Path::new(&self.global.data_dir).join("session.json")
    }

    /// Returns the temp file an oversized document for `channel` is written to.
    pub fn large_document_path(&self, channel: Channel) -> PathBuf {
        let name = match channel {
            Channel::Secondary => &self.render.secondary_file,
            Channel::Primary | Channel::External => &self.render.primary_file,
        };
        Path::new(&self.render.resource_dir).join(name)
    }

    /// Creates required directories (data_dir, config_dir, resource_dir).
    pub fn ensure_directories(&self) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(&self.global.data_dir)?;
        std::fs::create_dir_all(&self.global.config_dir)?;
        std::fs::create_dir_all(&self.render.resource_dir)?;
        Ok(())
    }

    /// Validates the entire configuration, returning an error message on failure.
    pub fn validate(&self) -> Result<(), String> {
        // Global
        if self.global.data_dir.trim().is_empty() {
            return Err("global.data_dir is required".into());
        }
        if self.global.config_dir.trim().is_empty() {
            return Err("global.config_dir is required".into());
        }

        // Logging
        match self.logging.level.to_lowercase().trim() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => {}
            _ => {
                return Err(
                    "logging.level must be one of trace, debug, info, warn, error, off".into(),
                )
            }
        }
        match self.logging.format.to_lowercase().trim() {
            "console" | "json" => {}
            _ => return Err("logging.format must be one of console, json".into()),
        }

        // History
        if self.history.capacity < 1 {
            return Err("history.capacity must be at least 1".into());
        }

        // Render
        if self.render.large_document_threshold < 1 {
            return Err("render.large_document_threshold must be at least 1".into());
        }
        if self.render.resource_dir.trim().is_empty() {
            return Err("render.resource_dir is required".into());
        }
        if self.render.primary_file.trim().is_empty()
            || self.render.secondary_file.trim().is_empty()
        {
            return Err("render.primary_file and render.secondary_file are required".into());
        }
        if self.render.primary_file == self.render.secondary_file {
            return Err("render.primary_file and render.secondary_file must differ".into());
        }
        if !(10..=500).contains(&self.render.font_size) {
            return Err("render.font_size must be between 10 and 500".into());
        }

        // Tabs
        if self.tabs.primary < 1 || self.tabs.secondary < 1 {
            return Err("tabs.primary and tabs.secondary must be at least 1".into());
        }

        // Defaults
        for (name, coordinate) in [
            ("defaults.primary", &self.defaults.primary),
            ("defaults.secondary", &self.defaults.secondary),
        ] {
            if coordinate.source.trim().is_empty() {
                return Err(format!("{name}.source is required"));
            }
        }

        Ok(())
    }

    /// Expand tilde in all path fields.
    pub fn expand_paths(&mut self) {
        self.global.data_dir = expand_tilde(&self.global.data_dir);
        self.global.config_dir = expand_tilde(&self.global.config_dir);
        self.history.session_file = expand_tilde(&self.history.session_file);
        self.render.resource_dir = expand_tilde(&self.render.resource_dir);
    }
}

// ---------------------------------------------------------------------------
// Section types
// ---------------------------------------------------------------------------

/// Global directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    pub data_dir: String,
    pub config_dir: String,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "console".into(),
        }
    }
}

impl LoggingConfig {
    /// Maps the configured level to a `log` filter; unknown levels fall back to info.
    #[must_use]
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.level.to_lowercase().trim() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        }
    }
}

/// History settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    pub capacity: usize,
    /// Explicit session snapshot path; empty derives from `global.data_dir`.
    pub session_file: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            session_file: String::new(),
        }
    }
}

/// Document rendering and delivery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub large_document_threshold: usize,
    pub resource_dir: String,
    pub primary_file: String,
    pub secondary_file: String,
    pub font_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            large_document_threshold: DEFAULT_LARGE_DOCUMENT_THRESHOLD,
            resource_dir: "htmlResources".into(),
            primary_file: "main.html".into(),
            secondary_file: "study.html".into(),
            font_size: 120,
        }
    }
}

/// Tabs per channel tab group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabsConfig {
    pub primary: usize,
    pub secondary: usize,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            primary: 5,
            secondary: 5,
        }
    }
}

impl TabsConfig {
    #[must_use]
    pub fn count(&self, channel: Channel) -> usize {
        match channel {
            Channel::Primary => self.primary,
            Channel::Secondary => self.secondary,
            Channel::External => 0,
        }
    }
}

/// Active references used before anything has been dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDefaults {
    pub primary: Coordinate,
    pub secondary: Coordinate,
}

impl Default for ReferenceDefaults {
    fn default() -> Self {
        Self {
            primary: Coordinate::new("KJV", 1, 1, 1),
            secondary: Coordinate::new("NET", 43, 3, 16),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    #[serde(default)]
    global: PartialGlobalConfig,
    #[serde(default)]
    logging: PartialLoggingConfig,
    #[serde(default)]
    history: PartialHistoryConfig,
    #[serde(default)]
    render: PartialRenderConfig,
    #[serde(default)]
    tabs: PartialTabsConfig,
    #[serde(default)]
    defaults: PartialReferenceDefaults,
}

#[derive(Debug, Default, Deserialize)]
struct PartialGlobalConfig {
    #[serde(default)]
    data_dir: String,
    #[serde(default)]
    config_dir: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialLoggingConfig {
    #[serde(default)]
    level: String,
    #[serde(default)]
    format: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialHistoryConfig {
    #[serde(default)]
    capacity: usize,
    #[serde(default)]
    session_file: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialRenderConfig {
    #[serde(default)]
    large_document_threshold: usize,
    #[serde(default)]
    resource_dir: String,
    #[serde(default)]
    primary_file: String,
    #[serde(default)]
    secondary_file: String,
    #[serde(default)]
    font_size: u32,
}

#[derive(Debug, Default, Deserialize)]
struct PartialTabsConfig {
    #[serde(default)]
    primary: usize,
    #[serde(default)]
    secondary: usize,
}

#[derive(Debug, Default, Deserialize)]
struct PartialReferenceDefaults {
    #[serde(default)]
    primary: Option<Coordinate>,
    #[serde(default)]
    secondary: Option<Coordinate>,
}

/// Load config: defaults < (optional) config file.
///
/// An explicit path that cannot be read is a hard error; a missing file in
/// the standard search locations is not.
pub fn load_config(config_file: Option<&str>) -> Result<(Config, Option<PathBuf>), String> {
    let mut cfg = Config::default();

    let explicit = config_file
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    let (path_to_try, used) = match explicit {
        Some(path) => (Some(path), true),
        None => (find_config_file(), false),
    };

    if let Some(path) = path_to_try {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                apply_yaml(&mut cfg, &text)?;
                cfg.expand_paths();
                cfg.validate()?;
                log::debug!("loaded config from {}", path.display());
                return Ok((cfg, Some(path)));
            }
            Err(err) => {
                if used {
                    return Err(format!("failed to load config file: {err}"));
                }
            }
        }
    }

    Ok((cfg, None))
}

/// Overlay YAML settings onto an existing config.
pub fn apply_yaml(cfg: &mut Config, text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let partial: PartialConfig =
        serde_yaml::from_str(text).map_err(|err| format!("parse config: {err}"))?;
    apply_partial(cfg, partial);
    Ok(())
}

fn apply_partial(cfg: &mut Config, partial: PartialConfig) {
    if !partial.global.data_dir.trim().is_empty() {
        cfg.global.data_dir = partial.global.data_dir.trim().to_string();
    }
    if !partial.global.config_dir.trim().is_empty() {
        cfg.global.config_dir = partial.global.config_dir.trim().to_string();
    }
    if !partial.logging.level.trim().is_empty() {
        cfg.logging.level = partial.logging.level.trim().to_string();
    }
    if !partial.logging.format.trim().is_empty() {
        cfg.logging.format = partial.logging.format.trim().to_string();
    }
    if partial.history.capacity > 0 {
        cfg.history.capacity = partial.history.capacity;
    }
    if !partial.history.session_file.trim().is_empty() {
        cfg.history.session_file = partial.history.session_file.trim().to_string();
    }
    if partial.render.large_document_threshold > 0 {
        cfg.render.large_document_threshold = partial.render.large_document_threshold;
    }
    if !partial.render.resource_dir.trim().is_empty() {
        cfg.render.resource_dir = partial.render.resource_dir.trim().to_string();
    }
    if !partial.render.primary_file.trim().is_empty() {
        cfg.render.primary_file = partial.render.primary_file.trim().to_string();
    }
    if !partial.render.secondary_file.trim().is_empty() {
        cfg.render.secondary_file = partial.render.secondary_file.trim().to_string();
    }
    if partial.render.font_size > 0 {
        cfg.render.font_size = partial.render.font_size;
    }
    if partial.tabs.primary > 0 {
        cfg.tabs.primary = partial.tabs.primary;
    }
    if partial.tabs.secondary > 0 {
        cfg.tabs.secondary = partial.tabs.secondary;
    }
    if let Some(primary) = partial.defaults.primary {
        cfg.defaults.primary = primary;
    }
    if let Some(secondary) = partial.defaults.secondary {
        cfg.defaults.secondary = secondary;
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if path.is_empty() {
        return path.to_string();
    }
    if path == "~" {
        return home_dir().display().to_string();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return home_dir().join(rest).display().to_string();
    }
    path.to_string()
}

/// Search for a configuration file in the standard locations.
/// Returns `None` if no config file is found.
pub fn find_config_file() -> Option<PathBuf> {
    config_search_paths()
        .into_iter()
        .map(|dir| dir.join("config.yaml"))
        .find(|candidate| candidate.is_file())
}

/// Returns the list of directories to search for config files.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            paths.push(Path::new(&xdg).join("lectern"));
        }
    }

    let home = home_dir();
    if home.as_os_str() != "" {
        paths.push(home.join(".config/lectern"));
    }

    paths.push(PathBuf::from("."));
    paths
}

/// Get the user's home directory, falling back to `/` when unset.
fn home_dir() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) if !home.trim().is_empty() => PathBuf::from(home),
        _ => PathBuf::from("/"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.history.capacity, 50);
        assert_eq!(cfg.render.large_document_threshold, 2_097_152);
        assert_eq!(cfg.tabs.count(Channel::Primary), 5);
        assert_eq!(cfg.tabs.count(Channel::External), 0);
    }

    #[test]
    fn config_default_validates() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok(), "default config must validate");
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut cfg = Config::default();
        cfg.history.capacity = 0;
        assert_eq!(
            cfg.validate(),
            Err("history.capacity must be at least 1".to_owned())
        );
    }

    #[test]
    fn validate_rejects_bad_log_level() {
        let mut cfg = Config::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_shared_temp_file() {
        let mut cfg = Config::default();
        cfg.render.secondary_file = cfg.render.primary_file.clone();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn large_document_path_is_keyed_by_channel() {
        let cfg = Config::default();
        assert_eq!(
            cfg.large_document_path(Channel::Primary),
            Path::new("htmlResources").join("main.html")
        );
        assert_eq!(
            cfg.large_document_path(Channel::Secondary),
            Path::new("htmlResources").join("study.html")
        );
    }

    #[test]
    fn session_path_derived() {
        let mut cfg = Config::default();
        cfg.global.data_dir = "/data".into();
        assert_eq!(cfg.session_path(), PathBuf::from("/data/session.json"));
        cfg.history.session_file = "/elsewhere/s.json".into();
        assert_eq!(cfg.session_path(), PathBuf::from("/elsewhere/s.json"));
    }

    #[test]
    fn yaml_overrides_only_present_fields() {
        let mut cfg = Config::default();
        let yaml = "history:\n  capacity: 7\nrender:\n  font_size: 90\ndefaults:\n  primary:\n    source: LXX\n    book: 1\n    chapter: 2\n    verse: 3\n";
        if let Err(err) = apply_yaml(&mut cfg, yaml) {
            panic!("yaml should apply: {err}");
        }
        assert_eq!(cfg.history.capacity, 7);
        assert_eq!(cfg.render.font_size, 90);
        assert_eq!(cfg.render.primary_file, "main.html");
        assert_eq!(cfg.defaults.primary, Coordinate::new("LXX", 1, 2, 3));
        assert_eq!(cfg.defaults.secondary.source, "NET");
    }

    #[test]
    fn yaml_parse_errors_are_reported() {
        let mut cfg = Config::default();
        let err = match apply_yaml(&mut cfg, "history: [") {
            Ok(()) => panic!("broken yaml should fail"),
            Err(err) => err,
        };
        assert!(err.starts_with("parse config:"), "{err}");
    }

    #[test]
    fn level_filter_maps_levels() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
        logging.level = "DEBUG".into();
        assert_eq!(logging.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("/abs/path"), "/abs/path");
        assert_eq!(expand_tilde(""), "");
        assert!(!expand_tilde("~/x").starts_with('~'));
    }
}
