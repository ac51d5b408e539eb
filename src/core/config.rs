//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Plantree configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format (auto, tsv, json, yaml, id)
    pub default_format: Option<String>,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "plantree=debug")
    pub log_level: Option<String>,

    /// Whether new maintenance events may fall back to the first compatible
    /// unit when a slot has no recorded assignment
    pub default_unit_fallback: Option<bool>,

    /// Config files that were found but could not be read, with the reason
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// `workspace_dir` is the `.plantree/` directory, when one was found.
    /// Unreadable files are skipped and listed in `warnings`; loading runs
    /// before logging is up, so the caller reports them.
    pub fn load(workspace_dir: Option<&Path>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/plantree/config.yaml)
        if let Some(path) = Self::global_config_path() {
            config.merge_file(&path);
        }

        // 3. Workspace config (.plantree/config.yaml)
        if let Some(dir) = workspace_dir {
            config.merge_file(&dir.join("config.yaml"));
        }

        // 4. Environment variables
        if let Ok(format) = std::env::var("PLANTREE_FORMAT") {
            config.default_format = Some(format);
        }
        if let Ok(level) = std::env::var("PLANTREE_LOG") {
            config.log_level = Some(level);
        }

        config
    }

    fn merge_file(&mut self, path: &Path) {
        match Self::read(path) {
            Ok(Some(other)) => self.merge(other),
            Ok(None) => {}
            Err(e) => self
                .warnings
                .push(format!("ignoring config file {}: {}", path.display(), e)),
        }
    }

    /// `Ok(None)` when the file does not exist
    fn read(path: &Path) -> Result<Option<Config>, String> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.to_string()),
        };
        // A fully commented template is an empty document
        if contents
            .lines()
            .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'))
        {
            return Ok(Some(Config::default()));
        }
        serde_yml::from_str::<Config>(&contents)
            .map(Some)
            .map_err(|e| e.to_string())
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "plantree")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.default_unit_fallback.is_some() {
            self.default_unit_fallback = other.default_unit_fallback;
        }
    }

    pub fn default_unit_fallback(&self) -> bool {
        self.default_unit_fallback.unwrap_or(true)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }
}
