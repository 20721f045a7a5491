//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$PSTREPORT_CONFIG` (environment variable)
//! 2. `~/.config/pstreport/config.toml` (Linux/macOS)
//!    `%APPDATA%\pstreport\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::export::folder::DEFAULT_DATE_FORMAT;
use crate::export::path::DEFAULT_OUTPUT_DIR;
use crate::traverse::{ExclusionList, DEFAULT_EXCLUDED_FOLDERS};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Folder walk settings.
    pub traversal: TraversalConfig,
    /// Report output settings.
    pub export: ExportConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override directory for the log file.
    pub log_dir: Option<PathBuf>,
}

/// Folder walk settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Folder names whose own messages are not exported (exact match).
    pub exclude_folders: Vec<String>,
    /// Also skip everything below an excluded folder.
    pub skip_excluded_children: bool,
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output directory; relative paths are resolved against the working directory.
    pub output_dir: PathBuf,
    /// `strftime` format for timestamp cells.
    pub date_format: String,
    /// Replace path-unsafe characters in folder names used in file names.
    pub sanitize_names: bool,
    /// Charset used for bodies stored as raw bytes.
    pub body_charset: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            exclude_folders: DEFAULT_EXCLUDED_FOLDERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_excluded_children: false,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            sanitize_names: true,
            body_charset: "utf-8".to_string(),
        }
    }
}

impl TraversalConfig {
    /// The configured exclusion list.
    pub fn exclusions(&self) -> ExclusionList {
        self.exclude_folders.iter().cloned().collect()
    }

    /// Exclusion list after command-line overrides: `no_defaults` drops the
    /// configured names, then `extra` names are added.
    pub fn exclusions_with(&self, no_defaults: bool, extra: &[String]) -> ExclusionList {
        let mut list = if no_defaults {
            ExclusionList::empty()
        } else {
            self.exclusions()
        };
        for name in extra {
            list.insert(name.clone());
        }
        list
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location. Returns the path written.
pub fn save_config(config: &Config) -> anyhow::Result<PathBuf> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(path)
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("PSTREPORT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("pstreport").join("config.toml"))
}

/// Return the directory for log files.
pub fn log_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.log_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pstreport")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.export.output_dir, PathBuf::from("output"));
        assert_eq!(cfg.export.date_format, "%Y-%m-%d %H:%M:%S");
        assert!(cfg.export.sanitize_names);
        assert!(!cfg.traversal.skip_excluded_children);
        assert_eq!(cfg.traversal.exclusions(), ExclusionList::default());
    }

    #[test]
    fn test_exclusions_with_overrides() {
        let cfg = TraversalConfig::default();
        let extra = vec!["Archive".to_string()];

        let merged = cfg.exclusions_with(false, &extra);
        assert!(merged.contains("Junk Email"));
        assert!(merged.contains("Archive"));

        let only_extra = cfg.exclusions_with(true, &extra);
        assert!(!only_extra.contains("Junk Email"));
        assert!(only_extra.contains("Archive"));

        assert_eq!(cfg.exclusions_with(false, &[]), cfg.exclusions());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.traversal.exclude_folders, cfg.traversal.exclude_folders);
        assert_eq!(parsed.export.body_charset, cfg.export.body_charset);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[traversal]
exclude_folders = ["Archive", "Calendar"]

[export]
output_dir = "/srv/case-1142/reports"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        let exclusions = cfg.traversal.exclusions();
        assert!(exclusions.contains("Archive"));
        assert!(!exclusions.contains("Junk Email"));
        assert_eq!(cfg.export.output_dir, PathBuf::from("/srv/case-1142/reports"));
        // Other fields use defaults
        assert_eq!(cfg.export.date_format, "%Y-%m-%d %H:%M:%S");
        assert_eq!(cfg.general.log_level, "warn");
    }
}
