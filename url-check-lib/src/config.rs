//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, and merging configurations with proper
//! precedence rules.

use crate::error::UrlCheckError;
use crate::export::ExportFormat;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for checker options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Output preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Default worker count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Default timeout (as string, e.g., "5s", "1500ms", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Referer header value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,

    /// File of user agents, one per line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agents: Option<PathBuf>,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Directory that receives result sheets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Sheet file format, "xlsx" or "csv"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,

    /// Write header rows in result sheets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_headers: Option<bool>,

    /// Pack the result files of a run into all_results.zip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<bool>,

    /// Pretty-print JSON output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_pretty: Option<bool>,
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Clone, Default)]
pub struct ConfigManager;

impl ConfigManager {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid TOML,
    /// or fails validation.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, UrlCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(UrlCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            UrlCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            UrlCheckError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then the home directory file, then a file in
    /// the current directory.
    pub fn discover_and_load(&self) -> Result<FileConfig, UrlCheckError> {
        let mut merged_config = FileConfig::default();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "loaded config file");
                    merged_config = self.merge_configs(merged_config, config);
                }
                Err(e) => {
                    tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                }
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./url-check.toml", "./.url-check.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the global configuration file path in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let candidates = [".url-check.toml", "url-check.toml"];

        candidates
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("url-check").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations. Values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower), Some(higher)) => Some(DefaultsConfig {
                    workers: higher.workers.or(lower.workers),
                    timeout: higher.timeout.or(lower.timeout),
                    referer: higher.referer.or(lower.referer),
                    user_agents: higher.user_agents.or(lower.user_agents),
                }),
                (lower, higher) => higher.or(lower),
            },
            output: match (lower.output, higher.output) {
                (Some(lower), Some(higher)) => Some(OutputConfig {
                    dir: higher.dir.or(lower.dir),
                    format: higher.format.or(lower.format),
                    csv_headers: higher.csv_headers.or(lower.csv_headers),
                    bundle: higher.bundle.or(lower.bundle),
                    json_pretty: higher.json_pretty.or(lower.json_pretty),
                }),
                (lower, higher) => higher.or(lower),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), UrlCheckError> {
        if let Some(defaults) = &config.defaults {
            if let Some(workers) = defaults.workers {
                if workers == 0 || workers > 100 {
                    return Err(UrlCheckError::config("Workers must be between 1 and 100"));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout(timeout_str).is_none() {
                    return Err(UrlCheckError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '1500ms', '2m'",
                        timeout_str
                    )));
                }
            }

            if let Some(referer) = &defaults.referer {
                if referer.trim().is_empty() {
                    return Err(UrlCheckError::config("Referer cannot be empty"));
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// Values come from `UC_*` variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub workers: Option<usize>,
    pub timeout: Option<Duration>,
    pub referer: Option<String>,
    pub user_agents: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Load configuration from `UC_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = lookup("UC_WORKERS") {
        match val.trim().parse::<usize>() {
            Ok(workers) if (1..=100).contains(&workers) => env_config.workers = Some(workers),
            _ => tracing::warn!("Invalid UC_WORKERS='{}', must be 1-100", val),
        }
    }

    if let Some(val) = lookup("UC_TIMEOUT") {
        match parse_timeout(&val) {
            Some(timeout) => env_config.timeout = Some(timeout),
            None => tracing::warn!(
                "Invalid UC_TIMEOUT='{}', use format like '5s', '1500ms', '2m'",
                val
            ),
        }
    }

    if let Some(val) = lookup("UC_REFERER") {
        if !val.trim().is_empty() {
            env_config.referer = Some(val.trim().to_string());
        }
    }

    env_config.user_agents = non_empty_path(lookup("UC_USER_AGENTS"));
    env_config.output_dir = non_empty_path(lookup("UC_OUTPUT_DIR"));
    env_config.config = non_empty_path(lookup("UC_CONFIG"));

    env_config
}

fn non_empty_path(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Parse a timeout string like "5s", "1500ms", "2m" or "5".
///
/// Bare numbers are seconds. Zero, and minute counts too large to
/// express in seconds, are rejected.
pub fn parse_timeout(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let timeout = if let Some(ms) = timeout_str.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    };

    timeout.filter(|t| !t.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio_test::{assert_err, assert_ok};

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout("30S"), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout("1500ms"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_timeout("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout("0s"), None);
        assert_eq!(parse_timeout("invalid"), None);
        assert_eq!(parse_timeout(""), None);
    }

    #[test]
    fn test_parse_timeout_rejects_overflowing_minutes() {
        assert_eq!(parse_timeout("999999999999999999m"), None);
        assert_eq!(
            parse_timeout("307445734561825860m"),
            Some(Duration::from_secs(307445734561825860 * 60))
        );

        let file = write_config("[defaults]\ntimeout = \"999999999999999999m\"\n");
        let err = ConfigManager::new().load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid timeout format"));

        let vars: HashMap<&str, &str> = [("UC_TIMEOUT", "999999999999999999m")].into_iter().collect();
        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(env_config.timeout, None);
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(
            r#"
[defaults]
workers = 12
timeout = "3s"
referer = "https://example.com/"
user_agents = "agents.txt"

[output]
dir = "results"
format = "csv"
csv_headers = false
bundle = false
"#,
        );

        let config = assert_ok!(ConfigManager::new().load_file(file.path()));

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.workers, Some(12));
        assert_eq!(defaults.timeout.as_deref(), Some("3s"));
        assert_eq!(defaults.referer.as_deref(), Some("https://example.com/"));
        assert_eq!(defaults.user_agents, Some(PathBuf::from("agents.txt")));

        let output = config.output.unwrap();
        assert_eq!(output.dir, Some(PathBuf::from("results")));
        assert_eq!(output.format, Some(ExportFormat::Csv));
        assert_eq!(output.csv_headers, Some(false));
        assert_eq!(output.bundle, Some(false));
        assert_eq!(output.json_pretty, None);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let file = write_config("[output]\nformat = \"ods\"\n");
        let err = ConfigManager::new().load_file(file.path()).unwrap_err();
        assert!(matches!(err, UrlCheckError::ConfigError { .. }));
    }

    #[test]
    fn test_invalid_workers() {
        let file = write_config("[defaults]\nworkers = 0\n");
        assert_err!(ConfigManager::new().load_file(file.path()));

        let file = write_config("[defaults]\nworkers = 101\n");
        assert_err!(ConfigManager::new().load_file(file.path()));
    }

    #[test]
    fn test_invalid_timeout() {
        let file = write_config("[defaults]\ntimeout = \"soon\"\n");
        let err = ConfigManager::new().load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid timeout format"));
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("[defaults\nworkers = 3");
        let err = ConfigManager::new().load_file(file.path()).unwrap_err();
        assert!(matches!(err, UrlCheckError::ConfigError { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigManager::new()
            .load_file("/no/such/url-check.toml")
            .unwrap_err();
        assert!(matches!(err, UrlCheckError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new();

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                workers: Some(10),
                timeout: Some("10s".to_string()),
                ..Default::default()
            }),
            output: Some(OutputConfig {
                dir: Some(PathBuf::from("low")),
                csv_headers: Some(false),
                bundle: Some(false),
                ..Default::default()
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                workers: Some(25),
                ..Default::default()
            }),
            output: Some(OutputConfig {
                format: Some(ExportFormat::Csv),
                ..Default::default()
            }),
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();
        assert_eq!(defaults.workers, Some(25)); // Higher wins
        assert_eq!(defaults.timeout.as_deref(), Some("10s")); // Lower preserved

        let output = merged.output.unwrap();
        assert_eq!(output.dir, Some(PathBuf::from("low")));
        assert_eq!(output.format, Some(ExportFormat::Csv));
        assert_eq!(output.csv_headers, Some(false));
        assert_eq!(output.bundle, Some(false));
    }

    #[test]
    fn test_env_config_parsing() {
        let vars: HashMap<&str, &str> = [
            ("UC_WORKERS", "8"),
            ("UC_TIMEOUT", "750ms"),
            ("UC_REFERER", " https://ref.example/ "),
            ("UC_OUTPUT_DIR", "out"),
            ("UC_USER_AGENTS", "  "),
        ]
        .into_iter()
        .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(env_config.workers, Some(8));
        assert_eq!(env_config.timeout, Some(Duration::from_millis(750)));
        assert_eq!(env_config.referer.as_deref(), Some("https://ref.example/"));
        assert_eq!(env_config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(env_config.user_agents, None);
        assert_eq!(env_config.config, None);
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let vars: HashMap<&str, &str> = [("UC_WORKERS", "500"), ("UC_TIMEOUT", "never")]
            .into_iter()
            .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(env_config.workers, None);
        assert_eq!(env_config.timeout, None);
    }
}
