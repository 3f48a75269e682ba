//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use trellis::config::AppConfig;

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (trellis/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - Config values are out of range
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("trellis/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "trellis", "trellis") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let canvas = config.canvas();
    let metrics = canvas.box_metrics();

    let positive = [
        ("canvas.box_metrics.width", metrics.width),
        ("canvas.box_metrics.header_height", metrics.header_height),
        ("canvas.box_metrics.line_height", metrics.line_height),
        ("canvas.arrow_size", canvas.arrow_size()),
    ];
    for (key, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::Validation(format!(
                "{key} must be a positive number, got {value}"
            )));
        }
    }

    if config.history().max_depth() == 0 {
        return Err(ConfigError::Validation(
            "history.max_depth must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_explicit_config() {
        let (_dir, path) = write_config(
            r#"
            [history]
            max_depth = 10

            [canvas]
            arrow_size = 20.0

            [canvas.box_metrics]
            width = 180.0

            [defaults]
            box_name = "Entity"
            box_position = { x = 10.0, y = 20.0 }
            "#,
        );

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.history().max_depth(), 10);
        assert_eq!(config.canvas().arrow_size(), 20.0);
        assert_eq!(config.canvas().box_metrics().width, 180.0);
        assert_eq!(config.canvas().box_metrics().line_height, 16.0);
        assert_eq!(config.defaults().box_name(), "Entity");
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::MissingFile(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let (_dir, path) = write_config("[history\nmax_depth = ");
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_out_of_range_values() {
        let (_dir, path) = write_config("[canvas]\narrow_size = -1.0\n");
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Validation(_))
        ));

        let (_dir, path) = write_config("[history]\nmax_depth = 0\n");
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }
}
