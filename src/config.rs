use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

/// Application configuration loaded from a TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Custom save-file path (overrides XDG default).
    pub data_path: Option<PathBuf>,
    /// Default offset for weighted pair selection.
    pub offset: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            offset: crate::DEFAULT_OFFSET,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/fretdrill/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Resolve the default save-file path using XDG data directory.
pub fn default_data_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", crate::APP_NAME) {
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).ok();
        data_dir.join("chords.json")
    } else {
        // Fallback: current directory
        PathBuf::from("chords.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.data_path.is_none());
        assert_eq!(config.offset, crate::DEFAULT_OFFSET);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = toml::from_str("data_path = \"/tmp/my.json\"").unwrap();
        assert_eq!(config.data_path.as_deref(), Some(std::path::Path::new("/tmp/my.json")));
        assert_eq!(config.offset, crate::DEFAULT_OFFSET);
    }

    #[test]
    fn test_offset_override() {
        let config: AppConfig = toml::from_str("offset = 0").unwrap();
        assert_eq!(config.offset, 0);
    }
}
