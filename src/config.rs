use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine::{Difficulty, Timings};

const APP_DIR: &str = "flipmatch";
const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON catalog to deal from instead of the built-in emoji set.
    pub catalog_uri: Option<String>,
    pub default_difficulty: Difficulty,
    pub timings: Timings,
}

impl Settings {
    pub fn from_json(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads settings from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_json(&raw, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", path.display());
                Ok(Settings::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Loads the user's settings, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = settings_path() else {
            return Settings::default();
        };
        Self::load_from(&path).unwrap_or_else(|err| {
            warn!("{err}; using default settings");
            Settings::default()
        })
    }
}

fn config_home() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME")
        && !dir.trim().is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config"))
}

pub fn settings_path() -> Option<PathBuf> {
    Some(config_home()?.join(APP_DIR).join(SETTINGS_FILE_NAME))
}

pub fn debug_mode_enabled() -> bool {
    match std::env::var("FLIPMATCH_DEBUG") {
        Ok(value) => {
            let v = value.trim().to_ascii_lowercase();
            matches!(v.as_str(), "1" | "true" | "yes" | "on")
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_keep_defaults() {
        let raw = r#"{ "default_difficulty": "hard", "timings": { "reveal_ms": 1500 } }"#;
        let settings = Settings::from_json(raw, Path::new("settings.json")).unwrap();
        assert_eq!(settings.default_difficulty, Difficulty::Hard);
        assert_eq!(settings.timings.reveal_ms, 1500);
        assert_eq!(settings.timings.tick_ms, 1000);
        assert_eq!(settings.catalog_uri, None);
    }

    #[test]
    fn malformed_settings_are_reported() {
        let err = Settings::from_json("{ nope", Path::new("/tmp/settings.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid settings in /tmp/settings.json"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("flipmatch-missing-settings-3f9a.json");
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
    }

    #[test]
    fn settings_file_round_trip() {
        let path = std::env::temp_dir().join(format!("flipmatch-settings-{}.json", std::process::id()));
        let settings = Settings {
            catalog_uri: Some("file:///srv/catalog.json".into()),
            default_difficulty: Difficulty::Medium,
            timings: Timings::default(),
        };
        fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }
}
