use std::path::{Path, PathBuf};
use std::str::FromStr;

use facepaint_core::FilterId;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Session configuration: defaults, then an optional TOML file, then
/// `FACEPAINT_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// V4L2 device for the front-facing camera (default: /dev/video0).
    pub user_device: String,
    /// V4L2 device for the rear-facing camera (default: /dev/video1).
    pub environment_device: String,
    /// Requested capture width; the driver may negotiate another.
    pub width: u32,
    /// Requested capture height.
    pub height: u32,
    /// Delay between frame loop ticks.
    pub frame_interval_ms: u64,
    /// Where `save` writes photos.
    pub photo_dir: PathBuf,
    /// Filter active when a session starts.
    pub default_filter: FilterId,
    /// Fixed seed for randomised filters. Unset means a fresh seed per run.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_device: "/dev/video0".to_string(),
            environment_device: "/dev/video1".to_string(),
            width: 640,
            height: 480,
            frame_interval_ms: 33,
            photo_dir: default_photo_dir(),
            default_filter: FilterId::none(),
            seed: None,
        }
    }
}

impl Config {
    /// Load from the config file (if any) and the process environment.
    ///
    /// `$FACEPAINT_CONFIG` must exist when set; the XDG default is optional.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os("FACEPAINT_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overlay `FACEPAINT_*` variables, read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(device) = var("FACEPAINT_USER_DEVICE") {
            self.user_device = device;
        }
        if let Some(device) = var("FACEPAINT_ENVIRONMENT_DEVICE") {
            self.environment_device = device;
        }
        if let Some(dir) = var("FACEPAINT_PHOTO_DIR") {
            self.photo_dir = PathBuf::from(dir);
        }
        if let Some(filter) = var("FACEPAINT_DEFAULT_FILTER") {
            self.default_filter = FilterId::new(filter);
        }
        self.width = env_parse(&var, "FACEPAINT_WIDTH").unwrap_or(self.width);
        self.height = env_parse(&var, "FACEPAINT_HEIGHT").unwrap_or(self.height);
        self.frame_interval_ms =
            env_parse(&var, "FACEPAINT_FRAME_INTERVAL_MS").unwrap_or(self.frame_interval_ms);
        if let Some(seed) = env_parse(&var, "FACEPAINT_SEED") {
            self.seed = Some(seed);
        }
    }

    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

fn env_parse<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = var(key)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "ignoring unparsable environment override");
            None
        }
    }
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

fn default_config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("facepaint")
        .join("config.toml")
}

fn default_photo_dir() -> PathBuf {
    std::env::var("XDG_PICTURES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join("Pictures"))
        .join("facepaint")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.user_device, "/dev/video0");
        assert_eq!(config.environment_device, "/dev/video1");
        assert_eq!((config.width, config.height), (640, 480));
        assert!(config.default_filter.is_none());
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_toml_overlays_defaults() {
        let config = Config::from_toml(
            r#"
            user_device = "/dev/video4"
            default_filter = "crown"
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.user_device, "/dev/video4");
        assert_eq!(config.default_filter.as_str(), "crown");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.environment_device, "/dev/video1");
        assert_eq!(config.frame_interval_ms, 33);
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        assert!(Config::from_toml("camera = \"/dev/video0\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml("width = 320\nheight = 240").unwrap();
        config.apply_env(vars(&[
            ("FACEPAINT_WIDTH", "1280"),
            ("FACEPAINT_ENVIRONMENT_DEVICE", "/dev/video9"),
            ("FACEPAINT_DEFAULT_FILTER", "pirate"),
            ("FACEPAINT_SEED", "42"),
            ("FACEPAINT_PHOTO_DIR", "/tmp/shots"),
        ]));
        assert_eq!((config.width, config.height), (1280, 240));
        assert_eq!(config.environment_device, "/dev/video9");
        assert_eq!(config.default_filter.as_str(), "pirate");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.photo_dir, PathBuf::from("/tmp/shots"));
    }

    #[test]
    fn test_bad_env_value_keeps_previous() {
        let mut config = Config::default();
        config.apply_env(vars(&[("FACEPAINT_FRAME_INTERVAL_MS", "fast"), ("FACEPAINT_HEIGHT", "")]));
        assert_eq!(config.frame_interval_ms, 33);
        assert_eq!(config.height, 480);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Config::from_file(Path::new("/nonexistent/facepaint/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_frame_interval_never_zero() {
        let config = Config { frame_interval_ms: 0, ..Config::default() };
        assert_eq!(config.frame_interval(), std::time::Duration::from_millis(1));
    }
}
