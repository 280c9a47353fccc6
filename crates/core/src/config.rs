use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// All guardian parameters. Loaded once at startup from
/// `<config_dir>/battery-guardian/config.toml`; a missing file or missing
/// keys fall back to the documented defaults. There is no runtime
/// reconfiguration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    /// Battery considered full at or above this percentage; urgent alert
    /// while plugged in.
    pub full_threshold: u8,
    /// Unplug reminder at or above this percentage while plugged in.
    pub high_threshold: u8,
    /// Plug-in reminder at or below this percentage while on battery.
    pub low_threshold: u8,
    /// Seconds between battery samples.
    pub poll_interval_secs: u64,
    /// Seconds between tray tooltip refreshes.
    pub tooltip_refresh_secs: u64,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            full_threshold: 100,
            high_threshold: 80,
            low_threshold: 20,
            poll_interval_secs: 60,
            tooltip_refresh_secs: 10,
        }
    }
}

impl GuardianConfig {
    /// Load config from the user config dir. No file means defaults; an
    /// unreadable or invalid file is an error: startup is the one place
    /// config problems are fatal.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Well-known config file location, if the platform has a config dir.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("battery-guardian").join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Thresholds must be monotonic and intervals non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_threshold >= self.high_threshold {
            return Err(ConfigError::Invalid(format!(
                "low_threshold ({}) must be below high_threshold ({})",
                self.low_threshold, self.high_threshold
            )));
        }
        if self.high_threshold > self.full_threshold {
            return Err(ConfigError::Invalid(format!(
                "high_threshold ({}) must not exceed full_threshold ({})",
                self.high_threshold, self.full_threshold
            )));
        }
        if self.poll_interval_secs == 0 || self.tooltip_refresh_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs and tooltip_refresh_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn tooltip_refresh(&self) -> Duration {
        Duration::from_secs(self.tooltip_refresh_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
