// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{Result, SosError};
use crate::models::PositionSample;
use crate::paths::{config_file, resolve_home};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "SOSGUARD";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_API_TIMEOUT_SECS: u64 = 15;
const DEFAULT_FIX_TIMEOUT_SECS: u64 = 10;
const DEFAULT_WATCH_INTERVAL_SECS: u64 = 5;
const DEFAULT_CANCEL_REASON: &str = "user safe";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SosConfig {
    #[serde(skip)]
    pub home: PathBuf,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub alert: AlertConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PositionSourceKind {
    #[default]
    None,
    Fixed,
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub source: PositionSourceKind,
    #[serde(default = "default_fix_timeout_secs")]
    pub fix_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub high_accuracy: bool,
    #[serde(default)]
    pub max_cache_age_ms: u64,
    #[serde(default = "default_watch_interval_secs")]
    pub watch_interval_secs: u64,

    // fixed source
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub accuracy_meters: Option<f64>,

    // command source
    #[serde(default)]
    pub command: Vec<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            source: PositionSourceKind::None,
            fix_timeout_secs: default_fix_timeout_secs(),
            high_accuracy: true,
            max_cache_age_ms: 0,
            watch_interval_secs: default_watch_interval_secs(),
            latitude: None,
            longitude: None,
            accuracy_meters: None,
            command: Vec::new(),
        }
    }
}

impl LocationConfig {
    pub fn fix_timeout(&self) -> Duration {
        Duration::from_secs(self.fix_timeout_secs)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs)
    }

    /// The configured coordinate for the fixed source, if complete.
    pub fn fixed_sample(&self) -> Option<PositionSample> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(PositionSample::new(
                latitude,
                longitude,
                self.accuracy_meters.unwrap_or(0.0),
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_cancel_reason")]
    pub cancel_reason: String,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cancel_reason: default_cancel_reason(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl AlertConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_timeout_secs() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}

fn default_fix_timeout_secs() -> u64 {
    DEFAULT_FIX_TIMEOUT_SECS
}

fn default_watch_interval_secs() -> u64 {
    DEFAULT_WATCH_INTERVAL_SECS
}

fn default_cancel_reason() -> String {
    DEFAULT_CANCEL_REASON.to_string()
}

fn default_refresh_interval_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

fn default_true() -> bool {
    true
}

/// Load configuration from the resolved sosguard home.
pub fn new_sos_config() -> Result<SosConfig> {
    let home = resolve_home()?;
    SosConfig::load(&home)
}

impl SosConfig {
    /// Layer built-in defaults, `<home>/config.toml` and `SOSGUARD_*` variables.
    pub fn load(home: &Path) -> Result<Self> {
        let path = config_file(home);
        if !path.exists() {
            log::debug!("Config file not found at {path:?}, using defaults");
        }

        let settings = Config::builder()
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(" ")
                    .with_list_parse_key("location.command")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| SosError::ConfigError(format!("Failed to read configuration: {e}")))?;

        let mut config: SosConfig = settings
            .try_deserialize()
            .map_err(|e| SosError::ConfigError(format!("Invalid configuration: {e}")))?;
        config.home = home.to_path_buf();
        config.validate()?;

        log::debug!("Loaded config for home {home:?}");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(SosError::ConfigError("api.base_url must not be empty".to_string()));
        }
        if self.api.timeout_secs == 0 {
            return Err(SosError::ConfigError(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.location.fix_timeout_secs == 0 {
            return Err(SosError::ConfigError(
                "location.fix_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.location.watch_interval_secs == 0 {
            return Err(SosError::ConfigError(
                "location.watch_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.alert.refresh_interval_secs == 0 {
            return Err(SosError::ConfigError(
                "alert.refresh_interval_secs must be greater than zero".to_string(),
            ));
        }

        match self.location.source {
            PositionSourceKind::None => {}
            PositionSourceKind::Fixed => {
                let sample = self.location.fixed_sample().ok_or_else(|| {
                    SosError::ConfigError(
                        "location.source = \"fixed\" requires location.latitude and \
                         location.longitude"
                            .to_string(),
                    )
                })?;
                sample
                    .validate()
                    .map_err(|e| SosError::ConfigError(format!("location: {e}")))?;
            }
            PositionSourceKind::Command => {
                if self.location.command.is_empty() {
                    return Err(SosError::ConfigError(
                        "location.source = \"command\" requires location.command".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_load_missing_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = SosConfig::load(temp_dir.path()).unwrap();

        assert_eq!(config.home, temp_dir.path());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.location.source, PositionSourceKind::None);
        assert_eq!(config.location.fix_timeout(), Duration::from_secs(10));
        assert!(config.location.high_accuracy);
        assert_eq!(config.location.max_cache_age_ms, 0);
        assert_eq!(config.alert.cancel_reason, "user safe");
    }

    #[test]
    #[serial]
    fn test_load_fixed_source_from_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            r#"
[api]
base_url = "https://sos.example.com"

[location]
source = "fixed"
latitude = 12.9
longitude = 77.6
accuracy_meters = 5.0
"#,
        )
        .unwrap();

        let config = SosConfig::load(temp_dir.path()).unwrap();

        assert_eq!(config.api.base_url, "https://sos.example.com");
        assert_eq!(config.location.source, PositionSourceKind::Fixed);
        assert_eq!(
            config.location.fixed_sample(),
            Some(PositionSample::new(12.9, 77.6, 5.0))
        );
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "[api]\nbase_url = \"https://file.example.com\"\n",
        )
        .unwrap();

        unsafe {
            env::set_var("SOSGUARD_API__BASE_URL", "https://env.example.com");
            env::set_var("SOSGUARD_ALERT__REFRESH_INTERVAL_SECS", "30");
        }
        let config = SosConfig::load(temp_dir.path());
        unsafe {
            env::remove_var("SOSGUARD_API__BASE_URL");
            env::remove_var("SOSGUARD_ALERT__REFRESH_INTERVAL_SECS");
        }

        let config = config.unwrap();
        assert_eq!(config.api.base_url, "https://env.example.com");
        assert_eq!(config.alert.refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_fixed_source_requires_coordinates() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "[location]\nsource = \"fixed\"\nlatitude = 12.9\n",
        )
        .unwrap();

        let err = SosConfig::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, SosError::ConfigError(_)));
        assert!(err.to_string().contains("location.longitude"));
    }

    #[test]
    #[serial]
    fn test_command_source_requires_command() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "[location]\nsource = \"command\"\n",
        )
        .unwrap();

        let err = SosConfig::load(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("location.command"));
    }

    #[test]
    #[serial]
    fn test_zero_timeout_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "[location]\nfix_timeout_secs = 0\n",
        )
        .unwrap();

        let err = SosConfig::load(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("fix_timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_fixed_sample() {
        let mut config = SosConfig::default();
        config.location.source = PositionSourceKind::Fixed;
        config.location.latitude = Some(120.0);
        config.location.longitude = Some(0.0);

        assert!(config.validate().is_err());
    }

    const CONFIG_FILE: &str = crate::paths::home::CONFIG_FILE_NAME;
}
