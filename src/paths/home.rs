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
use crate::paths::shared::ensure_directory;
use std::env;
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "SOSGUARD_HOME";
pub const DEFAULT_HOME_DIR: &str = ".sosguard";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const SESSION_FILE_NAME: &str = "session.json";

/// Resolve the sosguard home directory: `$SOSGUARD_HOME`, else `~/.sosguard`.
pub fn resolve_home() -> Result<PathBuf> {
    if let Some(home) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir()
        .map(|home| home.join(DEFAULT_HOME_DIR))
        .ok_or_else(|| {
            SosError::ConfigError(format!(
                "Unable to determine the home directory; set {HOME_ENV}"
            ))
        })
}

pub fn config_file(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE_NAME)
}

pub fn session_file(home: &Path) -> PathBuf {
    home.join(SESSION_FILE_NAME)
}

pub fn ensure_home(home: &Path) -> Result<PathBuf> {
    ensure_directory(home.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn file_helpers_join_expected_paths() {
        let home = Path::new("/tmp/sosguard");
        assert_eq!(config_file(home), PathBuf::from("/tmp/sosguard/config.toml"));
        assert_eq!(session_file(home), PathBuf::from("/tmp/sosguard/session.json"));
    }

    #[test]
    #[serial]
    fn resolve_home_prefers_environment() {
        let temp = TempDir::new().unwrap();
        unsafe {
            env::set_var(HOME_ENV, temp.path());
        }

        let resolved = resolve_home().unwrap();

        unsafe {
            env::remove_var(HOME_ENV);
        }
        assert_eq!(resolved, temp.path());
    }

    #[test]
    #[serial]
    fn resolve_home_ignores_empty_environment() {
        unsafe {
            env::set_var(HOME_ENV, "");
        }

        let resolved = resolve_home();

        unsafe {
            env::remove_var(HOME_ENV);
        }
        if let Ok(path) = resolved {
            assert!(path.ends_with(DEFAULT_HOME_DIR));
        }
    }

    #[test]
    fn ensure_home_creates_directory() {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join(DEFAULT_HOME_DIR);

        ensure_home(&home).unwrap();

        assert!(home.is_dir());
    }
}
