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
use crate::models::User;
use crate::paths::session_file;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The bearer token and the identity it was issued for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

/// `session.json` in the sosguard home.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(home: &Path) -> Self {
        Self {
            path: session_file(home),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session. A missing file means nobody is signed in.
    pub fn load(&self) -> Result<Option<StoredSession>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SosError::SessionError(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let session = serde_json::from_str(&contents).map_err(|e| {
            SosError::SessionError(format!("Corrupt session file {}: {e}", self.path.display()))
        })?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SosError::SessionError(format!("Failed to create session directory: {e}"))
            })?;
        }

        let json = serde_json::to_string_pretty(session)?;

        // Write to a temporary file first so a crash never leaves half a token behind
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json)
            .map_err(|e| SosError::SessionError(format!("Failed to write session file: {e}")))?;
        restrict_permissions(&temp_path)?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| SosError::SessionError(format!("Failed to rename session file: {e}")))?;

        debug!("Saved session for {} to {}", session.user.email, self.path.display());
        Ok(())
    }

    /// Remove the stored session. Clearing an absent session is not an error.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SosError::SessionError(format!(
                "Failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_session() -> StoredSession {
        StoredSession {
            token: "t0k3n".to_string(),
            user: User {
                id: "u1".to_string(),
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                phone: Some("+91 98450 00000".to_string()),
            },
        }
    }

    #[test]
    fn test_load_missing_session() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path());

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_session() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(&temp.path().join("home"));

        store.save(&sample_session()).unwrap();

        assert_eq!(store.load().unwrap(), Some(sample_session()));
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path());
        store.save(&sample_session()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_session_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path());
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(store.load(), Err(SosError::SessionError(_))));
    }

    #[test]
    fn test_clear_session() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path());
        store.save(&sample_session()).unwrap();

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert!(store.load().unwrap().is_none());
    }
}
