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

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway sosguard home, removed when the guard is dropped.
pub struct TestHomeGuard {
    dir: TempDir,
}

#[allow(dead_code)]
impl TestHomeGuard {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create test home directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn sosguard_home(&self) -> PathBuf {
        self.dir.path().join(".sosguard")
    }

    /// Store a session as `sosguard login` would.
    pub fn sign_in(&self, token: &str) -> &Self {
        let home = self.sosguard_home();
        fs::create_dir_all(&home).expect("Failed to create sosguard home");
        let session = serde_json::json!({
            "token": token,
            "user": {"id": "u1", "name": "Asha", "email": "asha@example.com"}
        });
        fs::write(home.join("session.json"), session.to_string())
            .expect("Failed to write session");
        self
    }

    /// The binary pointed at this home and at `base_url`, with a clean environment.
    pub fn command(&self, base_url: &str) -> Command {
        let mut cmd = Command::cargo_bin("sosguard").expect("binary should build");
        cmd.env("SOSGUARD_HOME", self.sosguard_home())
            .env("SOSGUARD_API__BASE_URL", base_url)
            .env("SOSGUARD_API__TIMEOUT_SECS", "5")
            .env_remove("RUST_LOG")
            .env_remove("SOSGUARD_LOCATION__SOURCE");
        cmd
    }

    /// Like [`command`](Self::command) with a fixed position source configured.
    pub fn command_with_fix(&self, base_url: &str) -> Command {
        let mut cmd = self.command(base_url);
        cmd.env("SOSGUARD_LOCATION__SOURCE", "fixed")
            .env("SOSGUARD_LOCATION__LATITUDE", "12.9")
            .env("SOSGUARD_LOCATION__LONGITUDE", "77.6")
            .env("SOSGUARD_LOCATION__ACCURACY_METERS", "5");
        cmd
    }
}

impl Default for TestHomeGuard {
    fn default() -> Self {
        Self::new()
    }
}
