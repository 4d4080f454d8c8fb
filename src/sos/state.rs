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

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SosState {
    /// No active alert known
    #[default]
    Idle,
    /// Reconciling with the alert service
    Loading,
    /// Alert confirmed and tracking running
    Active,
    /// Trigger or cancel request in flight
    Transitioning,
}

impl fmt::Display for SosState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SosState::Idle => "idle",
            SosState::Loading => "loading",
            SosState::Active => "active",
            SosState::Transitioning => "transitioning",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_default() {
        assert_eq!(SosState::default(), SosState::Idle);
        assert_eq!(SosState::Transitioning.to_string(), "transitioning");
        assert_eq!(
            serde_json::to_string(&SosState::Active).unwrap(),
            "\"active\""
        );
    }
}
