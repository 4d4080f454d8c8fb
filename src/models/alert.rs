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

use crate::models::position::PositionSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    #[serde(alias = "active")]
    Active,
    #[serde(alias = "cancelled", alias = "CANCELED", alias = "canceled")]
    Cancelled,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertStatus::Active => f.write_str("ACTIVE"),
            AlertStatus::Cancelled => f.write_str("CANCELLED"),
        }
    }
}

/// An SOS alert as confirmed by the alert service.
///
/// The `id` is always server-assigned; nothing in this crate fabricates one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub initial_location: Option<PositionSample>,
    pub current_location: Option<PositionSample>,
    pub notes: Option<String>,
}

impl AlertRecord {
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// The location to show for this alert: current if known, else initial.
    pub fn display_location(&self) -> Option<&PositionSample> {
        self.current_location
            .as_ref()
            .or(self.initial_location.as_ref())
    }

    pub fn map_url(&self) -> Option<String> {
        self.display_location().map(PositionSample::map_url)
    }
}
