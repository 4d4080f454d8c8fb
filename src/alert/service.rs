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

use crate::error::Result;
use crate::models::{AlertRecord, HeartbeatOrigin, PositionSample};

/// The backend that records alerts and location heartbeats.
///
/// The service is the system of record and enforces at most one active
/// alert per user. Implementations must not retry on their own.
pub trait RemoteAlertService: Send + Sync {
    /// The user's currently active alert, if any
    fn active_alert(&self, user_id: &str) -> Result<Option<AlertRecord>>;

    /// Raise a new alert. The service assigns the id and timestamps and takes
    /// the initial location from the most recent heartbeat.
    fn create_alert(&self, notes: Option<&str>) -> Result<AlertRecord>;

    fn cancel_alert(&self, alert_id: &str, reason: &str) -> Result<()>;

    /// Report one position sample
    fn send_heartbeat(&self, sample: &PositionSample, origin: HeartbeatOrigin) -> Result<()>;
}
