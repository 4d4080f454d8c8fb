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
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single position fix produced by a position source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
}

impl PositionSample {
    pub fn new(latitude: f64, longitude: f64, accuracy_meters: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters,
        }
    }

    /// Reject samples a real receiver could never produce.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SosError::InvalidSample(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(SosError::InvalidSample(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        if !self.accuracy_meters.is_finite() || self.accuracy_meters < 0.0 {
            return Err(SosError::InvalidSample(format!(
                "accuracy {} must be a non-negative number of meters",
                self.accuracy_meters
            )));
        }
        Ok(())
    }

    /// Link to the sample on a web map.
    pub fn map_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

impl fmt::Display for PositionSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6}, {:.6} (±{:.0} m)",
            self.latitude, self.longitude, self.accuracy_meters
        )
    }
}

/// Who produced a heartbeat: the trigger-time fix or the continuous watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeartbeatOrigin {
    #[serde(rename = "BROWSER")]
    Manual,
    #[serde(rename = "AUTO")]
    Auto,
}

impl fmt::Display for HeartbeatOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeartbeatOrigin::Manual => f.write_str("manual"),
            HeartbeatOrigin::Auto => f.write_str("auto"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_real_fix() {
        assert!(PositionSample::new(12.9, 77.6, 5.0).validate().is_ok());
        assert!(PositionSample::new(-90.0, 180.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(PositionSample::new(91.0, 0.0, 5.0).validate().is_err());
        assert!(PositionSample::new(0.0, -180.5, 5.0).validate().is_err());
        assert!(PositionSample::new(0.0, 0.0, -1.0).validate().is_err());
        assert!(PositionSample::new(f64::NAN, 0.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_origin_wire_names() {
        assert_eq!(
            serde_json::to_string(&HeartbeatOrigin::Manual).unwrap(),
            "\"BROWSER\""
        );
        assert_eq!(
            serde_json::to_string(&HeartbeatOrigin::Auto).unwrap(),
            "\"AUTO\""
        );
    }

    #[test]
    fn test_map_url_and_display() {
        let sample = PositionSample::new(12.9, 77.6, 5.0);
        assert_eq!(sample.map_url(), "https://www.google.com/maps?q=12.9,77.6");
        assert_eq!(sample.to_string(), "12.900000, 77.600000 (±5 m)");
    }
}
