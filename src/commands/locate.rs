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

use crate::commands::context::location_tracker;
use crate::config::SosConfig;
use crate::error::Result;
use crate::models::PositionSample;
use serde::Serialize;

#[derive(Serialize)]
struct LocateOutput {
    #[serde(flatten)]
    sample: PositionSample,
    map_url: String,
}

/// Take one position fix with the configured source.
pub struct LocateCommand<'a> {
    config: &'a SosConfig,
}

impl<'a> LocateCommand<'a> {
    pub fn new(config: &'a SosConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, json: bool) -> Result<()> {
        let tracker = location_tracker(self.config);
        let sample = tracker.fetch_once()?;

        if json {
            let output = LocateOutput {
                sample,
                map_url: sample.map_url(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{sample}");
            println!("{}", sample.map_url());
        }
        Ok(())
    }
}
