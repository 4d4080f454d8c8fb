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

use crate::config::{LocationConfig, PositionSourceKind};
use crate::position::{CommandPositionSource, FixedPositionSource, PositionOptions, PositionSource};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured position source. `None` means the device has no
/// positioning capability.
pub fn create_position_source(config: &LocationConfig) -> Option<Arc<dyn PositionSource>> {
    match config.source {
        PositionSourceKind::None => {
            debug!("No position source configured");
            None
        }
        PositionSourceKind::Fixed => {
            let sample = config.fixed_sample()?;
            Some(Arc::new(FixedPositionSource::new(
                sample,
                config.watch_interval(),
            )))
        }
        PositionSourceKind::Command => {
            if config.command.is_empty() {
                return None;
            }
            Some(Arc::new(CommandPositionSource::new(
                config.command.clone(),
                config.watch_interval(),
            )))
        }
    }
}

/// Sampling options derived from configuration.
pub fn position_options(config: &LocationConfig) -> PositionOptions {
    PositionOptions {
        high_accuracy: config.high_accuracy,
        timeout: config.fix_timeout(),
        maximum_age: Duration::from_millis(config.max_cache_age_ms),
    }
}
