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

use crate::commands::context::{controller_for, print_alert, require_session};
use crate::commands::interrupt::global_token;
use crate::commands::tracking::follow;
use crate::config::SosConfig;
use crate::error::{Result, SosError};
use crate::sos::SosState;

/// Resume location sharing for an alert raised earlier.
pub struct TrackCommand<'a> {
    config: &'a SosConfig,
}

impl<'a> TrackCommand<'a> {
    pub fn new(config: &'a SosConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self) -> Result<()> {
        let session = require_session(self.config)?;
        let controller = controller_for(self.config, session.client);
        controller.on_session_changed(Some(session.user));

        let Some(alert) = controller.current_alert() else {
            if let Some(error) = controller.last_error() {
                return Err(SosError::NetworkError(format!(
                    "could not check for an active alert: {error}"
                )));
            }
            return Err(SosError::NoActiveAlert);
        };

        if controller.state() != SosState::Active {
            if !controller.tracker().is_supported() {
                return Err(SosError::UnsupportedEnvironment);
            }
            return Err(SosError::LocationUnavailable(
                controller
                    .last_error()
                    .unwrap_or_else(|| "location watch did not start".to_string()),
            ));
        }

        print_alert(&alert);
        println!();
        println!("Sharing your location. Press Ctrl-C to stop sharing (the alert stays active).");
        follow(
            &controller,
            self.config.alert.refresh_interval(),
            &global_token(),
        );
        Ok(())
    }
}
