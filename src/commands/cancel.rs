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

use crate::commands::context::{controller_for, require_session};
use crate::config::SosConfig;
use crate::error::{Result, SosError};
use colored::Colorize;

pub struct CancelCommand<'a> {
    config: &'a SosConfig,
}

impl<'a> CancelCommand<'a> {
    pub fn new(config: &'a SosConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self) -> Result<()> {
        let session = require_session(self.config)?;
        let controller = controller_for(self.config, session.client);
        controller.on_session_changed(Some(session.user));

        let Some(alert) = controller.current_alert() else {
            // Reconciliation fails open; do not report "nothing to cancel"
            // when the service could not be asked.
            if let Some(error) = controller.last_error() {
                return Err(SosError::CancellationFailed(format!(
                    "could not check for an active alert: {error}"
                )));
            }
            return Err(SosError::NoActiveAlert);
        };

        controller.cancel()?;
        controller.shutdown();

        println!("{} Alert {} cancelled.", "✓".green().bold(), alert.id);
        println!("Glad you are safe.");
        Ok(())
    }
}
