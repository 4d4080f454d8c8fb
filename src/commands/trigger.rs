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
use crate::error::Result;
use colored::Colorize;
use log::info;

pub struct TriggerCommand<'a> {
    config: &'a SosConfig,
}

impl<'a> TriggerCommand<'a> {
    pub fn new(config: &'a SosConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, notes: Option<&str>, detach: bool) -> Result<()> {
        let session = require_session(self.config)?;
        let controller = controller_for(self.config, session.client);
        controller.on_session_changed(Some(session.user));

        if let Some(existing) = controller.current_alert() {
            info!("Alert {} is already active; asking the service again", existing.id);
        }

        let notes = notes.map(str::trim).filter(|notes| !notes.is_empty());
        let alert = controller.trigger(notes)?;

        println!("{}", "SOS raised. Help has been notified.".red().bold());
        print_alert(&alert);

        if detach {
            controller.shutdown();
            println!();
            println!("Location is not being shared. Run 'sosguard track' to share it.");
            return Ok(());
        }

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
