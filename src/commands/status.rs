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

use crate::alert::RemoteAlertService;
use crate::commands::context::{print_alert, require_session};
use crate::config::SosConfig;
use crate::error::Result;
use crate::models::AlertRecord;
use serde::Serialize;

#[derive(Serialize)]
struct StatusOutput<'a> {
    user: &'a str,
    active: bool,
    alert: Option<&'a AlertRecord>,
    map_url: Option<String>,
}

/// Show the alert the service currently reports as active.
pub struct StatusCommand<'a> {
    config: &'a SosConfig,
}

impl<'a> StatusCommand<'a> {
    pub fn new(config: &'a SosConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, json: bool) -> Result<()> {
        let session = require_session(self.config)?;
        let alert = session.client.active_alert(&session.user.id)?;

        if json {
            let output = StatusOutput {
                user: &session.user.email,
                active: alert.is_some(),
                alert: alert.as_ref(),
                map_url: alert.as_ref().and_then(AlertRecord::map_url),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Signed in as {} <{}>", session.user.name, session.user.email);
        match &alert {
            Some(alert) => print_alert(alert),
            None => println!("No active SOS alert."),
        }
        Ok(())
    }
}
