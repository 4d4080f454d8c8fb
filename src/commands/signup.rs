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

use crate::api::{AlertApiClient, SignUpRequest};
use crate::commands::login::{prompt_password, store_session};
use crate::config::SosConfig;
use crate::error::{Result, SosError};
use log::info;

pub struct SignupCommand<'a> {
    config: &'a SosConfig,
}

impl<'a> SignupCommand<'a> {
    pub fn new(config: &'a SosConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// Register the account, then sign in with the same credentials.
    pub fn execute(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password_stdin: bool,
    ) -> Result<()> {
        let name = required("name", name)?;
        let email = required("email", email)?;
        let phone = phone.map(str::trim).filter(|phone| !phone.is_empty());
        let password = prompt_password(email, password_stdin)?;

        let client = AlertApiClient::from_config(self.config);
        client.sign_up(&SignUpRequest {
            name,
            email,
            password: &password,
            phone,
        })?;
        info!("Registered {email}");

        let response = client.sign_in(email, &password)?;
        store_session(self.config, response)
    }
}

fn required<'v>(field: &str, value: &'v str) -> Result<&'v str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SosError::SessionError(format!("{field} must not be empty")));
    }
    Ok(value)
}
