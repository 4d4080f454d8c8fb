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

use crate::config::SosConfig;
use crate::error::Result;
use crate::session::SessionStore;

pub struct LogoutCommand<'a> {
    config: &'a SosConfig,
}

impl<'a> LogoutCommand<'a> {
    pub fn new(config: &'a SosConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self) -> Result<()> {
        let store = SessionStore::new(&self.config.home);
        if store.clear()? {
            println!("Signed out.");
        } else {
            println!("Not signed in.");
        }
        Ok(())
    }
}
