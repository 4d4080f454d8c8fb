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

use crate::api::{AlertApiClient, SignInResponse};
use crate::config::SosConfig;
use crate::error::{Result, SosError};
use crate::paths::home::ensure_home;
use crate::session::{SessionStore, StoredSession};
use colored::Colorize;
use std::io::{self, BufRead, Write};

pub struct LoginCommand<'a> {
    config: &'a SosConfig,
}

impl<'a> LoginCommand<'a> {
    pub fn new(config: &'a SosConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, email: &str, password_stdin: bool) -> Result<()> {
        let password = prompt_password(email, password_stdin)?;

        let client = AlertApiClient::from_config(self.config);
        let response = client.sign_in(email, &password)?;
        store_session(self.config, response)
    }
}

/// Persist a fresh sign-in and report who is now signed in.
pub(super) fn store_session(config: &SosConfig, response: SignInResponse) -> Result<()> {
    ensure_home(&config.home)?;
    let store = SessionStore::new(&config.home);
    store.save(&StoredSession {
        token: response.token,
        user: response.user.clone(),
    })?;

    println!(
        "{} Signed in as {} <{}>",
        "✓".green().bold(),
        response.user.name,
        response.user.email
    );
    Ok(())
}

/// Prompt on stderr unless the password is piped in, then read one line.
pub(super) fn prompt_password(email: &str, password_stdin: bool) -> Result<String> {
    if !password_stdin {
        eprint!("Password for {email}: ");
        io::stderr().flush()?;
    }
    read_password(io::stdin().lock())
}

fn read_password<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(SosError::SessionError("Password must not be empty".to_string()));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_password_strips_newline() {
        let password = read_password(Cursor::new("s3cret pass\r\n")).unwrap();
        assert_eq!(password, "s3cret pass");
    }

    #[test]
    fn test_read_password_rejects_empty() {
        assert!(matches!(
            read_password(Cursor::new("\n")),
            Err(SosError::SessionError(_))
        ));
    }
}
