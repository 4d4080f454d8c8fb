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

use crate::api::AlertApiClient;
use crate::models::User;
use crate::session::SessionProvider;
use crate::session::store::SessionStore;
use log::{debug, warn};

/// Resolves the stored token against `GET /me`.
pub struct ApiSessionProvider {
    client: AlertApiClient,
    store: SessionStore,
}

impl ApiSessionProvider {
    /// `client` must not carry a token; the stored one is attached per lookup.
    pub fn new(client: AlertApiClient, store: SessionStore) -> Self {
        Self { client, store }
    }

    /// The API client authorised with the stored token, if there is one.
    pub fn authorized_client(&self) -> Option<AlertApiClient> {
        match self.store.load() {
            Ok(session) => session.map(|session| self.client.clone().with_token(session.token)),
            Err(e) => {
                warn!("Ignoring unreadable session: {e}");
                None
            }
        }
    }
}

impl SessionProvider for ApiSessionProvider {
    fn current_user(&self) -> Option<User> {
        let client = self.authorized_client()?;

        match client.current_user() {
            Ok(user) => {
                debug!("Session resolved to user {}", user.id);
                Some(user)
            }
            Err(e) if e.is_auth_rejection() => {
                warn!("Stored session was rejected by the alert service: {e}");
                if let Err(clear_err) = self.store.clear() {
                    warn!("Failed to clear rejected session: {clear_err}");
                }
                None
            }
            Err(e) => {
                warn!("Could not resolve the current user: {e}");
                None
            }
        }
    }
}
