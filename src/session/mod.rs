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

//! Where the signed-in identity comes from.
//!
//! The SOS core only needs to know whether a user is present. The CLI backs
//! that with a token persisted in the sosguard home and resolved against the
//! alert service; embedders and tests can hand in a fixed identity instead.

pub mod provider;
pub mod store;

pub use provider::ApiSessionProvider;
pub use store::{SessionStore, StoredSession};

use crate::models::User;

pub trait SessionProvider: Send + Sync {
    /// The authenticated user, or `None` when nobody is signed in
    fn current_user(&self) -> Option<User>;
}

/// A session whose identity never changes.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<User>,
}

impl StaticSession {
    pub fn new(user: Option<User>) -> Self {
        Self { user }
    }

    pub fn signed_in(user: User) -> Self {
        Self::new(Some(user))
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<User> {
        self.user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_session() {
        let user = User {
            id: "u1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
        };

        assert_eq!(StaticSession::signed_in(user.clone()).current_user(), Some(user));
        assert!(StaticSession::anonymous().current_user().is_none());
        assert!(StaticSession::default().current_user().is_none());
    }
}
