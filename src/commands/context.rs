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
use crate::config::SosConfig;
use crate::error::{Result, SosError};
use crate::models::{AlertRecord, User};
use crate::position::{LocationTracker, create_position_source, position_options};
use crate::session::{ApiSessionProvider, SessionProvider, SessionStore};
use crate::sos::SosController;
use colored::Colorize;
use log::warn;
use std::sync::Arc;

pub(crate) struct SignedIn {
    pub user: User,
    pub client: AlertApiClient,
}

/// Resolve the stored session into a user and an authorised client.
pub(crate) fn require_session(config: &SosConfig) -> Result<SignedIn> {
    let store = SessionStore::new(&config.home);
    let provider = ApiSessionProvider::new(AlertApiClient::from_config(config), store.clone());

    let Some(client) = provider.authorized_client() else {
        return Err(SosError::NotAuthenticated);
    };
    if let Some(user) = provider.current_user() {
        return Ok(SignedIn { user, client });
    }

    // Rejected tokens are gone by now. One that survived could not be
    // checked, so keep working with the identity saved at login.
    match store.load()? {
        Some(stored) => {
            warn!(
                "Could not verify the session; continuing as {}",
                stored.user.email
            );
            Ok(SignedIn {
                user: stored.user,
                client,
            })
        }
        None => Err(SosError::NotAuthenticated),
    }
}

pub(crate) fn location_tracker(config: &SosConfig) -> LocationTracker {
    LocationTracker::new(
        create_position_source(&config.location),
        position_options(&config.location),
    )
}

pub(crate) fn controller_for(config: &SosConfig, client: AlertApiClient) -> SosController {
    SosController::new(location_tracker(config), Arc::new(client))
        .with_cancel_reason(config.alert.cancel_reason.clone())
}

pub(crate) fn print_alert(alert: &AlertRecord) {
    println!(
        "{} {} ({})",
        "SOS alert".red().bold(),
        alert.id.bold(),
        alert.status
    );
    println!(
        "  Raised:    {}",
        alert.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    match alert.display_location() {
        Some(location) => {
            println!("  Location:  {location}");
            println!("  Map:       {}", location.map_url());
        }
        None => println!("  Location:  not reported yet"),
    }
    if let Some(notes) = &alert.notes {
        println!("  Notes:     {notes}");
    }
}
