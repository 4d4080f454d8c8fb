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
use crate::api::models::{
    AlertResponse, CancelAlertRequest, CreateAlertRequest, HeartbeatRequest, SignInRequest,
    SignInResponse, SignUpRequest,
};
use crate::config::SosConfig;
use crate::error::{Result, SosError};
use crate::models::{AlertRecord, HeartbeatOrigin, PositionSample, User};
use crate::user_agent;
use attohttpc::body::Body;
use attohttpc::{RequestBuilder, Response, Session};
use log::{debug, trace, warn};
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_TIMEOUT: u64 = 15;

const ACTIVE_ALERT_PATH: &str = "/api/sos/active";
const CREATE_ALERT_PATH: &str = "/api/sos";
const CANCEL_ALERT_PATH: &str = "/api/sos/cancel";
const HEARTBEAT_PATH: &str = "/api/locations/heartbeat";
const ME_PATH: &str = "/me";
const SIGN_IN_PATH: &str = "/signin";
const SIGN_UP_PATH: &str = "/signup";

/// HTTP client for the alert service. Every call is a single attempt.
#[derive(Debug, Clone)]
pub struct AlertApiClient {
    session: Session,
    pub(crate) base_url: String,
    token: Option<String>,
}

impl AlertApiClient {
    pub fn new(base_url: String) -> Self {
        let mut session = Session::new();
        session.header("User-Agent", user_agent::alert_client());
        session.header("Accept", "application/json");
        session.timeout(Duration::from_secs(DEFAULT_TIMEOUT));

        Self {
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn from_config(config: &SosConfig) -> Self {
        Self::new(config.api.base_url.clone()).with_timeout(config.api_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.session.timeout(timeout);
        self
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Resolve the identity behind the bearer token.
    pub fn current_user(&self) -> Result<User> {
        let url = self.url(ME_PATH);
        let response = self.send(self.authorized(self.session.get(&url)), &url)?;
        parse_json(response, ME_PATH)
    }

    /// Exchange credentials for a bearer token.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse> {
        let url = self.url(SIGN_IN_PATH);
        let request = self
            .session
            .post(&url)
            .header("User-Agent", user_agent::session_client())
            .json(&SignInRequest { email, password })?;
        debug!("Signing in as {email}");
        let response = self.send(request, &url)?;
        parse_json(response, SIGN_IN_PATH)
    }

    /// Register a new account. The service returns no token; sign in afterwards.
    pub fn sign_up(&self, account: &SignUpRequest<'_>) -> Result<()> {
        let url = self.url(SIGN_UP_PATH);
        let request = self
            .session
            .post(&url)
            .header("User-Agent", user_agent::session_client())
            .json(account)?;
        debug!("Registering {}", account.email);
        self.send(request, &url)?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send<B: Body>(&self, request: RequestBuilder<B>, url: &str) -> Result<Response> {
        debug!("API Request: {url}");

        let response = request
            .send()
            .map_err(|e| SosError::NetworkError(format!("cannot reach {url}: {e}")))?;

        if !response.is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            trace!("Error body from {url}: {body}");
            return Err(SosError::Api {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }

        Ok(response)
    }
}

fn parse_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
    let body = response.text()?;
    trace!("Response from {path}: {body}");
    serde_json::from_str(&body).map_err(|e| {
        debug!("Failed to parse response from {path}: {e}");
        SosError::Json(e)
    })
}

/// Pull a human message out of an error body like `{"message": "..."}`.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

impl RemoteAlertService for AlertApiClient {
    fn active_alert(&self, user_id: &str) -> Result<Option<AlertRecord>> {
        debug!("Fetching active alert for user {user_id}");
        let url = self.url(ACTIVE_ALERT_PATH);
        let response = self.send(self.authorized(self.session.get(&url)), &url)?;

        let body = response.text()?;
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let alert: Option<AlertResponse> = serde_json::from_str(trimmed)?;
        Ok(alert
            .map(AlertRecord::from)
            .filter(|alert| alert.is_active()))
    }

    fn create_alert(&self, notes: Option<&str>) -> Result<AlertRecord> {
        let url = self.url(CREATE_ALERT_PATH);
        let request = self
            .authorized(self.session.post(&url))
            .json(&CreateAlertRequest { notes })?;
        let response = self.send(request, &url)?;
        let alert: AlertResponse = parse_json(response, CREATE_ALERT_PATH).map_err(|e| {
            warn!(
                "Alert service accepted the SOS but its reply was unreadable ({e}); \
                 the alert may already be active"
            );
            SosError::AlertCreationFailed(format!(
                "reply to {CREATE_ALERT_PATH} was unreadable, the alert may already be active: {e}"
            ))
        })?;
        Ok(alert.into())
    }

    fn cancel_alert(&self, alert_id: &str, reason: &str) -> Result<()> {
        let url = self.url(CANCEL_ALERT_PATH);
        let request = self
            .authorized(self.session.post(&url))
            .json(&CancelAlertRequest {
                sos_id: alert_id,
                reason,
            })?;
        self.send(request, &url)?;
        Ok(())
    }

    fn send_heartbeat(&self, sample: &PositionSample, origin: HeartbeatOrigin) -> Result<()> {
        let url = self.url(HEARTBEAT_PATH);
        let request = self
            .authorized(self.session.post(&url))
            .json(&HeartbeatRequest::new(sample, origin))?;
        self.send(request, &url)?;
        Ok(())
    }
}

impl Default for AlertApiClient {
    fn default() -> Self {
        Self::new(crate::config::ApiConfig::default().base_url)
    }
}
