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

use crate::error::SosError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a SosError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a SosError) -> Self {
        let (suggestion, details) = match error {
            SosError::NotAuthenticated => {
                let suggestion =
                    Some("Run 'sosguard login --email <address>' and try again.".to_string());
                (suggestion, None)
            }
            SosError::UnsupportedEnvironment => {
                let suggestion = Some(
                    "Configure a position source in config.toml, for example:\n[location]\n\
                     source = \"command\"\ncommand = [\"termux-location\", \"-p\", \"gps\"]"
                        .to_string(),
                );
                let details = Some("location.source is set to \"none\".".to_string());
                (suggestion, details)
            }
            SosError::LocationUnavailable(msg) => {
                let suggestion = Some(
                    "Make sure location permission is granted and the device has a position \
                     fix, then trigger again."
                        .to_string(),
                );
                let details = Some(format!("Position source reported: {msg}"));
                (suggestion, details)
            }
            SosError::AlertCreationFailed(msg) => {
                let suggestion = Some(
                    "Run 'sosguard status' to see whether an alert is active. Otherwise trigger \
                     again, or contact emergency services directly \
                     if the service stays unreachable."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            SosError::NoActiveAlert => {
                let suggestion =
                    Some("Run 'sosguard status' to check the alert state on the server.".to_string());
                (suggestion, None)
            }
            SosError::CancellationFailed(msg) => {
                let suggestion = Some(
                    "The alert is still active and location sharing continues. Run 'sosguard \
                     cancel' again once the connection is back."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            SosError::OperationInProgress => {
                let suggestion =
                    Some("Wait for the running trigger or cancel request to finish.".to_string());
                (suggestion, None)
            }
            SosError::NetworkError(msg) => {
                let suggestion = Some(
                    "Check your internet connection and the api.base_url setting.".to_string(),
                );
                let details = Some(format!("Network issue: {msg}"));
                (suggestion, details)
            }
            SosError::Api { status, .. } => {
                let suggestion = match status {
                    401 | 403 => Some(
                        "Your session has expired. Run 'sosguard login' again.".to_string(),
                    ),
                    404 => Some(
                        "The alert service endpoint was not found. Check api.base_url."
                            .to_string(),
                    ),
                    500..=599 => {
                        Some("The alert service is having trouble. Try again shortly.".to_string())
                    }
                    _ => None,
                };
                (suggestion, None)
            }
            SosError::Http(http_err) => {
                let error_string = http_err.to_string();
                let suggestion = if error_string.contains("timeout")
                    || error_string.contains("Timeout")
                {
                    Some("Increase api.timeout_secs or check your connection.".to_string())
                } else {
                    Some("Check your internet connection and try again.".to_string())
                };
                let details = Some(format!("HTTP error: {http_err}"));
                (suggestion, details)
            }
            SosError::ConfigError(msg) => {
                let suggestion = Some(
                    "Fix config.toml in your sosguard home, or the SOSGUARD_* environment \
                     variables."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            SosError::Io(io_err) => {
                let suggestion = match io_err.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check permissions on the sosguard home directory.".to_string())
                    }
                    std::io::ErrorKind::NotFound => Some(
                        "Ensure the file or directory exists and the path is correct.".to_string(),
                    ),
                    _ => None,
                };
                let details = Some(format!("I/O error: {io_err}"));
                (suggestion, details)
            }
            _ => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
