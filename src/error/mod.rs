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

mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SosError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("No positioning capability is available")]
    UnsupportedEnvironment,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Failed to create SOS alert: {0}")]
    AlertCreationFailed(String),

    #[error("No active SOS alert")]
    NoActiveAlert,

    #[error("Failed to cancel SOS alert: {0}")]
    CancellationFailed(String),

    #[error("Failed to deliver location heartbeat: {0}")]
    HeartbeatFailed(String),

    #[error("Another SOS operation is already in progress")]
    OperationInProgress,

    #[error("Invalid position sample: {0}")]
    InvalidSample(String),

    #[error("Alert service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] attohttpc::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SosError {
    /// True for HTTP 401/403 responses from the alert service.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, SosError::Api { status: 401 | 403, .. })
    }
}

pub type Result<T> = std::result::Result<T, SosError>;
