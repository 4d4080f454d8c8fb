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

pub fn get_exit_code(error: &SosError) -> i32 {
    match error {
        SosError::ConfigError(_) | SosError::InvalidSample(_) => 2,

        SosError::NotAuthenticated | SosError::SessionError(_) => 13,

        SosError::Api { status: 401 | 403, .. } => 13,

        SosError::NetworkError(_) | SosError::Http(_) | SosError::Api { .. } => 20,

        SosError::LocationUnavailable(_) | SosError::UnsupportedEnvironment => 21,

        SosError::AlertCreationFailed(_) => 22,

        SosError::CancellationFailed(_) => 23,

        SosError::NoActiveAlert => 24,

        SosError::OperationInProgress => 75, // EX_TEMPFAIL

        _ => 1,
    }
}
