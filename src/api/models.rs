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

//! Request and response bodies of the alert service.

use crate::models::{AlertRecord, AlertStatus, HeartbeatOrigin, PositionSample, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub status: AlertStatus,
    #[serde(rename = "createdAt", alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub initial_latitude: Option<f64>,
    #[serde(default)]
    pub initial_longitude: Option<f64>,
    #[serde(default)]
    pub initial_accuracy: Option<f64>,
    #[serde(default)]
    pub current_latitude: Option<f64>,
    #[serde(default)]
    pub current_longitude: Option<f64>,
    #[serde(default)]
    pub current_accuracy: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn location(
    latitude: Option<f64>,
    longitude: Option<f64>,
    accuracy: Option<f64>,
) -> Option<PositionSample> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(PositionSample::new(
            latitude,
            longitude,
            accuracy.unwrap_or(0.0),
        )),
        _ => None,
    }
}

impl From<AlertResponse> for AlertRecord {
    fn from(response: AlertResponse) -> Self {
        AlertRecord {
            id: response.id,
            status: response.status,
            created_at: response.created_at,
            initial_location: location(
                response.initial_latitude,
                response.initial_longitude,
                response.initial_accuracy,
            ),
            current_location: location(
                response.current_latitude,
                response.current_longitude,
                response.current_accuracy,
            ),
            notes: response.notes.filter(|notes| !notes.trim().is_empty()),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAlertRequest<'a> {
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelAlertRequest<'a> {
    #[serde(rename = "sosId")]
    pub sos_id: &'a str,
    pub reason: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatRequest {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: f64,
    pub source: HeartbeatOrigin,
}

impl HeartbeatRequest {
    pub fn new(sample: &PositionSample, origin: HeartbeatOrigin) -> Self {
        Self {
            lat: sample.latitude,
            lng: sample.longitude,
            accuracy: sample.accuracy_meters,
            source: origin,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: User,
}
