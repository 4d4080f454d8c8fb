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

//! The SOS alert lifecycle.
//!
//! [`SosController`] owns the locally known alert and the single location
//! watch that feeds it. It reconciles with the alert service when a session
//! appears, raises and cancels alerts on request, and forwards every watched
//! sample to the service as an automatic heartbeat.
//!
//! The controller is never observed `Active` without a running watch, and
//! never holds a watch while `Idle`. A failed trigger or cancel leaves the
//! state it started from.

pub mod controller;
pub mod state;


pub use controller::{HeartbeatStats, SosController};
pub use state::SosState;
