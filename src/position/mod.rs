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

//! Position sources and the location tracker built on top of them.
//!
//! A [`PositionSource`] is the device capability: one-shot fixes and
//! continuous watches that emit into a channel. [`LocationTracker`] wraps a
//! source (or the lack of one) with a bounded one-shot fetch and cancellable
//! watches identified by a [`TrackingHandle`].

pub mod command;
pub mod factory;
pub mod fixed;
pub mod polling;
pub mod tracker;

pub use command::CommandPositionSource;
pub use factory::{create_position_source, position_options};
pub use fixed::FixedPositionSource;
pub use tracker::{LocationTracker, TrackerStatus, TrackingHandle};

use crate::models::PositionSample;
use std::sync::mpsc::Sender;
use std::time::Duration;
use thiserror::Error;

/// Upper bound for a one-shot fix.
pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure reported by a position source for a single sampling attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositionError {
    #[error("location permission denied: {0}")]
    PermissionDenied(String),

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("timed out after {}s waiting for a position fix", .0.as_secs())]
    Timeout(Duration),
}

/// One event on a watch channel.
pub type PositionEvent = std::result::Result<PositionSample, PositionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix a source may hand back. Zero means always sample afresh.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_FIX_TIMEOUT,
            maximum_age: Duration::ZERO,
        }
    }
}

/// Source-assigned identifier of a running watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Device positioning capability.
pub trait PositionSource: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// Produce a single fresh sample, honouring `options`
    fn request_once(&self, options: &PositionOptions) -> PositionEvent;

    /// Start emitting samples and sampling errors into `sink` until cancelled.
    /// Events must be sent in the order they are produced.
    fn watch(
        &self,
        options: &PositionOptions,
        sink: Sender<PositionEvent>,
    ) -> std::result::Result<WatchId, PositionError>;

    /// Stop a watch. Unknown or already-cancelled ids are ignored.
    fn cancel_watch(&self, id: WatchId);
}
