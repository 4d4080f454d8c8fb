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

use crate::models::PositionSample;
use crate::position::polling::PollingWatches;
use crate::position::{PositionError, PositionEvent, PositionOptions, PositionSource, WatchId};
use std::sync::mpsc::Sender;
use std::time::Duration;

/// Reports a configured coordinate, for stationary devices.
#[derive(Debug)]
pub struct FixedPositionSource {
    sample: PositionSample,
    interval: Duration,
    watches: PollingWatches,
}

impl FixedPositionSource {
    pub fn new(sample: PositionSample, interval: Duration) -> Self {
        Self {
            sample,
            interval,
            watches: PollingWatches::new(),
        }
    }
}

impl PositionSource for FixedPositionSource {
    fn name(&self) -> &str {
        "fixed"
    }

    fn request_once(&self, _options: &PositionOptions) -> PositionEvent {
        Ok(self.sample)
    }

    fn watch(
        &self,
        _options: &PositionOptions,
        sink: Sender<PositionEvent>,
    ) -> Result<WatchId, PositionError> {
        let sample = self.sample;
        self.watches
            .spawn("fixed", self.interval, sink, move || Ok(sample))
            .map_err(|e| PositionError::Unavailable(format!("failed to start watch: {e}")))
    }

    fn cancel_watch(&self, id: WatchId) {
        self.watches.cancel(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_request_once_returns_configured_sample() {
        let sample = PositionSample::new(12.9, 77.6, 5.0);
        let source = FixedPositionSource::new(sample, Duration::from_secs(1));

        assert_eq!(source.request_once(&PositionOptions::default()), Ok(sample));
        assert_eq!(source.name(), "fixed");
    }

    #[test]
    fn test_watch_repeats_sample() {
        let sample = PositionSample::new(12.9, 77.6, 5.0);
        let source = FixedPositionSource::new(sample, Duration::from_millis(10));
        let (tx, rx) = mpsc::channel();

        let id = source.watch(&PositionOptions::default(), tx).unwrap();
        for _ in 0..3 {
            assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), Ok(sample));
        }
        source.cancel_watch(id);
        source.cancel_watch(id);
    }
}
