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

use crate::position::{PositionEvent, WatchId};
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Runs one sampling thread per watch, calling a sampler every `interval`.
///
/// Each watch owns a stop channel; cancelling drops the sender, which wakes
/// the thread out of its interval wait immediately.
#[derive(Debug, Default)]
pub struct PollingWatches {
    next_id: AtomicU64,
    stops: Mutex<HashMap<WatchId, Sender<()>>>,
}

impl PollingWatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(
        &self,
        label: &str,
        interval: Duration,
        sink: Sender<PositionEvent>,
        sample: F,
    ) -> std::io::Result<WatchId>
    where
        F: Fn() -> PositionEvent + Send + 'static,
    {
        let id = WatchId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name(format!("{label}-watch-{}", id.0))
            .spawn(move || {
                loop {
                    let event = sample();

                    match stop_rx.try_recv() {
                        Err(TryRecvError::Empty) => {}
                        _ => break,
                    }

                    if sink.send(event).is_err() {
                        trace!("Watch {} receiver dropped", id.0);
                        break;
                    }

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        _ => break,
                    }
                }
                debug!("Watch {} stopped", id.0);
            })?;

        self.stops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, stop_tx);
        Ok(id)
    }

    pub fn cancel(&self, id: WatchId) {
        let removed = self
            .stops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_none() {
            trace!("Ignoring cancel for unknown watch {}", id.0);
        }
    }

    pub fn active(&self) -> usize {
        self.stops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for PollingWatches {
    fn drop(&mut self) {
        let stops = self.stops.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !stops.is_empty() {
            warn!("Stopping {} watch(es) still running at shutdown", stops.len());
        }
        stops.clear();
    }
}
