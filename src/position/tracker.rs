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

use crate::error::{Result, SosError};
use crate::models::PositionSample;
use crate::position::{PositionError, PositionEvent, PositionOptions, PositionSource, WatchId};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

const UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported on this device";

/// Opaque token identifying one continuous watch started by a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackingHandle(u64);

impl fmt::Display for TrackingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch#{}", self.0)
    }
}

/// Most recent sample and error, for display only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerStatus {
    pub last_sample: Option<PositionSample>,
    pub last_error: Option<String>,
    pub loading: bool,
}

struct ActiveWatch {
    watch_id: WatchId,
    stopped: Arc<AtomicBool>,
}

/// Wraps a position source with a bounded one-shot fetch and cancellable watches.
pub struct LocationTracker {
    source: Option<Arc<dyn PositionSource>>,
    options: PositionOptions,
    status: Arc<Mutex<TrackerStatus>>,
    watches: Mutex<HashMap<TrackingHandle, ActiveWatch>>,
    next_handle: AtomicU64,
}

impl LocationTracker {
    pub fn new(source: Option<Arc<dyn PositionSource>>, options: PositionOptions) -> Self {
        Self {
            source,
            options,
            status: Arc::new(Mutex::new(TrackerStatus::default())),
            watches: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(0),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.source.is_some()
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    pub fn status(&self) -> TrackerStatus {
        lock(&self.status).clone()
    }

    /// Request one fresh sample, failing once `options.timeout` has elapsed.
    pub fn fetch_once(&self) -> Result<PositionSample> {
        let Some(source) = self.source.as_ref().map(Arc::clone) else {
            record_error(&self.status, UNSUPPORTED_MESSAGE.to_string());
            return Err(SosError::UnsupportedEnvironment);
        };

        lock(&self.status).loading = true;

        let (tx, rx) = mpsc::channel();
        let options = self.options;
        let spawned = thread::Builder::new()
            .name("sosguard-fix".to_string())
            .spawn(move || {
                // The receiver is gone if the caller already gave up.
                let _ = tx.send(source.request_once(&options));
            });

        let outcome = match spawned {
            Err(e) => Err(format!("failed to start position request: {e}")),
            Ok(_) => match rx.recv_timeout(self.options.timeout) {
                Ok(event) => checked(event).map_err(|e| e.to_string()),
                Err(RecvTimeoutError::Timeout) => {
                    Err(PositionError::Timeout(self.options.timeout).to_string())
                }
                Err(RecvTimeoutError::Disconnected) => {
                    Err("position source stopped without a result".to_string())
                }
            },
        };

        let mut status = lock(&self.status);
        status.loading = false;
        match outcome {
            Ok(sample) => {
                status.last_sample = Some(sample);
                status.last_error = None;
                Ok(sample)
            }
            Err(message) => {
                warn!("One-shot position fix failed: {message}");
                status.last_error = Some(message.clone());
                Err(SosError::LocationUnavailable(message))
            }
        }
    }

    /// Begin continuous sampling, calling `on_sample` once per successful
    /// sample in source order.
    ///
    /// Returns `None` without starting anything when the device has no
    /// position source or the source refuses the watch; the reason is kept
    /// in [`TrackerStatus::last_error`]. Sampling errors after a successful
    /// start are recorded there too and never stop the watch.
    pub fn start_watch<F>(&self, on_sample: F) -> Option<TrackingHandle>
    where
        F: FnMut(PositionSample) + Send + 'static,
    {
        let Some(source) = self.source.as_ref() else {
            record_error(&self.status, UNSUPPORTED_MESSAGE.to_string());
            return None;
        };

        let (tx, rx) = mpsc::channel::<PositionEvent>();
        let watch_id = match source.watch(&self.options, tx) {
            Ok(id) => id,
            Err(e) => {
                warn!("{} source refused to start a watch: {e}", source.name());
                record_error(&self.status, e.to_string());
                return None;
            }
        };

        let handle = TrackingHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let status = Arc::clone(&self.status);
        let mut on_sample = on_sample;

        let spawned = thread::Builder::new()
            .name(format!("sosguard-{handle}"))
            .spawn(move || {
                for event in rx {
                    if flag.load(Ordering::SeqCst) {
                        break;
                    }
                    match checked(event) {
                        Ok(sample) => {
                            {
                                let mut status = lock(&status);
                                status.last_sample = Some(sample);
                                status.last_error = None;
                            }
                            on_sample(sample);
                        }
                        Err(e) => {
                            warn!("Position watch error: {e}");
                            record_error(&status, e.to_string());
                        }
                    }
                }
                debug!("{handle} consumer finished");
            });

        if let Err(e) = spawned {
            source.cancel_watch(watch_id);
            record_error(&self.status, format!("failed to start watch consumer: {e}"));
            return None;
        }

        lock(&self.watches).insert(handle, ActiveWatch { watch_id, stopped });
        debug!("Started {handle} on {} source", source.name());
        Some(handle)
    }

    /// Stop a watch. Unknown or already-stopped handles are ignored.
    ///
    /// Returns immediately; a callback already running finishes on its own.
    pub fn stop_watch(&self, handle: TrackingHandle) {
        let Some(active) = lock(&self.watches).remove(&handle) else {
            debug!("{handle} is not running");
            return;
        };

        active.stopped.store(true, Ordering::SeqCst);
        if let Some(source) = &self.source {
            source.cancel_watch(active.watch_id);
        }
        debug!("Stopped {handle}");
    }

    pub fn is_watching(&self, handle: TrackingHandle) -> bool {
        lock(&self.watches).contains_key(&handle)
    }

    pub fn active_watches(&self) -> usize {
        lock(&self.watches).len()
    }
}

impl Drop for LocationTracker {
    fn drop(&mut self) {
        let handles: Vec<TrackingHandle> = lock(&self.watches).keys().copied().collect();
        for handle in handles {
            self.stop_watch(handle);
        }
    }
}

fn checked(event: PositionEvent) -> std::result::Result<PositionSample, PositionError> {
    let sample = event?;
    sample
        .validate()
        .map_err(|e| PositionError::Unavailable(e.to_string()))?;
    Ok(sample)
}

fn record_error(status: &Mutex<TrackerStatus>, message: String) {
    lock(status).last_error = Some(message);
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
