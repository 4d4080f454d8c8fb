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

//! Shared fakes for unit tests: a hand-driven position source and a
//! recording alert service.

use crate::alert::RemoteAlertService;
use crate::error::{Result, SosError};
use crate::models::{AlertRecord, AlertStatus, HeartbeatOrigin, PositionSample};
use crate::position::{PositionError, PositionEvent, PositionOptions, PositionSource, WatchId};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

/// The fix returned by [`ManualPositionSource::request_once`] when nothing is queued.
pub const DEFAULT_FIX: PositionSample = PositionSample {
    latitude: 12.9,
    longitude: 77.6,
    accuracy_meters: 5.0,
};

/// Creates an active alert as the service would report it
pub fn create_test_alert(id: &str) -> AlertRecord {
    AlertRecord {
        id: id.to_string(),
        status: AlertStatus::Active,
        created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
        initial_location: Some(DEFAULT_FIX),
        current_location: None,
        notes: None,
    }
}

/// Poll `condition` for up to two seconds.
pub fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Position source driven by the test: queued one-shot results and
/// explicit `emit` calls for watches.
#[derive(Default)]
pub struct ManualPositionSource {
    once: Mutex<VecDeque<PositionEvent>>,
    once_delay: Mutex<Duration>,
    last_options: Mutex<Option<PositionOptions>>,
    requests: AtomicU64,
    next_watch: AtomicU64,
    watches: Mutex<HashMap<WatchId, Sender<PositionEvent>>>,
    cancelled: Mutex<Vec<WatchId>>,
    refuse_watch: Mutex<Option<PositionError>>,
}

impl ManualPositionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_once(&self, event: PositionEvent) {
        lock(&self.once).push_back(event);
    }

    pub fn set_once_delay(&self, delay: Duration) {
        *lock(&self.once_delay) = delay;
    }

    pub fn fail_next_watch(&self, error: PositionError) {
        *lock(&self.refuse_watch) = Some(error);
    }

    /// Send an event to every running watch; returns how many received it.
    pub fn emit(&self, event: PositionEvent) -> usize {
        lock(&self.watches)
            .values()
            .filter(|sink| sink.send(event.clone()).is_ok())
            .count()
    }

    pub fn active_watches(&self) -> usize {
        lock(&self.watches).len()
    }

    pub fn cancelled(&self) -> Vec<WatchId> {
        lock(&self.cancelled).clone()
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<PositionOptions> {
        *lock(&self.last_options)
    }
}

impl PositionSource for ManualPositionSource {
    fn name(&self) -> &str {
        "manual"
    }

    fn request_once(&self, options: &PositionOptions) -> PositionEvent {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_options) = Some(*options);

        let delay = *lock(&self.once_delay);
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        lock(&self.once).pop_front().unwrap_or(Ok(DEFAULT_FIX))
    }

    fn watch(
        &self,
        _options: &PositionOptions,
        sink: Sender<PositionEvent>,
    ) -> std::result::Result<WatchId, PositionError> {
        if let Some(error) = lock(&self.refuse_watch).take() {
            return Err(error);
        }
        let id = WatchId(self.next_watch.fetch_add(1, Ordering::SeqCst) + 1);
        lock(&self.watches).insert(id, sink);
        Ok(id)
    }

    fn cancel_watch(&self, id: WatchId) {
        if lock(&self.watches).remove(&id).is_some() {
            lock(&self.cancelled).push(id);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    ActiveAlert(String),
    CreateAlert(Option<String>),
    CancelAlert { alert_id: String, reason: String },
    Heartbeat {
        sample: PositionSample,
        origin: HeartbeatOrigin,
    },
}

/// In-memory alert service that records every call.
#[derive(Default)]
pub struct RecordingAlertService {
    calls: Mutex<Vec<ServiceCall>>,
    active: Mutex<Option<AlertRecord>>,
    next_alert: Mutex<Option<AlertRecord>>,
    create_delay: Mutex<Duration>,
    heartbeat_delay: Mutex<Duration>,
    heartbeats_finished: AtomicU64,
    fail_active: AtomicBool,
    fail_create: AtomicBool,
    fail_cancel: AtomicBool,
    fail_heartbeat: AtomicBool,
}

impl RecordingAlertService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend an alert is already active on the server.
    pub fn with_active(alert: AlertRecord) -> Self {
        let service = Self::new();
        *lock(&service.active) = Some(alert);
        service
    }

    pub fn set_active(&self, alert: Option<AlertRecord>) {
        *lock(&self.active) = alert;
    }

    pub fn server_active(&self) -> Option<AlertRecord> {
        lock(&self.active).clone()
    }

    /// Record returned by the next successful create; defaults to alert "a1".
    pub fn set_next_alert(&self, alert: AlertRecord) {
        *lock(&self.next_alert) = Some(alert);
    }

    pub fn set_create_delay(&self, delay: Duration) {
        *lock(&self.create_delay) = delay;
    }

    /// Hold every heartbeat call for `delay` after recording it.
    pub fn set_heartbeat_delay(&self, delay: Duration) {
        *lock(&self.heartbeat_delay) = delay;
    }

    /// Heartbeat calls that have returned, successfully or not.
    pub fn heartbeats_finished(&self) -> u64 {
        self.heartbeats_finished.load(Ordering::SeqCst)
    }

    pub fn fail_active(&self, fail: bool) {
        self.fail_active.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_cancel(&self, fail: bool) {
        self.fail_cancel.store(fail, Ordering::SeqCst);
    }

    pub fn fail_heartbeat(&self, fail: bool) {
        self.fail_heartbeat.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        lock(&self.calls).clone()
    }

    pub fn heartbeats(&self) -> Vec<(PositionSample, HeartbeatOrigin)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ServiceCall::Heartbeat { sample, origin } => Some((sample, origin)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ServiceCall) {
        lock(&self.calls).push(call);
    }

    fn unavailable() -> SosError {
        SosError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        }
    }
}

impl RemoteAlertService for RecordingAlertService {
    fn active_alert(&self, user_id: &str) -> Result<Option<AlertRecord>> {
        self.record(ServiceCall::ActiveAlert(user_id.to_string()));
        if self.fail_active.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.server_active())
    }

    fn create_alert(&self, notes: Option<&str>) -> Result<AlertRecord> {
        self.record(ServiceCall::CreateAlert(notes.map(str::to_string)));

        let delay = *lock(&self.create_delay);
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut alert = lock(&self.next_alert)
            .take()
            .unwrap_or_else(|| create_test_alert("a1"));
        if alert.notes.is_none() {
            alert.notes = notes.map(str::to_string);
        }
        *lock(&self.active) = Some(alert.clone());
        Ok(alert)
    }

    fn cancel_alert(&self, alert_id: &str, reason: &str) -> Result<()> {
        self.record(ServiceCall::CancelAlert {
            alert_id: alert_id.to_string(),
            reason: reason.to_string(),
        });
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        *lock(&self.active) = None;
        Ok(())
    }

    fn send_heartbeat(&self, sample: &PositionSample, origin: HeartbeatOrigin) -> Result<()> {
        self.record(ServiceCall::Heartbeat {
            sample: *sample,
            origin,
        });

        let delay = *lock(&self.heartbeat_delay);
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let result = if self.fail_heartbeat.load(Ordering::SeqCst) {
            Err(Self::unavailable())
        } else {
            Ok(())
        };
        self.heartbeats_finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_service_tracks_active_alert() {
        let service = RecordingAlertService::new();

        let created = service.create_alert(Some("help")).unwrap();
        assert_eq!(created.id, "a1");
        assert_eq!(created.notes.as_deref(), Some("help"));
        assert_eq!(service.active_alert("u1").unwrap(), Some(created));

        service.cancel_alert("a1", "user safe").unwrap();
        assert_eq!(service.active_alert("u1").unwrap(), None);
        assert_eq!(service.calls().len(), 4);
    }

    #[test]
    fn test_manual_source_emits_to_watches() {
        let source = ManualPositionSource::new();
        let (tx, rx) = std::sync::mpsc::channel();

        let id = source.watch(&PositionOptions::default(), tx).unwrap();
        assert_eq!(source.emit(Ok(DEFAULT_FIX)), 1);
        assert_eq!(rx.recv().unwrap(), Ok(DEFAULT_FIX));

        source.cancel_watch(id);
        source.cancel_watch(id);
        assert_eq!(source.cancelled(), vec![id]);
        assert_eq!(source.emit(Ok(DEFAULT_FIX)), 0);
    }
}
