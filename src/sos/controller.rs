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

use crate::alert::RemoteAlertService;
use crate::error::{Result, SosError};
use crate::models::{AlertRecord, HeartbeatOrigin, PositionSample, User};
use crate::position::{LocationTracker, TrackingHandle};
use crate::sos::state::SosState;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

pub const DEFAULT_CANCEL_REASON: &str = "user safe";

/// Heartbeat delivery counters, for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartbeatStats {
    pub sent: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct HeartbeatCounters {
    sent: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Default)]
struct Inner {
    state: SosState,
    user: Option<User>,
    alert: Option<AlertRecord>,
    handle: Option<TrackingHandle>,
    last_error: Option<String>,
    // Bumped on every teardown so results of operations that straddle a
    // session change are dropped.
    epoch: u64,
}

/// Marks one trigger, cancel or reconciliation as in flight until dropped.
struct OperationGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> OperationGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Coordinates the alert service and the location tracker for one user.
pub struct SosController {
    tracker: LocationTracker,
    service: Arc<dyn RemoteAlertService>,
    cancel_reason: String,
    inner: Arc<Mutex<Inner>>,
    in_flight: AtomicBool,
    heartbeats: Arc<HeartbeatCounters>,
}

impl SosController {
    pub fn new(tracker: LocationTracker, service: Arc<dyn RemoteAlertService>) -> Self {
        Self {
            tracker,
            service,
            cancel_reason: DEFAULT_CANCEL_REASON.to_string(),
            inner: Arc::new(Mutex::new(Inner::default())),
            in_flight: AtomicBool::new(false),
            heartbeats: Arc::new(HeartbeatCounters::default()),
        }
    }

    pub fn with_cancel_reason(mut self, reason: impl Into<String>) -> Self {
        self.cancel_reason = reason.into();
        self
    }

    /// React to the session gaining, changing or losing its user.
    ///
    /// A present user is reconciled against the alert service. An absent
    /// one tears down tracking and forgets the local alert.
    pub fn on_session_changed(&self, user: Option<User>) {
        let Some(user) = user else {
            info!("Session ended");
            self.teardown();
            return;
        };

        let same_user = lock(&self.inner)
            .user
            .as_ref()
            .is_some_and(|current| current.id == user.id);
        if !same_user {
            self.teardown();
        }

        info!("Session established for user {}", user.id);
        lock(&self.inner).user = Some(user);
        self.refresh();
    }

    /// Align local state with the alert the service reports as active.
    ///
    /// Skipped while a trigger or cancel is in flight. Fetch failures are
    /// recorded in [`last_error`](Self::last_error) and never surface here.
    pub fn refresh(&self) {
        let Some(user) = lock(&self.inner).user.clone() else {
            debug!("No session user, nothing to reconcile");
            return;
        };
        let Some(_guard) = OperationGuard::acquire(&self.in_flight) else {
            info!("Reconciliation skipped: another SOS operation is in flight");
            return;
        };

        self.reconcile(&user);
    }

    /// Raise an SOS alert and start tracking it.
    ///
    /// Takes one fresh fix, reports it as a manual heartbeat (best effort),
    /// then asks the service to create the alert. Any failure leaves the
    /// state the call started from.
    pub fn trigger(&self, notes: Option<&str>) -> Result<AlertRecord> {
        let Some(user) = lock(&self.inner).user.clone() else {
            return Err(SosError::NotAuthenticated);
        };
        let Some(_guard) = OperationGuard::acquire(&self.in_flight) else {
            return Err(SosError::OperationInProgress);
        };
        let (epoch, previous) = self.begin(SosState::Transitioning);
        info!("Raising SOS for user {}", user.id);

        let sample = match self.tracker.fetch_once() {
            Ok(sample) => sample,
            Err(e) => return Err(self.abort(epoch, previous, e)),
        };
        debug!("Trigger fix: {sample}");

        if let Err(e) = deliver(
            self.service.as_ref(),
            &self.heartbeats,
            &sample,
            HeartbeatOrigin::Manual,
        ) {
            lock(&self.inner).last_error = Some(e.to_string());
        }

        let alert = match self.service.create_alert(notes) {
            Ok(alert) => alert,
            Err(e) => {
                let error = match e {
                    SosError::AlertCreationFailed(_) => e,
                    other => SosError::AlertCreationFailed(other.to_string()),
                };
                return Err(self.abort(epoch, previous, error));
            }
        };
        info!("Alert {} created", alert.id);

        self.adopt(epoch, alert.clone());
        Ok(alert)
    }

    /// Cancel the held alert with the configured reason and stop tracking.
    ///
    /// On failure the alert stays held and the watch keeps running.
    pub fn cancel(&self) -> Result<()> {
        if lock(&self.inner).alert.is_none() {
            return Err(SosError::NoActiveAlert);
        }
        let Some(_guard) = OperationGuard::acquire(&self.in_flight) else {
            return Err(SosError::OperationInProgress);
        };

        let (epoch, previous, alert_id) = {
            let mut inner = lock(&self.inner);
            let Some(alert_id) = inner.alert.as_ref().map(|alert| alert.id.clone()) else {
                return Err(SosError::NoActiveAlert);
            };
            let previous = inner.state;
            inner.state = SosState::Transitioning;
            (inner.epoch, previous, alert_id)
        };
        info!("Cancelling alert {alert_id}");

        if let Err(e) = self.service.cancel_alert(&alert_id, &self.cancel_reason) {
            return Err(self.abort(
                epoch,
                previous,
                SosError::CancellationFailed(e.to_string()),
            ));
        }

        let mut inner = lock(&self.inner);
        if inner.epoch == epoch {
            if let Some(handle) = inner.handle.take() {
                self.tracker.stop_watch(handle);
            }
            inner.alert = None;
            inner.state = SosState::Idle;
            inner.last_error = None;
        }
        info!("Alert {alert_id} cancelled");
        Ok(())
    }

    /// Stop tracking and forget the session and its alert.
    pub fn shutdown(&self) {
        self.teardown();
    }

    pub fn state(&self) -> SosState {
        lock(&self.inner).state
    }

    pub fn current_alert(&self) -> Option<AlertRecord> {
        lock(&self.inner).alert.clone()
    }

    pub fn is_transitioning(&self) -> bool {
        self.state() == SosState::Transitioning
    }

    pub fn tracking_handle(&self) -> Option<TrackingHandle> {
        lock(&self.inner).handle
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.inner).last_error.clone()
    }

    pub fn user(&self) -> Option<User> {
        lock(&self.inner).user.clone()
    }

    pub fn heartbeat_stats(&self) -> HeartbeatStats {
        HeartbeatStats {
            sent: self.heartbeats.sent.load(Ordering::Relaxed),
            failed: self.heartbeats.failed.load(Ordering::Relaxed),
        }
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    fn begin(&self, state: SosState) -> (u64, SosState) {
        let mut inner = lock(&self.inner);
        let previous = inner.state;
        inner.state = state;
        (inner.epoch, previous)
    }

    fn abort(&self, epoch: u64, previous: SosState, error: SosError) -> SosError {
        warn!("{error}");
        let mut inner = lock(&self.inner);
        if inner.epoch == epoch {
            inner.state = previous;
            inner.last_error = Some(error.to_string());
        }
        error
    }

    fn reconcile(&self, user: &User) {
        let (epoch, _) = self.begin(SosState::Loading);
        debug!("Reconciling active alert for user {}", user.id);

        match self.service.active_alert(&user.id) {
            Ok(Some(alert)) => {
                info!("Service reports active alert {}", alert.id);
                self.adopt(epoch, alert);
            }
            Ok(None) => {
                let mut inner = lock(&self.inner);
                if inner.epoch != epoch {
                    return;
                }
                if let Some(handle) = inner.handle.take() {
                    info!("Alert is no longer active on the service; stopping {handle}");
                    self.tracker.stop_watch(handle);
                }
                inner.alert = None;
                inner.state = SosState::Idle;
                inner.last_error = None;
            }
            Err(e) => {
                warn!("Failed to fetch the active alert: {e}");
                let mut inner = lock(&self.inner);
                if inner.epoch != epoch {
                    return;
                }
                // A held alert stays held; nothing is fabricated either way.
                inner.state = if inner.handle.is_some() {
                    SosState::Active
                } else {
                    SosState::Idle
                };
                inner.last_error = Some(e.to_string());
            }
        }
    }

    /// Take `alert` as the held record and make sure a watch is feeding it.
    fn adopt(&self, epoch: u64, alert: AlertRecord) {
        let mut inner = lock(&self.inner);
        if inner.epoch != epoch {
            warn!(
                "Session ended while handling alert {}; it stays active on the service",
                alert.id
            );
            return;
        }

        let tracking_same_alert = inner.handle.is_some()
            && inner
                .alert
                .as_ref()
                .is_some_and(|held| held.id == alert.id);
        if tracking_same_alert {
            inner.alert = Some(alert);
            inner.state = SosState::Active;
            inner.last_error = None;
            return;
        }

        if let Some(stale) = inner.handle.take() {
            self.tracker.stop_watch(stale);
        }

        let alert_id = alert.id.clone();
        let handle = self
            .tracker
            .start_watch(self.heartbeat_forwarder(alert_id.clone()));
        inner.alert = Some(alert);
        inner.handle = handle;

        match handle {
            Some(handle) => {
                info!("Tracking alert {alert_id} with {handle}");
                inner.state = SosState::Active;
                inner.last_error = None;
            }
            None => {
                let reason = self
                    .tracker
                    .status()
                    .last_error
                    .unwrap_or_else(|| "location watch could not start".to_string());
                warn!("Alert {alert_id} is active but location tracking could not start: {reason}");
                inner.state = SosState::Idle;
                inner.last_error = Some(reason);
            }
        }
    }

    /// Callback for the watch: push each sample as an automatic heartbeat.
    ///
    /// Every push runs on its own thread so the watch never waits on the
    /// network. Pushes are issued in sample order but may complete out of
    /// order; only a newer sample replaces the alert's `current_location`.
    fn heartbeat_forwarder(&self, alert_id: String) -> impl FnMut(PositionSample) + Send + 'static {
        let service = Arc::clone(&self.service);
        let inner = Arc::clone(&self.inner);
        let counters = Arc::clone(&self.heartbeats);
        let newest_applied = Arc::new(AtomicU64::new(0));
        let mut issued = 0u64;

        move |sample| {
            issued += 1;
            let sequence = issued;
            let push = HeartbeatPush {
                service: Arc::clone(&service),
                inner: Arc::clone(&inner),
                counters: Arc::clone(&counters),
                newest_applied: Arc::clone(&newest_applied),
                alert_id: alert_id.clone(),
                sequence,
                sample,
            };

            let spawned = thread::Builder::new()
                .name(format!("sosguard-heartbeat-{sequence}"))
                .spawn(move || push.run());
            if let Err(e) = spawned {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                let error = SosError::HeartbeatFailed(format!("failed to start push: {e}"));
                warn!("{error}");
                lock(&inner).last_error = Some(error.to_string());
            }
        }
    }

    fn teardown(&self) {
        let mut inner = lock(&self.inner);
        inner.epoch += 1;
        if let Some(handle) = inner.handle.take() {
            debug!("Teardown stopping {handle}");
            self.tracker.stop_watch(handle);
        }
        inner.user = None;
        inner.alert = None;
        inner.state = SosState::Idle;
    }
}

impl Drop for SosController {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// One automatic heartbeat, pushed off the watch thread.
struct HeartbeatPush {
    service: Arc<dyn RemoteAlertService>,
    inner: Arc<Mutex<Inner>>,
    counters: Arc<HeartbeatCounters>,
    newest_applied: Arc<AtomicU64>,
    alert_id: String,
    sequence: u64,
    sample: PositionSample,
}

impl HeartbeatPush {
    fn run(self) {
        let delivered = deliver(
            self.service.as_ref(),
            &self.counters,
            &self.sample,
            HeartbeatOrigin::Auto,
        );

        let mut inner = lock(&self.inner);
        let still_held = inner
            .alert
            .as_ref()
            .is_some_and(|alert| alert.id == self.alert_id);
        if !still_held {
            debug!(
                "Heartbeat for alert {} finished after tracking stopped",
                self.alert_id
            );
            return;
        }

        match delivered {
            Ok(()) => {
                let newer = self.newest_applied.fetch_max(self.sequence, Ordering::AcqRel)
                    < self.sequence;
                if let Some(alert) = inner.alert.as_mut().filter(|_| newer) {
                    alert.current_location = Some(self.sample);
                }
            }
            Err(e) => inner.last_error = Some(e.to_string()),
        }
    }
}

fn deliver(
    service: &dyn RemoteAlertService,
    counters: &HeartbeatCounters,
    sample: &PositionSample,
    origin: HeartbeatOrigin,
) -> Result<()> {
    match service.send_heartbeat(sample, origin) {
        Ok(()) => {
            counters.sent.fetch_add(1, Ordering::Relaxed);
            debug!("Heartbeat ({origin}) delivered: {sample}");
            Ok(())
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            let error = SosError::HeartbeatFailed(e.to_string());
            warn!("{error}");
            Err(error)
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
