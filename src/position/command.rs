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
use log::{debug, trace};
use serde::Deserialize;
use std::io::{ErrorKind, Read};
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

const POLL_STEP: Duration = Duration::from_millis(25);
const OUTPUT_GRACE: Duration = Duration::from_millis(250);

/// Environment passed to the locator so wrapper scripts can honour the request.
pub const HIGH_ACCURACY_ENV: &str = "SOSGUARD_HIGH_ACCURACY";
pub const TIMEOUT_MS_ENV: &str = "SOSGUARD_TIMEOUT_MS";
pub const MAX_AGE_MS_ENV: &str = "SOSGUARD_MAX_AGE_MS";

/// What a locator command prints on stdout. Matches `termux-location`.
#[derive(Debug, Deserialize)]
struct LocatorOutput {
    latitude: f64,
    longitude: f64,
    #[serde(default, alias = "accuracy_meters")]
    accuracy: Option<f64>,
}

/// Obtains fixes by running an external locator command.
#[derive(Debug)]
pub struct CommandPositionSource {
    argv: Arc<Vec<String>>,
    interval: Duration,
    watches: PollingWatches,
}

impl CommandPositionSource {
    pub fn new(argv: Vec<String>, interval: Duration) -> Self {
        Self {
            argv: Arc::new(argv),
            interval,
            watches: PollingWatches::new(),
        }
    }
}

impl PositionSource for CommandPositionSource {
    fn name(&self) -> &str {
        "command"
    }

    fn request_once(&self, options: &PositionOptions) -> PositionEvent {
        run_locator(&self.argv, options)
    }

    fn watch(
        &self,
        options: &PositionOptions,
        sink: Sender<PositionEvent>,
    ) -> Result<WatchId, PositionError> {
        let argv = Arc::clone(&self.argv);
        let options = *options;
        self.watches
            .spawn("command", self.interval, sink, move || {
                run_locator(&argv, &options)
            })
            .map_err(|e| PositionError::Unavailable(format!("failed to start watch: {e}")))
    }

    fn cancel_watch(&self, id: WatchId) {
        self.watches.cancel(id);
    }
}

/// Run the locator once, killing it if it outlives `options.timeout`.
pub(crate) fn run_locator(argv: &[String], options: &PositionOptions) -> PositionEvent {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| PositionError::Unavailable("no locator command configured".to_string()))?;

    debug!("Running locator: {}", argv.join(" "));
    let mut child = Command::new(program)
        .args(args)
        .env(HIGH_ACCURACY_ENV, if options.high_accuracy { "1" } else { "0" })
        .env(TIMEOUT_MS_ENV, options.timeout.as_millis().to_string())
        .env(MAX_AGE_MS_ENV, options.maximum_age.as_millis().to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                PositionError::Unavailable(format!("locator '{program}' not found"))
            }
            ErrorKind::PermissionDenied => {
                PositionError::PermissionDenied(format!("cannot execute '{program}': {e}"))
            }
            _ => PositionError::Unavailable(format!("failed to run '{program}': {e}")),
        })?;

    // Drain both pipes while waiting so a chatty locator never blocks on write.
    let stdout_rx = drain(child.stdout.take());
    let stderr_rx = drain(child.stderr.take());

    let deadline = Instant::now() + options.timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PositionError::Timeout(options.timeout));
            }
            Ok(None) => thread::sleep(POLL_STEP),
            Err(e) => {
                return Err(PositionError::Unavailable(format!(
                    "failed to wait for locator: {e}"
                )));
            }
        }
    };

    let output = Output {
        status,
        stdout: collect(&stdout_rx, deadline)?,
        stderr: collect(&stderr_rx, deadline)?,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .map_or_else(
                || format!("locator exited with {}", output.status),
                str::to_string,
            );
        return Err(classify_failure(message));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    trace!("Locator output: {stdout}");
    parse_locator_output(&stdout)
}

/// Read `pipe` to the end on a helper thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    let Some(mut pipe) = pipe else {
        let _ = tx.send(Vec::new());
        return rx;
    };
    let spawned = thread::Builder::new()
        .name("sosguard-locator-pipe".to_string())
        .spawn(move || {
            let mut buffer = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut buffer) {
                debug!("Locator pipe read failed: {e}");
            }
            let _ = tx.send(buffer);
        });
    if let Err(e) = spawned {
        debug!("Could not start locator pipe reader: {e}");
    }
    rx
}

/// Wait for a drained pipe. A descendant of the locator may keep it open
/// after the locator exits, so the wait is bounded by the request deadline.
fn collect(rx: &Receiver<Vec<u8>>, deadline: Instant) -> Result<Vec<u8>, PositionError> {
    let remaining = deadline.saturating_duration_since(Instant::now()) + OUTPUT_GRACE;
    match rx.recv_timeout(remaining) {
        Ok(buffer) => Ok(buffer),
        Err(RecvTimeoutError::Timeout) => Err(PositionError::Unavailable(
            "locator exited but its output stayed open".to_string(),
        )),
        Err(RecvTimeoutError::Disconnected) => Err(PositionError::Unavailable(
            "failed to read locator output".to_string(),
        )),
    }
}

fn classify_failure(message: String) -> PositionError {
    let lowered = message.to_lowercase();
    if lowered.contains("permission") || lowered.contains("denied") {
        PositionError::PermissionDenied(message)
    } else {
        PositionError::Unavailable(message)
    }
}

pub(crate) fn parse_locator_output(stdout: &str) -> PositionEvent {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(PositionError::Unavailable(
            "locator produced no output".to_string(),
        ));
    }

    let parsed: LocatorOutput = serde_json::from_str(trimmed)
        .map_err(|e| PositionError::Unavailable(format!("unreadable locator output: {e}")))?;

    let sample = PositionSample::new(
        parsed.latitude,
        parsed.longitude,
        parsed.accuracy.unwrap_or(0.0),
    );
    sample
        .validate()
        .map_err(|e| PositionError::Unavailable(e.to_string()))?;
    Ok(sample)
}
