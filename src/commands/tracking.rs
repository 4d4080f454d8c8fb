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

use crate::commands::interrupt::InterruptToken;
use crate::sos::{SosController, SosState};
use colored::Colorize;
use log::{debug, warn};
use std::thread;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FollowOutcome {
    Interrupted,
    AlertEnded,
}

/// Keep the controller's watch running in the foreground.
///
/// Reconciles every `refresh_interval` so an alert cancelled elsewhere ends
/// the loop. Tracking is always torn down on return.
pub(crate) fn follow(
    controller: &SosController,
    refresh_interval: Duration,
    interrupt: &InterruptToken,
) -> FollowOutcome {
    let tick = TICK.min(refresh_interval);
    let mut last_refresh = Instant::now();
    let mut warned_idle = false;

    let outcome = loop {
        if interrupt.is_interrupted() {
            break FollowOutcome::Interrupted;
        }
        thread::sleep(tick);

        if last_refresh.elapsed() < refresh_interval {
            continue;
        }
        last_refresh = Instant::now();
        controller.refresh();

        if controller.current_alert().is_none() {
            break FollowOutcome::AlertEnded;
        }
        if controller.state() == SosState::Active {
            warned_idle = false;
        } else if !warned_idle {
            warned_idle = true;
            warn!(
                "Location is not being shared: {}",
                controller
                    .last_error()
                    .unwrap_or_else(|| "tracking stopped".to_string())
            );
        }
        debug!("Heartbeats so far: {:?}", controller.heartbeat_stats());
    };

    let alert = controller.current_alert();
    let stats = controller.heartbeat_stats();
    controller.shutdown();

    match (outcome, alert) {
        (FollowOutcome::Interrupted, Some(alert)) => {
            println!();
            println!(
                "Stopped sharing location. Alert {} {}; run 'sosguard cancel' once you are safe.",
                alert.id,
                "remains active".red().bold()
            );
        }
        (FollowOutcome::Interrupted, None) => println!("Stopped sharing location."),
        (FollowOutcome::AlertEnded, _) => {
            println!("The alert is no longer active. Location sharing stopped.")
        }
    }
    println!(
        "Heartbeats delivered: {} (failed: {})",
        stats.sent, stats.failed
    );

    outcome
}
