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

use log::warn;
use signal_hook::SigId;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::flag;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

#[cfg(windows)]
use signal_hook::consts::signal::SIGBREAK;

/// Set once the user asks the foreground tracking loop to stop.
#[derive(Debug, Clone)]
pub struct InterruptToken {
    flag: Arc<AtomicBool>,
}

impl InterruptToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    fn from_shared(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl Default for InterruptToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct InterruptRegistry {
    flag: Arc<AtomicBool>,
    _handles: Vec<SigId>,
}

impl InterruptRegistry {
    fn new() -> Self {
        let flag = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::new();

        for signal in registered_signals() {
            // A second signal while the flag is already set terminates the process.
            match flag::register_conditional_shutdown(*signal, 130, flag.clone()) {
                Ok(handle) => handles.push(handle),
                Err(err) => warn!("Failed to register shutdown handler for signal {signal}: {err}"),
            }
            match flag::register(*signal, flag.clone()) {
                Ok(handle) => handles.push(handle),
                Err(err) => warn!("Failed to register interrupt handler for signal {signal}: {err}"),
            }
        }

        Self {
            flag,
            _handles: handles,
        }
    }

    fn token(&self) -> InterruptToken {
        InterruptToken::from_shared(self.flag.clone())
    }
}

fn registered_signals() -> &'static [i32] {
    #[cfg(windows)]
    {
        static SIGNALS: [i32; 3] = [SIGINT, SIGTERM, SIGBREAK];
        &SIGNALS
    }

    #[cfg(not(windows))]
    {
        static SIGNALS: [i32; 2] = [SIGINT, SIGTERM];
        &SIGNALS
    }
}

static GLOBAL_REGISTRY: OnceLock<InterruptRegistry> = OnceLock::new();

/// Token backed by process-wide SIGINT/SIGTERM handlers, installed on first use.
pub fn global_token() -> InterruptToken {
    GLOBAL_REGISTRY
        .get_or_init(InterruptRegistry::new)
        .token()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clones_share_state() {
        let token = InterruptToken::new();
        let clone = token.clone();
        assert!(!clone.is_interrupted());

        token.interrupt();

        assert!(clone.is_interrupted());
    }
}
