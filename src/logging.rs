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

/// Map the `-v` count to a default `env_logger` filter for this crate
pub fn filter_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "sosguard=warn",
        1 => "sosguard=info",
        2 => "sosguard=debug",
        _ => "sosguard=trace",
    }
}

/// Initialize the logger with the specified verbosity level
///
/// # Arguments
/// * `verbose` - Verbosity level (0=warn, 1=info, 2=debug, 3+=trace)
///
/// `RUST_LOG` takes precedence over the verbosity flag when set.
pub fn setup_logger(verbose: u8) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(filter_for_verbosity(verbose)),
    )
    .format_timestamp_secs()
    .format_module_path(false)
    .format_target(false)
    .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_verbosity() {
        assert_eq!(filter_for_verbosity(0), "sosguard=warn");
        assert_eq!(filter_for_verbosity(1), "sosguard=info");
        assert_eq!(filter_for_verbosity(2), "sosguard=debug");
        assert_eq!(filter_for_verbosity(3), "sosguard=trace");
        assert_eq!(filter_for_verbosity(9), "sosguard=trace");
    }
}
