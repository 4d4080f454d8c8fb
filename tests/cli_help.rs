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

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("sosguard")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("trigger"))
        .stdout(contains("cancel"))
        .stdout(contains("track"))
        .stdout(contains("locate"))
        .stdout(contains("signup"))
        .stdout(contains("--verbose"));
}

#[test]
fn test_trigger_help_mentions_detach() {
    Command::cargo_bin("sosguard")
        .unwrap()
        .args(["trigger", "--help"])
        .assert()
        .success()
        .stdout(contains("--notes"))
        .stdout(contains("--detach"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("sosguard")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_command_is_usage_error() {
    Command::cargo_bin("sosguard")
        .unwrap()
        .arg("panic")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_signup_requires_name() {
    Command::cargo_bin("sosguard")
        .unwrap()
        .args(["signup", "--email", "asha@example.com"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("--name"));
}
