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

use crate::error::{ErrorContext, SosError};
use colored::Colorize;

pub fn format_error_chain(error: &SosError) -> String {
    let context = ErrorContext::new(error);
    context.to_string()
}

/// Format error for an interactive terminal, with a bold header and bulleted suggestions
pub fn format_error_with_color(error: &SosError, use_color: bool) -> String {
    let paint = |text: &str, style: fn(&str) -> String| {
        if use_color {
            style(text)
        } else {
            text.to_string()
        }
    };

    let context = ErrorContext::new(error);
    let mut output = String::new();

    let header = paint("Error:", |s| s.red().bold().to_string());
    output.push_str(&format!("{header} {error}\n"));

    if let Some(details) = &context.details {
        output.push_str(&format!("\n{details}\n"));
    }

    if let Some(suggestion) = &context.suggestion {
        let title = paint("Suggestions:", |s| s.yellow().bold().to_string());
        output.push_str(&format!("\n{title}\n"));
        for line in suggestion.lines() {
            if !line.trim().is_empty() {
                let bullet = paint(&format!("• {line}"), |s| s.cyan().to_string());
                output.push_str(&format!("{bullet}\n"));
            }
        }
    }

    output
}
