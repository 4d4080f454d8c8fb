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

use clap::{Parser, Subcommand};
use sosguard::commands::cancel::CancelCommand;
use sosguard::commands::locate::LocateCommand;
use sosguard::commands::login::LoginCommand;
use sosguard::commands::logout::LogoutCommand;
use sosguard::commands::signup::SignupCommand;
use sosguard::commands::status::StatusCommand;
use sosguard::commands::track::TrackCommand;
use sosguard::commands::trigger::TriggerCommand;
use sosguard::config::new_sos_config;
use sosguard::error::{Result, format_error_with_color, get_exit_code};
use sosguard::logging;
use std::io::IsTerminal;

#[derive(Parser)]
#[command(name = "sosguard")]
#[command(author, version, about = "Raise an SOS alert and share your location until you are safe", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the alert service
    Login {
        /// Account email address
        #[arg(long)]
        email: String,

        /// Read the password from standard input without prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Create an account on the alert service and sign in
    Signup {
        /// Full name shown to responders
        #[arg(long)]
        name: String,

        /// Account email address
        #[arg(long)]
        email: String,

        /// Contact phone number
        #[arg(long)]
        phone: Option<String>,

        /// Read the password from standard input without prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Forget the stored session
    Logout,

    /// Show the active SOS alert, if any
    #[command(visible_alias = "st")]
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Raise an SOS alert and share your location
    #[command(long_about = "Raise an SOS alert and share your location

Takes one position fix, reports it, and asks the alert service to raise an
alert. Unless --detach is given, location sharing continues in the
foreground until Ctrl-C, or until the alert is cancelled.")]
    Trigger {
        /// Short note attached to the alert
        #[arg(short, long)]
        notes: Option<String>,

        /// Raise the alert and exit without sharing location
        #[arg(long)]
        detach: bool,
    },

    /// Share your location for an alert that is already active
    Track,

    /// Cancel the active SOS alert
    #[command(alias = "safe")]
    Cancel,

    /// Take one position fix with the configured source
    Locate {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn setup_logger(cli: &Cli) {
    logging::setup_logger(cli.verbose);
}

fn report(error: &sosguard::error::SosError) -> ! {
    eprintln!(
        "{}",
        format_error_with_color(error, std::io::stderr().is_terminal())
    );
    std::process::exit(get_exit_code(error));
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger based on CLI flags and environment
    setup_logger(&cli);

    // Load configuration once at startup
    let config = match new_sos_config() {
        Ok(config) => config,
        Err(e) => report(&e),
    };

    let result: Result<()> = (|| match cli.command {
        Commands::Login {
            email,
            password_stdin,
        } => {
            let command = LoginCommand::new(&config)?;
            command.execute(&email, password_stdin)
        }
        Commands::Signup {
            name,
            email,
            phone,
            password_stdin,
        } => {
            let command = SignupCommand::new(&config)?;
            command.execute(&name, &email, phone.as_deref(), password_stdin)
        }
        Commands::Logout => {
            let command = LogoutCommand::new(&config)?;
            command.execute()
        }
        Commands::Status { json } => {
            let command = StatusCommand::new(&config)?;
            command.execute(json)
        }
        Commands::Trigger { notes, detach } => {
            let command = TriggerCommand::new(&config)?;
            command.execute(notes.as_deref(), detach)
        }
        Commands::Track => {
            let command = TrackCommand::new(&config)?;
            command.execute()
        }
        Commands::Cancel => {
            let command = CancelCommand::new(&config)?;
            command.execute()
        }
        Commands::Locate { json } => {
            let command = LocateCommand::new(&config)?;
            command.execute(json)
        }
    })();

    if let Err(e) = result {
        report(&e);
    }
}
