//! Keyward - user account activation for the platform's operators
//!
//! Lists users and roles and activates or deactivates accounts, one user at
//! a time or for every holder of a role.

use clap::Parser;
use keyward_core::FlashMessage;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod auth;
mod commands;
mod config;
mod error;
mod state;

use commands::Cli;
use config::Config;
use error::Result;
use state::AppState;

fn main() {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", FlashMessage::error(e.to_string()));
            std::process::exit(2);
        }
    };
    if let Some(database) = cli.database {
        config.database = database;
    }

    // Initialize logging; stdout is reserved for command output
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match execute(config, cli.command) {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            eprintln!("{}", FlashMessage::error(e.to_string()));
            std::process::exit(1);
        }
    }
}

fn execute(config: Config, command: commands::Command) -> Result<String> {
    tracing::debug!(database = %config.database.display(), "Opening database");
    let state = AppState::new(config)?;
    commands::run(&state, command)
}
