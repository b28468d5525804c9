// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - a per-user conversational agent dispatcher.
//!
//! This is the binary entry point.

mod app;
mod output;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use parley_config::ParleyConfig;
use parley_core::ParleyError;

/// Parley - a per-user conversational agent dispatcher.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive REPL session as one user.
    Shell {
        #[arg(long, default_value = "local")]
        user: String,
    },
    /// Send one message and print the replies.
    Send {
        #[arg(long)]
        user: String,
        text: String,
    },
    /// Print a user's stored conversation.
    History {
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: ParleyConfig) -> Result<(), ParleyError> {
    match command {
        Some(Commands::Shell { user }) => shell::run_shell(config, &user).await,
        Some(Commands::Send { user, text }) => app::run_send(config, &user, &text).await,
        Some(Commands::History { user }) => app::run_history(config, &user).await,
        None => {
            println!("parley: use --help for available commands");
            Ok(())
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` overrides the configured level when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_send_with_global_config() {
        let cli = Cli::parse_from([
            "parley",
            "send",
            "--user",
            "alice",
            "hello there",
            "--config",
            "/tmp/parley.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/parley.toml")));
        match cli.command {
            Some(Commands::Send { user, text }) => {
                assert_eq!(user, "alice");
                assert_eq!(text, "hello there");
            }
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn shell_user_defaults_to_local() {
        let cli = Cli::parse_from(["parley", "shell"]);
        assert!(matches!(cli.command, Some(Commands::Shell { user }) if user == "local"));
    }

    #[test]
    fn send_requires_user() {
        assert!(Cli::try_parse_from(["parley", "send", "hi"]).is_err());
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = parley_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "parley");
        assert_eq!(config.orchestrator.max_turns, 25);
    }
}
