// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley shell` command implementation.
//!
//! Interactive REPL with a colored prompt and readline history. Every line is
//! routed through the dispatcher as one user, so the conversation persists
//! across shell invocations.

use colored::Colorize;
use parley_config::ParleyConfig;
use parley_core::ParleyError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::app::App;
use crate::output;

/// Runs the `parley shell` REPL as `user_id`.
pub async fn run_shell(config: ParleyConfig, user_id: &str) -> Result<(), ParleyError> {
    let app = App::open(&config).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| ParleyError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    println!("Type {} to exit.\n", "/quit".yellow());

    let prompt = format!("{}> ", user_id.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                match app.process(user_id, trimmed).await {
                    Ok(replies) => {
                        debug!(produced = replies.len(), "shell turn finished");
                        for reply in output::visible_replies(&replies) {
                            println!("{reply}\n");
                        }
                    }
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            // Ctrl+C / Ctrl+D
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}
