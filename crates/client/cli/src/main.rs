//! Line-oriented client entry point.
//!
//! Reads commands from stdin, one per line, and prints the resulting
//! messages. Logs go to stderr so a transcript on stdout stays clean.
mod input;

use std::io::{self, BufRead, Write};

use adventure_runtime::{Runtime, RuntimeConfig, RuntimeError};
use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use input::{Input, parse};

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();

    let config = RuntimeConfig::from_env()?;
    let mut runtime = Runtime::from_config(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in runtime.look() {
        writeln!(out, "{line}")?;
    }

    let stdin = io::stdin();
    write!(out, "> ")?;
    out.flush()?;
    for line in stdin.lock().lines() {
        match parse(&line?) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Unknown(text) => writeln!(out, "I don't know how to \"{text}\".")?,
            Input::Command(command) => match runtime.execute(command) {
                Ok(report) => {
                    for message in report.messages.iter().filter(|m| !m.is_empty()) {
                        writeln!(out, "{message}")?;
                    }
                    if !report.player_alive {
                        writeln!(out, "*** You have died ***")?;
                        writeln!(
                            out,
                            "Your score is {} (in {} turns).",
                            report.score, report.turn
                        )?;
                        break;
                    }
                }
                Err(RuntimeError::GameOver) => break,
                Err(err) => writeln!(out, "{}", capitalize(&err.to_string()))?,
            },
        }
        write!(out, "> ")?;
        out.flush()?;
    }

    tracing::info!(
        turn = runtime.state().turn.number,
        score = runtime.state().score.total,
        "session ended"
    );
    Ok(())
}

/// Setup logging to stderr, defaulting to INFO.
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
