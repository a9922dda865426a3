//! Yes/no gate for destructive operations.
//!
//! Deletes of knowledge bases and documents ask a [`Confirm`] before any
//! request is sent. Declining is a silent no-op, not an error.

use std::io::{BufRead, Write};

pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Answers every prompt the same way (`--yes`, tests).
#[derive(Debug, Clone, Copy)]
pub struct Always(pub bool);

impl Confirm for Always {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Asks on the terminal. Declines when stdin is not a TTY.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn confirm(&self, prompt: &str) -> bool {
        if !atty::is(atty::Stream::Stdin) {
            tracing::warn!("stdin is not a terminal; declining: {}", prompt);
            return false;
        }
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{} [y/N] ", prompt);
        let _ = stderr.flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
