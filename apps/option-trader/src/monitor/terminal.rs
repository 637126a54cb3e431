//! Terminal-backed prompter for live monitoring sessions.

use std::io::Write;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::ClientError;

use super::input::{Prompter, RawModeGuard};

/// Prompter that owns the raw-mode guard for one monitoring session.
///
/// Raw mode stays enabled while the monitor polls for single-key
/// commands and is suspended around line-oriented prompts. Dropping the
/// prompter restores the terminal whatever path got us there.
#[derive(Debug)]
pub struct TerminalPrompter {
    guard: RawModeGuard,
}

impl TerminalPrompter {
    /// Acquire raw mode for a monitoring session.
    pub fn new() -> Result<Self, ClientError> {
        Ok(Self {
            guard: RawModeGuard::acquire()?,
        })
    }

    async fn read_line(&mut self) -> Result<String, ClientError> {
        self.guard.suspend()?;
        let line = tokio::task::spawn_blocking(|| -> Result<String, std::io::Error> {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| ClientError::Transport(format!("stdin task failed: {e}")))??;
        self.guard.resume()?;
        Ok(line.trim().to_string())
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    fn status_line(&mut self, text: &str) {
        // Overwrite the current line; raw mode needs the explicit \r.
        print!("\r{text}    ");
        let _ = std::io::stdout().flush();
    }

    fn notice(&mut self, text: &str) {
        print!("\r\n{text}\r\n");
        let _ = std::io::stdout().flush();
    }

    async fn confirm(&mut self, prompt: &str) -> Result<bool, ClientError> {
        print!("\r\n{prompt} (y/n): ");
        let _ = std::io::stdout().flush();
        let answer = self.read_line().await?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }

    async fn prompt_price(&mut self, prompt: &str) -> Result<Option<Decimal>, ClientError> {
        print!("\r\n{prompt}");
        let _ = std::io::stdout().flush();
        let line = self.read_line().await?;
        if line.is_empty() {
            return Ok(None);
        }
        match line.parse::<Decimal>() {
            Ok(price) if !price.is_sign_negative() => Ok(Some(price)),
            _ => {
                self.notice("Invalid price.");
                Ok(None)
            }
        }
    }
}
