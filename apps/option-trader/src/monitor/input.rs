//! Keyboard command surface for the monitoring loop.
//!
//! The monitor recognizes exactly two command keys, `A` (adjust) and `Q`
//! (cancel), case-insensitive; everything else is ignored. Raw terminal
//! mode is held by a guard whose Drop restores the previous mode, so
//! every exit path (including errors and interrupts) releases it.

use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use rust_decimal::Decimal;

use crate::error::ClientError;

/// A command entered during monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// `A`: adjust the limit price.
    Adjust,
    /// `Q`: cancel the order.
    Cancel,
}

impl MonitorCommand {
    /// Map a key event to a command, ignoring everything unrecognized.
    #[must_use]
    pub fn from_key(event: &KeyEvent) -> Option<Self> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        match event.code {
            KeyCode::Char('a' | 'A') => Some(Self::Adjust),
            KeyCode::Char('q' | 'Q') => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Non-blocking command source polled once per monitor tick.
#[async_trait]
pub trait CommandInput: Send {
    /// Wait up to `timeout` for a pending command. `Ok(None)` means no
    /// command arrived within the window.
    async fn next_command(&mut self, timeout: Duration) -> Result<Option<MonitorCommand>, ClientError>;
}

/// Interactive prompt surface used while a command is being serviced.
#[async_trait]
pub trait Prompter: Send {
    /// Print a transient status line (no newline, carriage-return style).
    fn status_line(&mut self, text: &str);

    /// Print a full message line.
    fn notice(&mut self, text: &str);

    /// Ask a yes/no question.
    async fn confirm(&mut self, prompt: &str) -> Result<bool, ClientError>;

    /// Prompt for a price. Returns `None` when the user aborts with an
    /// empty line or enters something non-numeric; either way the
    /// calling operation must have no side effect.
    async fn prompt_price(&mut self, prompt: &str) -> Result<Option<Decimal>, ClientError>;
}

/// Scoped raw-mode acquisition.
///
/// Raw mode is enabled on construction and restored when the guard
/// drops. `suspend`/`resume` bracket line-oriented prompts.
#[derive(Debug)]
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    /// Enable raw mode.
    pub fn acquire() -> Result<Self, ClientError> {
        enable_raw_mode()?;
        Ok(Self { active: true })
    }

    /// Temporarily restore cooked mode for a line prompt.
    pub fn suspend(&mut self) -> Result<(), ClientError> {
        if self.active {
            disable_raw_mode()?;
            self.active = false;
        }
        Ok(())
    }

    /// Re-enter raw mode after a prompt.
    pub fn resume(&mut self) -> Result<(), ClientError> {
        if !self.active {
            enable_raw_mode()?;
            self.active = true;
        }
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            // Nothing useful to do with a failure while unwinding.
            let _ = disable_raw_mode();
        }
    }
}

/// Real keyboard input, polled from the crossterm event queue.
///
/// Polling runs on the blocking pool per call; there is no background
/// reader thread, so suspending raw mode for a line prompt cannot race
/// a concurrent event read.
#[derive(Debug, Default)]
pub struct KeyboardInput;

impl KeyboardInput {
    /// Create a keyboard input source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandInput for KeyboardInput {
    async fn next_command(&mut self, timeout: Duration) -> Result<Option<MonitorCommand>, ClientError> {
        let command = tokio::task::spawn_blocking(move || -> Result<_, std::io::Error> {
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    return Ok(MonitorCommand::from_key(&key));
                }
            }
            Ok(None)
        })
        .await
        .map_err(|e| ClientError::Transport(format!("input task failed: {e}")))??;
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn recognizes_adjust_and_cancel_case_insensitive() {
        assert_eq!(
            MonitorCommand::from_key(&key(KeyCode::Char('a'))),
            Some(MonitorCommand::Adjust)
        );
        assert_eq!(
            MonitorCommand::from_key(&key(KeyCode::Char('A'))),
            Some(MonitorCommand::Adjust)
        );
        assert_eq!(
            MonitorCommand::from_key(&key(KeyCode::Char('q'))),
            Some(MonitorCommand::Cancel)
        );
        assert_eq!(
            MonitorCommand::from_key(&key(KeyCode::Char('Q'))),
            Some(MonitorCommand::Cancel)
        );
    }

    #[test]
    fn ignores_other_keys() {
        assert_eq!(MonitorCommand::from_key(&key(KeyCode::Char('x'))), None);
        assert_eq!(MonitorCommand::from_key(&key(KeyCode::Enter)), None);
        assert_eq!(MonitorCommand::from_key(&key(KeyCode::Esc)), None);
    }

    #[test]
    fn ignores_key_release() {
        let mut event = key(KeyCode::Char('a'));
        event.kind = KeyEventKind::Release;
        assert_eq!(MonitorCommand::from_key(&event), None);
    }
}
