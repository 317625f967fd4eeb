//! Keyboard events from text lines on stdin.
//!
//! Each whitespace-separated token is one event: `+w` presses W, `-w`
//! releases it, a bare `w` taps it (pressed now, released when the next line
//! arrives). Lines starting with `:` adjust bearing smoothing:
//! `:smooth on|off`, `:alpha 0.4`. `:release` lets go of every key.

use std::io::BufRead;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::radar::EnemyTracker;
use crate::util::rate_limit::InputRateLimiter;

use super::keys::{KeyCode, KeyEvent, KeyState};

/// Reads operator input and feeds the shared key state
pub struct TerminalInput {
    keys: Arc<KeyState>,
    tracker: Arc<EnemyTracker>,
    limiter: InputRateLimiter,
    /// Keys to release when the next line arrives
    tapped: Vec<KeyCode>,
}

impl TerminalInput {
    pub fn new(keys: Arc<KeyState>, tracker: Arc<EnemyTracker>, limiter: InputRateLimiter) -> Self {
        Self {
            keys,
            tracker,
            limiter,
            tapped: Vec::new(),
        }
    }

    /// Consume lines until EOF, then release all keys.
    ///
    /// Blocks; run it on a dedicated thread so an idle terminal never holds
    /// up runtime shutdown.
    pub fn run<R: BufRead>(mut self, reader: R) -> std::io::Result<()> {
        for line in reader.lines() {
            self.handle_line(&line?);
        }

        self.keys.clear();
        info!("Input closed, all keys released");
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) {
        for code in self.tapped.drain(..) {
            self.keys.key_up(code);
        }

        let line = line.trim();
        if let Some(command) = line.strip_prefix(':') {
            self.handle_command(command);
            return;
        }

        for token in line.split_whitespace() {
            self.handle_token(token);
        }
    }

    fn handle_token(&mut self, token: &str) {
        if !self.limiter.check_event() {
            warn!(token, "Input rate limited, dropping key event");
            return;
        }

        let (name, press, tap) = if let Some(name) = token.strip_prefix('+') {
            (name, true, false)
        } else if let Some(name) = token.strip_prefix('-') {
            (name, false, false)
        } else {
            (token, true, true)
        };

        let code = match name.parse::<KeyCode>() {
            Ok(code) => code,
            Err(e) => {
                debug!(error = %e, "Ignoring key");
                return;
            }
        };

        let mut event = if press {
            KeyEvent::pressed(code)
        } else {
            KeyEvent::released(code)
        };
        self.keys.dispatch(&mut event);

        if tap {
            self.tapped.push(code);
        }
    }

    fn handle_command(&mut self, command: &str) {
        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("smooth"), Some("on")) => {
                self.tracker.set_enabled(true);
                info!("Bearing smoothing enabled");
            }
            (Some("smooth"), Some("off")) => {
                self.tracker.set_enabled(false);
                info!("Bearing smoothing disabled");
            }
            (Some("alpha"), Some(value)) => match value.parse::<f64>() {
                Ok(alpha) => match self.tracker.set_alpha(alpha) {
                    Ok(()) => info!(alpha, "Smoothing factor updated"),
                    Err(e) => warn!(error = %e, "Smoothing factor rejected"),
                },
                Err(_) => warn!(value, "Smoothing factor is not a number"),
            },
            (Some("release"), None) => {
                let held = self.keys.held_count();
                self.tapped.clear();
                self.keys.clear();
                info!(held, "Released all keys");
            }
            _ => warn!(command, "Unknown command"),
        }
    }
}
