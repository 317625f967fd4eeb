//! Key codes, key events, and the process-wide held-key set

use std::fmt;
use std::str::FromStr;

use dashmap::DashSet;

/// Keys the pilot understands. Anything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Q,
    E,
    R,
    Space,
    Enter,
    Shift,
    /// Raw code from an event source with no named binding
    Other(u32),
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Up => write!(f, "Up"),
            KeyCode::Down => write!(f, "Down"),
            KeyCode::Left => write!(f, "Left"),
            KeyCode::Right => write!(f, "Right"),
            KeyCode::W => write!(f, "W"),
            KeyCode::A => write!(f, "A"),
            KeyCode::S => write!(f, "S"),
            KeyCode::D => write!(f, "D"),
            KeyCode::Q => write!(f, "Q"),
            KeyCode::E => write!(f, "E"),
            KeyCode::R => write!(f, "R"),
            KeyCode::Space => write!(f, "Space"),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Shift => write!(f, "Shift"),
            KeyCode::Other(code) => write!(f, "#{}", code),
        }
    }
}

impl FromStr for KeyCode {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_ascii_lowercase().as_str() {
            "up" | "arrowup" => KeyCode::Up,
            "down" | "arrowdown" => KeyCode::Down,
            "left" | "arrowleft" => KeyCode::Left,
            "right" | "arrowright" => KeyCode::Right,
            "w" => KeyCode::W,
            "a" => KeyCode::A,
            "s" => KeyCode::S,
            "d" => KeyCode::D,
            "q" => KeyCode::Q,
            "e" => KeyCode::E,
            "r" => KeyCode::R,
            "space" | "spc" => KeyCode::Space,
            "enter" | "return" => KeyCode::Enter,
            "shift" => KeyCode::Shift,
            other => {
                return match other.strip_prefix('#').map(str::parse::<u32>) {
                    Some(Ok(code)) => Ok(KeyCode::Other(code)),
                    _ => Err(KeyParseError::Unknown(s.to_string())),
                }
            }
        };
        Ok(key)
    }
}

/// Key name parsing errors
#[derive(Debug, thiserror::Error)]
pub enum KeyParseError {
    #[error("Unknown key name: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Pressed,
    Released,
}

/// A key event as delivered by an input source
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub kind: KeyEventKind,
    consumed: bool,
}

impl KeyEvent {
    pub fn pressed(code: KeyCode) -> Self {
        Self {
            code,
            kind: KeyEventKind::Pressed,
            consumed: false,
        }
    }

    pub fn released(code: KeyCode) -> Self {
        Self {
            code,
            kind: KeyEventKind::Released,
            consumed: false,
        }
    }

    /// Mark as handled so the source skips its default alert for the key
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    #[cfg(test)]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// Read side of the keyboard, as seen by the controllers
pub trait InputPort: Send + Sync {
    fn is_pressed(&self, key: KeyCode) -> bool;
}

/// Set of currently held keys.
///
/// Written by the input source task, read by the tick loop. `DashSet` keeps
/// every insert, remove, and membership query atomic per key.
#[derive(Debug, Default)]
pub struct KeyState {
    held: DashSet<KeyCode>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&self, code: KeyCode) {
        self.held.insert(code);
    }

    /// Releasing a key that was never pressed is a no-op.
    pub fn key_up(&self, code: KeyCode) {
        self.held.remove(&code);
    }

    /// Apply an event and mark it consumed.
    ///
    /// Always returns `false`: the event is not swallowed, other listeners
    /// still see it.
    pub fn dispatch(&self, event: &mut KeyEvent) -> bool {
        match event.kind {
            KeyEventKind::Pressed => self.key_down(event.code),
            KeyEventKind::Released => self.key_up(event.code),
        }
        event.consume();
        false
    }

    /// Release everything, e.g. when the input source goes away
    pub fn clear(&self) {
        self.held.clear();
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }
}

impl InputPort for KeyState {
    fn is_pressed(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }
}
