//! Keyboard state shared between the input source and the tick loop

pub mod bindings;
pub mod keys;
pub mod terminal;

pub use bindings::{Action, Controls, KeyBindings, CONTROLS_LEGEND};
pub use keys::{InputPort, KeyState};
