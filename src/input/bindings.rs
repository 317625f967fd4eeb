//! Maps pilot actions to the keys that trigger them

use super::keys::{InputPort, KeyCode};

/// Control legend shown to the operator
pub const CONTROLS_LEGEND: &str = "W/Up: forward  S/Down: back  A/Left: turn left  D/Right: turn right  \
     Q: gun left  E: gun right  R: center gun  Shift+Space: high fire  Space/Enter: fire";

/// Something the operator can ask the tank to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    GunLeft,
    GunRight,
    GunCenter,
    Fire,
    FireAlt,
    PowerModifier,
}

/// Keys bound to each action; any bound key holds the action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: Vec<KeyCode>,
    pub backward: Vec<KeyCode>,
    pub turn_left: Vec<KeyCode>,
    pub turn_right: Vec<KeyCode>,
    pub gun_left: Vec<KeyCode>,
    pub gun_right: Vec<KeyCode>,
    pub gun_center: Vec<KeyCode>,
    pub fire: Vec<KeyCode>,
    pub fire_alt: Vec<KeyCode>,
    pub power_modifier: Vec<KeyCode>,
}

impl KeyBindings {
    pub fn keys(&self, action: Action) -> &[KeyCode] {
        match action {
            Action::Forward => &self.forward,
            Action::Backward => &self.backward,
            Action::TurnLeft => &self.turn_left,
            Action::TurnRight => &self.turn_right,
            Action::GunLeft => &self.gun_left,
            Action::GunRight => &self.gun_right,
            Action::GunCenter => &self.gun_center,
            Action::Fire => &self.fire,
            Action::FireAlt => &self.fire_alt,
            Action::PowerModifier => &self.power_modifier,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::Up, KeyCode::W],
            backward: vec![KeyCode::Down, KeyCode::S],
            turn_left: vec![KeyCode::Left, KeyCode::A],
            turn_right: vec![KeyCode::Right, KeyCode::D],
            gun_left: vec![KeyCode::Q],
            gun_right: vec![KeyCode::E],
            gun_center: vec![KeyCode::R],
            fire: vec![KeyCode::Space],
            fire_alt: vec![KeyCode::Enter],
            power_modifier: vec![KeyCode::Shift],
        }
    }
}

/// Per-tick view of the keyboard in terms of actions
#[derive(Clone, Copy)]
pub struct Controls<'a> {
    input: &'a dyn InputPort,
    bindings: &'a KeyBindings,
}

impl<'a> Controls<'a> {
    pub fn new(input: &'a dyn InputPort, bindings: &'a KeyBindings) -> Self {
        Self { input, bindings }
    }

    pub fn held(&self, action: Action) -> bool {
        self.bindings
            .keys(action)
            .iter()
            .any(|&key| self.input.is_pressed(key))
    }
}
