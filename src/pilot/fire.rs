//! Fire control - power tiers and shot cooldown

use serde::Serialize;

use crate::input::{Action, Controls};

/// Ticks between shots
pub const FIRE_DELAY: u32 = 8;

/// Shot power tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FirePower {
    /// Fire + modifier: full-power blast
    High,
    /// Plain fire: modest power
    Normal,
}

impl FirePower {
    pub fn power(self) -> f64 {
        match self {
            FirePower::High => 3.0,
            FirePower::Normal => 1.8,
        }
    }
}

/// Cooldown state machine gating shots.
///
/// Ready when `cooldown == 0`. A shot moves it to cooling with
/// `FIRE_DELAY` ticks remaining; each cooling tick decrements once and
/// never fires, even on the tick that reaches zero.
#[derive(Debug, Clone, Default)]
pub struct FireControl {
    cooldown: u32,
    shots_fired: u64,
}

impl FireControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        self.cooldown == 0
    }

    pub fn shots_fired(&self) -> u64 {
        self.shots_fired
    }

    /// Advance one tick and return the shot to take, if any.
    ///
    /// Any `gun_heat` other than exactly zero (negative and NaN included)
    /// withholds fire without touching the cooldown.
    pub fn tick(&mut self, controls: &Controls<'_>, gun_heat: f64) -> Option<FirePower> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }

        if gun_heat != 0.0 {
            return None;
        }

        let fire = controls.held(Action::Fire);
        let power = if fire && controls.held(Action::PowerModifier) {
            FirePower::High
        } else if fire || controls.held(Action::FireAlt) {
            FirePower::Normal
        } else {
            return None;
        };

        self.cooldown = FIRE_DELAY;
        self.shots_fired += 1;
        Some(power)
    }
}
