//! Turret control

use serde::Serialize;

use crate::input::{Action, Controls};
use crate::util::angle::normalize_relative;

/// Turret rate in degrees per tick for the rotate keys
pub const GUN_TURN_RATE: f64 = 2.5;

/// Turret request for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", content = "degrees", rename_all = "snake_case")]
pub enum GunCommand {
    /// Absolute rate in degrees per tick, positive turns left
    Rate(f64),
    /// Clockwise correction in degrees that lines the gun up with the hull,
    /// always in (-180, 180]
    Center(f64),
}

impl GunCommand {
    /// Host-facing rate, positive counter-clockwise
    pub fn turn_rate(self) -> f64 {
        match self {
            GunCommand::Rate(rate) => rate,
            GunCommand::Center(offset) => -offset,
        }
    }
}

/// Gun system for turning held keys into turret commands
pub struct GunSystem;

impl GunSystem {
    /// Priority: left, right, center, stop. The gun never coasts.
    pub fn command(controls: &Controls<'_>, gun_direction: f64, hull_direction: f64) -> GunCommand {
        if controls.held(Action::GunLeft) {
            GunCommand::Rate(GUN_TURN_RATE)
        } else if controls.held(Action::GunRight) {
            GunCommand::Rate(-GUN_TURN_RATE)
        } else if controls.held(Action::GunCenter) {
            GunCommand::Center(Self::center_offset(gun_direction, hull_direction))
        } else {
            GunCommand::Rate(0.0)
        }
    }

    /// How far the gun sits left of the hull, in (-180, 180]
    pub fn center_offset(gun_direction: f64, hull_direction: f64) -> f64 {
        normalize_relative(gun_direction - hull_direction)
    }
}
