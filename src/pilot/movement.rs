//! Hull movement: keys to target speed and turn rate

use serde::Serialize;

use crate::input::{Action, Controls};

/// Speed gained per tick while accelerating
pub const ACCELERATION: f64 = 1.0;
/// Speed shed per tick while braking, reversing, or coasting
pub const DECELERATION: f64 = 2.0;
/// Speed ceiling in either direction
pub const MAX_SPEED: f64 = 8.0;
/// Hull turn rate in degrees per tick
pub const HULL_TURN_RATE: f64 = 10.0;

/// Which way the operator is pushing the hull this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    Forward,
    Reverse,
    Coast,
}

/// Motion request for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionCommand {
    pub target_speed: f64,
    /// Degrees per tick, positive turns left
    pub turn_rate: f64,
}

/// Movement system for turning held keys into motion commands
pub struct MovementSystem;

impl MovementSystem {
    /// Build this tick's motion command from the held keys and the host-reported speed
    pub fn command(controls: &Controls<'_>, speed: f64) -> MotionCommand {
        // forward wins over backward, left over right
        let throttle = if controls.held(Action::Forward) {
            Throttle::Forward
        } else if controls.held(Action::Backward) {
            Throttle::Reverse
        } else {
            Throttle::Coast
        };

        let turn_rate = if controls.held(Action::TurnLeft) {
            HULL_TURN_RATE
        } else if controls.held(Action::TurnRight) {
            -HULL_TURN_RATE
        } else {
            0.0
        };

        MotionCommand {
            target_speed: Self::next_speed(speed, throttle),
            turn_rate,
        }
    }

    /// Speed after one tick of the given throttle
    pub fn next_speed(speed: f64, throttle: Throttle) -> f64 {
        match throttle {
            Throttle::Forward => (speed + ACCELERATION).min(MAX_SPEED),
            Throttle::Reverse => (speed - DECELERATION).max(-MAX_SPEED),
            Throttle::Coast => {
                if speed > 0.0 {
                    (speed - DECELERATION).max(0.0)
                } else if speed < 0.0 {
                    (speed + DECELERATION).min(0.0)
                } else {
                    0.0
                }
            }
        }
    }
}
