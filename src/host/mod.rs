//! Capability interface to the battle simulator.
//!
//! The pilot never talks to a transport directly. Whatever drives the bot
//! (a network client, or the in-process sandbox) implements [`BotHost`].

pub mod sandbox;

pub use sandbox::{SandboxConfig, SandboxHost};

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opponent identifier as assigned by the simulator
pub type BotId = u32;

/// Sensor readings for the current tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotSensors {
    pub energy: f64,
    pub x: f64,
    pub y: f64,
    /// Signed speed, negative when reversing
    pub speed: f64,
    /// Hull heading in degrees
    pub direction: f64,
    /// Gun heading in degrees
    pub gun_direction: f64,
    /// Radar heading in degrees
    pub radar_direction: f64,
    /// Weapon heat; no shot is possible above zero
    pub gun_heat: f64,
    pub arena_width: f64,
    pub arena_height: f64,
    pub round: u32,
    pub turn: u64,
}

/// An opponent picked up by the radar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    pub bot_id: BotId,
    pub x: f64,
    pub y: f64,
    /// Opponent hull heading in degrees
    pub direction: f64,
    pub speed: f64,
    pub energy: f64,
    /// Radar bearing at the moment of the sighting, in degrees
    pub bearing: f64,
}

/// Receives sightings from the host's event dispatch
pub trait SightingSink: Send + Sync {
    fn on_sighting(&self, sighting: Sighting);
}

/// What the pilot needs from the simulator
pub trait BotHost: Send {
    /// False once the host has ended the battle
    fn is_running(&self) -> bool;

    fn sensors(&self) -> BotSensors;

    fn set_target_speed(&mut self, speed: f64);

    /// Hull turn rate, degrees per tick, positive counter-clockwise
    fn set_turn_rate(&mut self, rate: f64);

    /// Gun turn rate, degrees per tick, positive counter-clockwise
    fn set_gun_turn_rate(&mut self, rate: f64);

    fn fire(&mut self, power: f64);

    fn register_sighting_sink(&mut self, sink: Arc<dyn SightingSink>);

    /// Hand this tick's commands to the simulator and wait for the next tick.
    /// Resolves to false when no further tick will be admitted.
    fn go(&mut self) -> impl Future<Output = bool> + Send;
}
