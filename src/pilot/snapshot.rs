//! Presentation snapshots and HUD rendering

use std::fmt;

use serde::Serialize;

use crate::host::{BotId, BotSensors, Sighting};
use crate::radar::EnemyRecord;
use crate::util::angle::{clamp_ratio, normalize_absolute};

/// Energy a bot starts a round with
pub const MAX_ENERGY: f64 = 100.0;
/// Heat right after a full-power shot (1 + 3.0 / 5)
pub const MAX_GUN_HEAT: f64 = 1.6;

/// Own tank state for display
#[derive(Debug, Clone, Serialize)]
pub struct OwnState {
    pub energy: f64,
    /// Energy against a full tank, clamped to [0, 1]
    pub energy_ratio: f64,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub direction: f64,
    pub gun_direction: f64,
    pub radar_direction: f64,
    pub gun_heat: f64,
    /// Heat against a full-power shot, clamped to [0, 1]
    pub heat_ratio: f64,
    pub fire_cooldown: u32,
}

/// One tracked opponent for display
#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: BotId,
    pub smoothed_bearing: f64,
    pub last_sighting: Sighting,
    pub ticks_since_seen: u64,
    pub stale: bool,
}

impl From<EnemyRecord> for EnemyView {
    fn from(record: EnemyRecord) -> Self {
        Self {
            id: record.id,
            smoothed_bearing: record.smoothed_bearing,
            stale: record.is_stale(),
            ticks_since_seen: record.ticks_since_seen,
            last_sighting: record.last_sighting,
        }
    }
}

/// Everything a HUD needs for one tick
#[derive(Debug, Clone, Serialize)]
pub struct TickSnapshot {
    pub round: u32,
    pub turn: u64,
    pub own: OwnState,
    /// Sorted by id
    pub enemies: Vec<EnemyView>,
    /// Most recently seen opponent
    pub target: Option<BotId>,
}

/// Builds snapshots and decides when the HUD should redraw
pub struct SnapshotBuilder {
    /// Tick counter since last render
    ticks_since_render: u32,
    /// Render interval in ticks, 0 disables rendering
    render_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(render_interval: u32) -> Self {
        Self {
            ticks_since_render: 0,
            render_interval,
        }
    }

    /// Check if it's time to render
    pub fn should_render(&mut self) -> bool {
        if self.render_interval == 0 {
            return false;
        }
        self.ticks_since_render += 1;
        if self.ticks_since_render >= self.render_interval {
            self.ticks_since_render = 0;
            true
        } else {
            false
        }
    }

    /// Build a snapshot from this tick's sensors and tracker contents
    pub fn build(
        sensors: &BotSensors,
        fire_cooldown: u32,
        enemies: Vec<EnemyRecord>,
        target: Option<BotId>,
    ) -> TickSnapshot {
        TickSnapshot {
            round: sensors.round,
            turn: sensors.turn,
            own: OwnState {
                energy: sensors.energy,
                energy_ratio: clamp_ratio(sensors.energy, MAX_ENERGY),
                x: sensors.x,
                y: sensors.y,
                speed: sensors.speed,
                direction: normalize_absolute(sensors.direction),
                gun_direction: normalize_absolute(sensors.gun_direction),
                radar_direction: normalize_absolute(sensors.radar_direction),
                gun_heat: sensors.gun_heat,
                heat_ratio: clamp_ratio(sensors.gun_heat, MAX_GUN_HEAT),
                fire_cooldown,
            },
            enemies: enemies.into_iter().map(EnemyView::from).collect(),
            target,
        }
    }
}

impl fmt::Display for TickSnapshot {
    /// Info panel text
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let own = &self.own;
        writeln!(f, "Round {} Turn {}", self.round, self.turn)?;
        writeln!(f, "Energy: {:.1}", own.energy)?;
        writeln!(f, "X: {:.1}", own.x)?;
        writeln!(f, "Y: {:.1}", own.y)?;
        writeln!(f, "Heading: {:.1}", own.direction)?;
        writeln!(f, "Gun Heading: {:.1}", own.gun_direction)?;
        writeln!(f, "Radar Heading: {:.1}", own.radar_direction)?;
        writeln!(f, "Gun Heat: {:.1}", own.gun_heat)?;
        write!(f, "Speed: {:.1}", own.speed)?;
        for enemy in &self.enemies {
            let marker = if Some(enemy.id) == self.target { "*" } else { " " };
            write!(
                f,
                "\n{}Enemy {}: bearing {:.1} energy {:.1} seen {} ticks ago{}",
                marker,
                enemy.id,
                enemy.smoothed_bearing,
                enemy.last_sighting.energy,
                enemy.ticks_since_seen,
                if enemy.stale { " (stale)" } else { "" },
            )?;
        }
        Ok(())
    }
}
