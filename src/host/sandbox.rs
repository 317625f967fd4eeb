//! In-process sandbox battle.
//!
//! A small deterministic stand-in for the simulator: one tank under the
//! pilot's control and one scripted opponent circling the arena centre.
//! Radar bearings to the opponent are perturbed with seeded noise so the
//! tracker has something to smooth.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::pilot::movement::{ACCELERATION, DECELERATION, HULL_TURN_RATE, MAX_SPEED};
use crate::pilot::snapshot::MAX_ENERGY;
use crate::util::angle::{normalize_absolute, to_unit_vector, vector_heading};
use crate::util::time::{tick_duration, DEFAULT_TPS};

use super::{BotHost, BotId, BotSensors, Sighting, SightingSink};

/// Fastest the gun can turn per tick
pub const MAX_GUN_TURN_RATE: f64 = 20.0;
/// Heat shed per tick
pub const GUN_COOLING_RATE: f64 = 0.1;
/// Keeps tanks off the walls
const WALL_MARGIN: f64 = 18.0;

/// Sandbox setup
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Ticks per second
    pub tps: u32,
    /// End after this many turns, `None` runs until stopped
    pub max_turns: Option<u64>,
    /// Seed for radar noise
    pub seed: u64,
    pub arena_width: f64,
    pub arena_height: f64,
    /// Peak radar bearing error in degrees
    pub radar_noise: f64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            tps: DEFAULT_TPS,
            max_turns: None,
            seed: 7,
            arena_width: 800.0,
            arena_height: 600.0,
            radar_noise: 4.0,
        }
    }
}

/// Ends the sandbox from another task
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
struct Tank {
    x: f64,
    y: f64,
    speed: f64,
    direction: f64,
    gun_direction: f64,
    gun_heat: f64,
    energy: f64,
}

/// Opponent on a fixed circular course
#[derive(Debug, Clone)]
struct Orbiter {
    id: BotId,
    /// Position on the orbit, degrees
    angle: f64,
    radius: f64,
    /// Degrees of orbit per tick
    rate: f64,
    speed: f64,
    energy: f64,
}

/// Sandbox implementation of the simulator capability interface
pub struct SandboxHost {
    config: SandboxConfig,
    own: Tank,
    opponent: Orbiter,
    target_speed: f64,
    turn_rate: f64,
    gun_turn_rate: f64,
    pending_fire: Option<f64>,
    sinks: Vec<Arc<dyn SightingSink>>,
    rng: ChaCha8Rng,
    interval: Option<Interval>,
    turn: u64,
    stop: StopHandle,
}

impl SandboxHost {
    pub fn new(config: SandboxConfig) -> Self {
        let own = Tank {
            x: config.arena_width / 2.0,
            y: config.arena_height / 2.0,
            speed: 0.0,
            direction: 90.0,
            gun_direction: 90.0,
            gun_heat: 0.0,
            energy: MAX_ENERGY,
        };
        let opponent = Orbiter {
            id: 1,
            angle: 0.0,
            radius: config.arena_width.min(config.arena_height) * 0.35,
            rate: 0.5,
            speed: 0.0,
            energy: MAX_ENERGY,
        };

        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            own,
            opponent,
            target_speed: 0.0,
            turn_rate: 0.0,
            gun_turn_rate: 0.0,
            pending_fire: None,
            sinks: Vec::new(),
            interval: None,
            turn: 0,
            stop: StopHandle::default(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[cfg(test)]
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Simulate one turn with the commands set since the last one
    fn advance(&mut self) {
        self.turn += 1;
        self.resolve_fire();
        self.move_tank();
        self.move_opponent();
        self.scan();
    }

    fn resolve_fire(&mut self) {
        let own = &mut self.own;
        if let Some(power) = self.pending_fire.take() {
            if own.gun_heat <= 0.0 && own.energy > power {
                own.gun_heat = 1.0 + power / 5.0;
                own.energy -= power;
                debug!(turn = self.turn, power, energy = own.energy, "Sandbox bullet fired");
            }
        }
        own.gun_heat = (own.gun_heat - GUN_COOLING_RATE).max(0.0);
        // keep float dust from holding the gun hot
        if own.gun_heat < 1e-9 {
            own.gun_heat = 0.0;
        }
    }

    fn move_tank(&mut self) {
        let own = &mut self.own;
        own.speed = approach_speed(own.speed, self.target_speed);

        let body_turn = self.turn_rate.clamp(-HULL_TURN_RATE, HULL_TURN_RATE);
        let gun_turn = self.gun_turn_rate.clamp(-MAX_GUN_TURN_RATE, MAX_GUN_TURN_RATE);
        own.direction = normalize_absolute(own.direction + body_turn);
        // the gun rides on the hull
        own.gun_direction = normalize_absolute(own.gun_direction + body_turn + gun_turn);

        let (dx, dy) = to_unit_vector(own.direction);
        own.x = (own.x + dx * own.speed)
            .clamp(WALL_MARGIN, self.config.arena_width - WALL_MARGIN);
        own.y = (own.y + dy * own.speed)
            .clamp(WALL_MARGIN, self.config.arena_height - WALL_MARGIN);
    }

    fn move_opponent(&mut self) {
        let opp = &mut self.opponent;
        opp.angle = normalize_absolute(opp.angle + opp.rate);
        opp.speed = opp.radius * opp.rate.to_radians();
    }

    fn opponent_position(&self) -> (f64, f64) {
        let (cx, cy) = to_unit_vector(self.opponent.angle);
        (
            self.config.arena_width / 2.0 + cx * self.opponent.radius,
            self.config.arena_height / 2.0 + cy * self.opponent.radius,
        )
    }

    fn scan(&mut self) {
        let (x, y) = self.opponent_position();
        let true_bearing = vector_heading(x - self.own.x, y - self.own.y);
        let noise = self.config.radar_noise;
        let error = if noise > 0.0 {
            // triangular distribution, peak at zero
            (self.rng.gen_range(-noise..noise) + self.rng.gen_range(-noise..noise)) / 2.0
        } else {
            0.0
        };

        let sighting = Sighting {
            bot_id: self.opponent.id,
            x,
            y,
            direction: normalize_absolute(self.opponent.angle + 90.0),
            speed: self.opponent.speed,
            energy: self.opponent.energy,
            bearing: normalize_absolute(true_bearing + error),
        };
        for sink in &self.sinks {
            sink.on_sighting(sighting.clone());
        }
    }
}

/// Move `speed` toward `target` by at most one tick of acceleration or braking
fn approach_speed(speed: f64, target: f64) -> f64 {
    let target = target.clamp(-MAX_SPEED, MAX_SPEED);
    let diff = target - speed;
    let speeding_up = target.abs() > speed.abs() && target * speed >= 0.0;
    let limit = if speeding_up { ACCELERATION } else { DECELERATION };
    speed + diff.clamp(-limit, limit)
}

impl BotHost for SandboxHost {
    fn is_running(&self) -> bool {
        !self.stop.is_stopped() && self.config.max_turns.map_or(true, |max| self.turn < max)
    }

    fn sensors(&self) -> BotSensors {
        BotSensors {
            energy: self.own.energy,
            x: self.own.x,
            y: self.own.y,
            speed: self.own.speed,
            direction: self.own.direction,
            gun_direction: self.own.gun_direction,
            // radar is locked to the gun
            radar_direction: self.own.gun_direction,
            gun_heat: self.own.gun_heat,
            arena_width: self.config.arena_width,
            arena_height: self.config.arena_height,
            round: 1,
            turn: self.turn,
        }
    }

    fn set_target_speed(&mut self, speed: f64) {
        self.target_speed = speed;
    }

    fn set_turn_rate(&mut self, rate: f64) {
        self.turn_rate = rate;
    }

    fn set_gun_turn_rate(&mut self, rate: f64) {
        self.gun_turn_rate = rate;
    }

    fn fire(&mut self, power: f64) {
        self.pending_fire = Some(power);
    }

    fn register_sighting_sink(&mut self, sink: Arc<dyn SightingSink>) {
        self.sinks.push(sink);
    }

    fn go(&mut self) -> impl Future<Output = bool> + Send {
        async move {
            if !self.is_running() {
                return false;
            }

            let tps = self.config.tps;
            let ticker = self.interval.get_or_insert_with(|| {
                let mut ticker = interval(tick_duration(tps));
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                ticker
            });
            ticker.tick().await;

            self.advance();

            let running = self.is_running();
            if !running {
                info!(turn = self.turn, "Sandbox battle over");
            }
            running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<Sighting>>);

    impl SightingSink for Collect {
        fn on_sighting(&self, sighting: Sighting) {
            self.0.lock().push(sighting);
        }
    }

    fn quiet() -> SandboxConfig {
        SandboxConfig {
            radar_noise: 0.0,
            ..SandboxConfig::default()
        }
    }

    #[test]
    fn speed_follows_asymmetric_limits() {
        assert_eq!(approach_speed(0.0, 8.0), 1.0);
        assert_eq!(approach_speed(5.0, 0.0), 3.0);
        assert_eq!(approach_speed(1.0, -8.0), -1.0);
        assert_eq!(approach_speed(-3.0, -8.0), -4.0);
        assert_eq!(approach_speed(7.5, 8.0), 8.0);
        assert_eq!(approach_speed(0.0, 50.0), 1.0);
    }

    #[test]
    fn tank_drives_along_heading() {
        let mut host = SandboxHost::new(quiet());
        let y0 = host.sensors().y;
        host.set_target_speed(1.0);
        host.advance();
        let s = host.sensors();
        assert_eq!(s.speed, 1.0);
        // starts facing 90 degrees, so it moves along +y
        assert!((s.y - y0 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn turns_are_clamped_and_gun_rides_hull() {
        let mut host = SandboxHost::new(quiet());
        host.set_turn_rate(45.0);
        host.set_gun_turn_rate(-90.0);
        host.advance();
        let s = host.sensors();
        assert_eq!(s.direction, 100.0);
        assert_eq!(s.gun_direction, 80.0);
    }

    #[test]
    fn firing_heats_gun_and_costs_energy() {
        let mut host = SandboxHost::new(quiet());
        host.fire(3.0);
        host.advance();
        let s = host.sensors();
        assert!((s.gun_heat - 1.5).abs() < 1e-9);
        assert_eq!(s.energy, 97.0);

        // hot gun swallows the shot
        host.fire(3.0);
        host.advance();
        assert_eq!(host.sensors().energy, 97.0);

        for _ in 0..20 {
            host.advance();
        }
        assert_eq!(host.sensors().gun_heat, 0.0);
    }

    #[test]
    fn sightings_point_at_the_opponent() {
        let mut host = SandboxHost::new(quiet());
        let sink = Arc::new(Collect::default());
        host.register_sighting_sink(sink.clone());
        for _ in 0..5 {
            host.advance();
        }
        let seen = sink.0.lock();
        assert_eq!(seen.len(), 5);
        let last = seen.last().unwrap();
        let s = host.sensors();
        let expected = vector_heading(last.x - s.x, last.y - s.y);
        assert!((last.bearing - expected).abs() < 1e-9);
    }

    #[test]
    fn noise_is_bounded_and_seeded() {
        let run = || {
            let mut host = SandboxHost::new(SandboxConfig::default());
            let sink = Arc::new(Collect::default());
            host.register_sighting_sink(sink.clone());
            for _ in 0..50 {
                host.advance();
            }
            let seen = sink.0.lock().clone();
            (seen, host.sensors())
        };
        let (a, sensors) = run();
        let (b, _) = run();
        assert_eq!(a, b);
        for s in &a {
            let truth = vector_heading(s.x - sensors.x, s.y - sensors.y);
            let d = (s.bearing - truth).rem_euclid(360.0);
            assert!(d.min(360.0 - d) <= 4.0 + 1e-9);
        }
    }

    #[tokio::test]
    async fn go_ends_after_max_turns() {
        let mut host = SandboxHost::new(SandboxConfig {
            tps: 1000,
            max_turns: Some(3),
            ..SandboxConfig::default()
        });
        assert!(host.go().await);
        assert!(host.go().await);
        assert!(!host.go().await);
        assert!(!host.is_running());
        assert!(!host.go().await);
        assert_eq!(host.turn(), 3);
    }

    #[tokio::test]
    async fn stop_handle_ends_the_battle() {
        let mut host = SandboxHost::new(SandboxConfig {
            tps: 1000,
            ..SandboxConfig::default()
        });
        let stop = host.stop_handle();
        assert!(host.go().await);
        stop.stop();
        assert!(!host.is_running());
        assert!(!host.go().await);
    }
}
