//! The tick loop: read keys, command the host, yield until the next tick

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, trace};

use crate::host::BotHost;
use crate::input::{Controls, InputPort, KeyBindings};
use crate::radar::EnemyTracker;

use super::fire::FireControl;
use super::gun::GunSystem;
use super::movement::MovementSystem;
use super::snapshot::{SnapshotBuilder, TickSnapshot};
use super::TickCommands;

/// Handle for observers of a running pilot
#[derive(Clone)]
pub struct PilotHandle {
    pub snapshot_tx: broadcast::Sender<TickSnapshot>,
}

impl PilotHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<TickSnapshot> {
        self.snapshot_tx.subscribe()
    }
}

/// Totals reported when the loop ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PilotSummary {
    pub ticks: u64,
    pub shots_fired: u64,
}

/// Drives one bot for the lifetime of a battle.
///
/// Movement, gun, and fire state belong to this loop alone; only the key
/// state and the enemy tracker are shared with other tasks.
pub struct Pilot<H: BotHost> {
    host: H,
    input: Arc<dyn InputPort>,
    bindings: KeyBindings,
    fire: FireControl,
    tracker: Arc<EnemyTracker>,
    snapshot_tx: broadcast::Sender<TickSnapshot>,
    ticks: u64,
}

impl<H: BotHost> Pilot<H> {
    /// Create a pilot and register its tracker for the host's sightings
    pub fn new(
        mut host: H,
        input: Arc<dyn InputPort>,
        bindings: KeyBindings,
        tracker: Arc<EnemyTracker>,
    ) -> (Self, PilotHandle) {
        let (snapshot_tx, _) = broadcast::channel(64);
        host.register_sighting_sink(tracker.clone());

        let handle = PilotHandle {
            snapshot_tx: snapshot_tx.clone(),
        };

        let pilot = Self {
            host,
            input,
            bindings,
            fire: FireControl::new(),
            tracker,
            snapshot_tx,
            ticks: 0,
        };

        (pilot, handle)
    }

    /// Run until the host stops admitting ticks
    pub async fn run(mut self) -> PilotSummary {
        info!("Pilot engaged");

        while self.host.is_running() {
            self.step();

            // tell the host we're done for this tick
            if !self.host.go().await {
                break;
            }
        }

        let summary = PilotSummary {
            ticks: self.ticks,
            shots_fired: self.fire.shots_fired(),
        };
        info!(
            ticks = summary.ticks,
            shots_fired = summary.shots_fired,
            "Pilot disengaged"
        );
        summary
    }

    /// Decide and issue this tick's commands
    pub fn step(&mut self) -> TickCommands {
        let sensors = self.host.sensors();
        let controls = Controls::new(self.input.as_ref(), &self.bindings);

        let motion = MovementSystem::command(&controls, sensors.speed);
        let gun = GunSystem::command(&controls, sensors.gun_direction, sensors.direction);
        let shot = self.fire.tick(&controls, sensors.gun_heat);

        self.host.set_target_speed(motion.target_speed);
        self.host.set_turn_rate(motion.turn_rate);
        self.host.set_gun_turn_rate(gun.turn_rate());
        if let Some(power) = shot {
            debug!(turn = sensors.turn, power = power.power(), "Firing");
            self.host.fire(power.power());
        }

        let target = self.tracker.most_recent().map(|r| r.id);
        let snapshot =
            SnapshotBuilder::build(&sensors, self.fire.cooldown(), self.tracker.snapshot(), target);
        // no receivers is fine
        let _ = self.snapshot_tx.send(snapshot);

        self.tracker.advance_tick();
        self.ticks += 1;

        trace!(
            turn = sensors.turn,
            target_speed = motion.target_speed,
            turn_rate = motion.turn_rate,
            gun_rate = gun.turn_rate(),
            "Tick"
        );

        TickCommands { motion, gun, shot }
    }

    #[cfg(test)]
    pub fn host(&self) -> &H {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BotSensors, Sighting, SightingSink};
    use crate::input::keys::KeyCode;
    use crate::input::KeyState;
    use crate::pilot::fire::FIRE_DELAY;
    use crate::pilot::{FirePower, GunCommand};
    use crate::radar::SmoothingSettings;
    use std::future::Future;

    /// Host that follows commands exactly and records what it was told
    #[derive(Default)]
    struct ScriptedHost {
        sensors: BotSensors,
        running: bool,
        max_turns: u64,
        speeds: Vec<f64>,
        gun_rates: Vec<f64>,
        shots: Vec<(u64, f64)>,
        sink: Option<Arc<dyn SightingSink>>,
        sightings: Vec<(u64, Sighting)>,
    }

    impl ScriptedHost {
        fn new(max_turns: u64) -> Self {
            Self {
                running: true,
                max_turns,
                ..Self::default()
            }
        }
    }

    impl BotHost for ScriptedHost {
        fn is_running(&self) -> bool {
            self.running
        }

        fn sensors(&self) -> BotSensors {
            self.sensors.clone()
        }

        fn set_target_speed(&mut self, speed: f64) {
            self.speeds.push(speed);
            self.sensors.speed = speed;
        }

        fn set_turn_rate(&mut self, rate: f64) {
            self.sensors.direction += rate;
        }

        fn set_gun_turn_rate(&mut self, rate: f64) {
            self.gun_rates.push(rate);
        }

        fn fire(&mut self, power: f64) {
            self.shots.push((self.sensors.turn, power));
        }

        fn register_sighting_sink(&mut self, sink: Arc<dyn SightingSink>) {
            self.sink = Some(sink);
        }

        fn go(&mut self) -> impl Future<Output = bool> + Send {
            self.sensors.turn += 1;
            let turn = self.sensors.turn;
            if let Some(sink) = &self.sink {
                for (_, s) in self.sightings.iter().filter(|(t, _)| *t == turn) {
                    sink.on_sighting(s.clone());
                }
            }
            std::future::ready(turn < self.max_turns)
        }
    }

    fn pilot(host: ScriptedHost, keys: Arc<KeyState>) -> (Pilot<ScriptedHost>, PilotHandle) {
        let tracker = Arc::new(EnemyTracker::new(SmoothingSettings::default()));
        Pilot::new(host, keys, KeyBindings::default(), tracker)
    }

    fn sighting(id: u32, bearing: f64) -> Sighting {
        Sighting {
            bot_id: id,
            x: 10.0,
            y: 20.0,
            direction: 0.0,
            speed: 2.0,
            energy: 90.0,
            bearing,
        }
    }

    #[tokio::test]
    async fn stops_when_host_refuses_next_tick() {
        let (pilot, _) = pilot(ScriptedHost::new(3), Arc::new(KeyState::new()));
        let summary = pilot.run().await;
        assert_eq!(summary, PilotSummary { ticks: 3, shots_fired: 0 });
    }

    #[tokio::test]
    async fn no_commands_once_host_has_ended() {
        let mut host = ScriptedHost::new(10);
        host.running = false;
        let keys = Arc::new(KeyState::new());
        keys.key_down(KeyCode::Space);
        let (pilot, _) = pilot(host, keys);
        let summary = pilot.run().await;
        assert_eq!(summary.ticks, 0);
        assert_eq!(summary.shots_fired, 0);
    }

    #[test]
    fn forward_ramp_through_the_loop() {
        let keys = Arc::new(KeyState::new());
        keys.key_down(KeyCode::Up);
        let (mut pilot, _) = pilot(ScriptedHost::new(9), keys);
        for _ in 0..9 {
            pilot.step();
        }
        assert_eq!(
            pilot.host().speeds,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 8.0]
        );
    }

    #[tokio::test]
    async fn held_fire_respects_delay() {
        let keys = Arc::new(KeyState::new());
        keys.key_down(KeyCode::Space);
        keys.key_down(KeyCode::Shift);
        let (pilot, _) = pilot(ScriptedHost::new(20), keys);
        let summary = pilot.run().await;
        assert_eq!(summary.shots_fired, 3);
    }

    #[test]
    fn step_reports_commands() {
        let keys = Arc::new(KeyState::new());
        keys.key_down(KeyCode::R);
        keys.key_down(KeyCode::Enter);
        let mut host = ScriptedHost::new(5);
        host.sensors.gun_direction = 30.0;
        host.sensors.direction = 350.0;
        let (mut pilot, _) = pilot(host, keys);

        let cmds = pilot.step();
        assert_eq!(cmds.gun, GunCommand::Center(40.0));
        assert_eq!(cmds.shot, Some(FirePower::Normal));
        assert_eq!(pilot.host().gun_rates, vec![-40.0]);
        assert_eq!(pilot.host().shots, vec![(0, 1.8)]);

        for _ in 0..FIRE_DELAY {
            assert_eq!(pilot.step().shot, None);
        }
        assert_eq!(pilot.step().shot, Some(FirePower::Normal));
    }

    #[tokio::test]
    async fn snapshots_show_sightings_from_the_host() {
        let mut host = ScriptedHost::new(4);
        host.sightings = vec![(1, sighting(5, 90.0)), (2, sighting(6, 180.0))];
        let (pilot, handle) = pilot(host, Arc::new(KeyState::new()));
        let mut rx = handle.subscribe();

        pilot.run().await;

        let first = rx.recv().await.unwrap();
        assert!(first.enemies.is_empty());
        assert_eq!(first.target, None);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.target, Some(5));
        assert_eq!(second.enemies[0].ticks_since_seen, 0);

        let third = rx.recv().await.unwrap();
        assert_eq!(third.target, Some(6));
        assert_eq!(third.enemies.len(), 2);
        assert_eq!(third.enemies[0].ticks_since_seen, 1);

        let fourth = rx.recv().await.unwrap();
        assert_eq!(fourth.enemies[0].ticks_since_seen, 2);
        assert_eq!(fourth.enemies[1].ticks_since_seen, 1);
    }
}
