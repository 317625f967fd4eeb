//! Per-tick decision logic for the manually piloted tank

pub mod fire;
pub mod gun;
pub mod movement;
pub mod snapshot;
pub mod tick;

pub use fire::FirePower;
pub use gun::GunCommand;
pub use movement::MotionCommand;
pub use snapshot::{SnapshotBuilder, TickSnapshot};
pub use tick::Pilot;

use serde::Serialize;

/// Everything the pilot asked of the host on one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickCommands {
    pub motion: MotionCommand,
    pub gun: GunCommand,
    pub shot: Option<FirePower>,
}
