//! Opponent tracking from radar sightings

pub mod tracker;

pub use tracker::{EnemyRecord, EnemyTracker, SmoothingSettings};
