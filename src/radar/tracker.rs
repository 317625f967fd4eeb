//! Enemy bearing tracker.
//!
//! Keeps one record per opponent id with a smoothed bearing. Smoothing is an
//! exponential moving average over unit vectors: averaging raw degree values
//! breaks at the 0/360 seam (10 and 350 would average to 180), averaging the
//! vectors and taking `atan2` does not.
//!
//! Sightings arrive from the host's event dispatch while the tick loop ages
//! and reads records. Each record is only touched through a `DashMap` entry
//! guard, so a reader never sees half of an update.

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, trace};

use crate::host::{BotId, Sighting, SightingSink};
use crate::util::angle::{normalize_absolute, to_unit_vector, vector_heading};

/// A record is stale once it has gone unseen for more than this many ticks
pub const STALE_AFTER_TICKS: u64 = 60;

/// Averaged vectors shorter than this carry no usable direction
const MIN_VECTOR_LENGTH: f64 = 1e-9;

/// Tracker errors
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Smoothing factor must be in (0, 1], got {0}")]
    InvalidAlpha(f64),
}

/// Live-adjustable smoothing parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmoothingSettings {
    pub enabled: bool,
    /// Weight of the newest sighting, in (0, 1]
    pub alpha: f64,
}

impl SmoothingSettings {
    pub fn new(enabled: bool, alpha: f64) -> Result<Self, TrackerError> {
        validate_alpha(alpha)?;
        Ok(Self { enabled, alpha })
    }
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            alpha: 0.3,
        }
    }
}

fn validate_alpha(alpha: f64) -> Result<(), TrackerError> {
    if alpha > 0.0 && alpha <= 1.0 {
        Ok(())
    } else {
        Err(TrackerError::InvalidAlpha(alpha))
    }
}

/// Everything known about one opponent
#[derive(Debug, Clone, Serialize)]
pub struct EnemyRecord {
    pub id: BotId,
    /// Raw data from the latest sighting
    pub last_sighting: Sighting,
    /// Smoothed direction vector, not renormalized
    pub smoothed_x: f64,
    pub smoothed_y: f64,
    /// Smoothed bearing in [0, 360)
    pub smoothed_bearing: f64,
    pub ticks_since_seen: u64,
    pub sightings: u64,
    #[serde(skip)]
    initialized: bool,
}

impl EnemyRecord {
    fn new(sighting: Sighting) -> Self {
        Self {
            id: sighting.bot_id,
            last_sighting: sighting,
            smoothed_x: 0.0,
            smoothed_y: 0.0,
            smoothed_bearing: 0.0,
            ticks_since_seen: 0,
            sightings: 0,
            initialized: false,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.ticks_since_seen > STALE_AFTER_TICKS
    }

    fn apply(&mut self, sighting: Sighting, settings: SmoothingSettings) {
        let raw_bearing = normalize_absolute(sighting.bearing);
        let (raw_x, raw_y) = to_unit_vector(raw_bearing);

        if !raw_bearing.is_finite() {
            // keep the filter; the rest of the sighting is still fresh
            debug!(bot_id = self.id, bearing = sighting.bearing, "Ignoring non-finite bearing");
        } else if !settings.enabled || !self.initialized {
            self.smoothed_x = raw_x;
            self.smoothed_y = raw_y;
            self.smoothed_bearing = raw_bearing;
            self.initialized = true;
        } else {
            let a = settings.alpha;
            self.smoothed_x = (1.0 - a) * self.smoothed_x + a * raw_x;
            self.smoothed_y = (1.0 - a) * self.smoothed_y + a * raw_y;
            if self.smoothed_x.hypot(self.smoothed_y) > MIN_VECTOR_LENGTH {
                self.smoothed_bearing = vector_heading(self.smoothed_x, self.smoothed_y);
            }
        }

        self.last_sighting = sighting;
        self.ticks_since_seen = 0;
        self.sightings += 1;
    }
}

/// Per-opponent smoothed bearings
#[derive(Debug, Default)]
pub struct EnemyTracker {
    records: DashMap<BotId, EnemyRecord>,
    settings: RwLock<SmoothingSettings>,
}

impl EnemyTracker {
    pub fn new(settings: SmoothingSettings) -> Self {
        Self {
            records: DashMap::new(),
            settings: RwLock::new(settings),
        }
    }

    pub fn settings(&self) -> SmoothingSettings {
        *self.settings.read()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.settings.write().enabled = enabled;
    }

    /// Rejects values outside (0, 1] and keeps the previous factor
    pub fn set_alpha(&self, alpha: f64) -> Result<(), TrackerError> {
        validate_alpha(alpha)?;
        self.settings.write().alpha = alpha;
        Ok(())
    }

    /// Insert or update the record for the sighted opponent
    pub fn record_sighting(&self, sighting: Sighting) {
        let settings = self.settings();
        let id = sighting.bot_id;
        let mut entry = self
            .records
            .entry(id)
            .or_insert_with(|| EnemyRecord::new(sighting.clone()));
        let first = entry.sightings == 0;
        entry.apply(sighting, settings);

        if first {
            debug!(bot_id = id, bearing = entry.smoothed_bearing, "New opponent tracked");
        } else {
            trace!(bot_id = id, bearing = entry.smoothed_bearing, "Opponent bearing updated");
        }
    }

    /// Age every record by one tick
    pub fn advance_tick(&self) {
        for mut record in self.records.iter_mut() {
            record.ticks_since_seen += 1;
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: BotId) -> Option<EnemyRecord> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    /// The opponent seen most recently; ties go to whichever is found first
    pub fn most_recent(&self) -> Option<EnemyRecord> {
        self.records
            .iter()
            .min_by_key(|r| r.ticks_since_seen)
            .map(|r| r.value().clone())
    }

    /// Copy of all records, sorted by id
    pub fn snapshot(&self) -> Vec<EnemyRecord> {
        let mut records: Vec<EnemyRecord> =
            self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Number of opponents ever sighted
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl SightingSink for EnemyTracker {
    fn on_sighting(&self, sighting: Sighting) {
        self.record_sighting(sighting);
    }
}
