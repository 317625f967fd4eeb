//! Application state shared across tasks

use std::sync::Arc;

use crate::config::Config;
use crate::input::KeyState;
use crate::radar::EnemyTracker;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Written by the input thread, read by the tick loop
    pub keys: Arc<KeyState>,
    /// Written by the host's sighting dispatch, aged and read by the tick loop
    pub tracker: Arc<EnemyTracker>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let tracker = Arc::new(EnemyTracker::new(config.smoothing));

        Self {
            config: Arc::new(config),
            keys: Arc::new(KeyState::new()),
            tracker,
        }
    }
}
