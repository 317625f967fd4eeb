//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified events per second
pub fn create_limiter(events_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(events_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Default cap on terminal key events per second
pub const INPUT_RATE_LIMIT: u32 = 60;

/// Guards the key tracker against pasted floods of input events
#[derive(Clone)]
pub struct InputRateLimiter {
    limiter: Arc<Limiter>,
}

impl InputRateLimiter {
    pub fn new(events_per_second: u32) -> Self {
        Self {
            limiter: create_limiter(events_per_second),
        }
    }

    /// Check if another key event is allowed (returns true if allowed)
    pub fn check_event(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for InputRateLimiter {
    fn default() -> Self {
        Self::new(INPUT_RATE_LIMIT)
    }
}
