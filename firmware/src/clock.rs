//! Embassy time driver as the engine's [`Clock`].

use embassy_time::{Instant, Timer};
use procon_core::Clock;

/// Monotonic clock backed by the RP2040 timer peripheral.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyClock;

impl EmbassyClock {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    async fn wait_until(&mut self, deadline_ms: u64) {
        Timer::at(Instant::from_millis(deadline_ms)).await;
    }
}
