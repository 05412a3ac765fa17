//! Monotonic clock trait and fixed-period tick gating.

use core::future::Future;

/// Monotonic millisecond clock.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Wait until [`Self::now_ms`] reaches `deadline_ms`.
    fn wait_until(&mut self, deadline_ms: u64) -> impl Future<Output = ()>;
}

/// Fires once per period of a monotonic clock.
///
/// The period start advances by exactly one period per tick, so short
/// delays are caught up and the long-run rate stays fixed. After a stall of
/// more than one whole period the gate restarts from the current time
/// instead of emitting a burst of ticks.
#[derive(Debug, Clone, Copy)]
pub struct TickGate {
    period_ms: u64,
    start_ms: u64,
}

impl TickGate {
    #[must_use]
    pub const fn new(period_ms: u64, now_ms: u64) -> Self {
        Self {
            period_ms,
            start_ms: now_ms,
        }
    }

    /// Time of the next tick.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> u64 {
        self.start_ms.saturating_add(self.period_ms)
    }

    /// Whether a tick is due at `now_ms`; consumes it if so.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        if elapsed < self.period_ms {
            return false;
        }
        self.start_ms = if elapsed >= 2 * self.period_ms {
            now_ms
        } else {
            self.start_ms + self.period_ms
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_period() {
        let mut gate = TickGate::new(30, 0);
        assert!(!gate.poll(0));
        assert!(!gate.poll(29));
        assert!(gate.poll(30));
        assert!(!gate.poll(31));
        assert_eq!(gate.deadline(), 60);
    }

    #[test]
    fn test_late_tick_keeps_phase() {
        let mut gate = TickGate::new(30, 0);
        assert!(gate.poll(45));
        assert_eq!(gate.deadline(), 60);
        assert!(gate.poll(60));
    }

    #[test]
    fn test_stall_restarts_from_now() {
        let mut gate = TickGate::new(30, 0);
        assert!(gate.poll(100));
        assert!(!gate.poll(101));
        assert_eq!(gate.deadline(), 130);
    }
}
