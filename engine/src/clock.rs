use std::time::Duration;

/// Ticks a frame may run when catching up after a stall.
pub const DEFAULT_CATCH_UP_LIMIT: u32 = 4;

/// Converts wall-clock deltas into whole fixed simulation ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClock {
    tick: Duration,
    accumulator: Duration,
    catch_up_limit: u32,
}

impl FrameClock {
    /// Creates a clock that produces `tick_rate` ticks per second.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        let rate = u64::from(tick_rate.max(1));
        Self {
            tick: Duration::from_nanos(1_000_000_000 / rate),
            accumulator: Duration::ZERO,
            catch_up_limit: DEFAULT_CATCH_UP_LIMIT,
        }
    }

    /// Replaces the number of ticks a single frame may run.
    #[must_use]
    pub fn with_catch_up_limit(mut self, limit: u32) -> Self {
        self.catch_up_limit = limit.max(1);
        self
    }

    /// Duration of one simulation tick.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick
    }

    /// Accumulates `elapsed` and returns how many ticks are due.
    ///
    /// When more ticks are due than the catch-up limit allows, the backlog is
    /// dropped so a long stall does not turn into a burst of simulation.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator = self.accumulator.saturating_add(elapsed);
        let mut ticks = 0;
        while self.accumulator >= self.tick {
            if ticks == self.catch_up_limit {
                self.accumulator = Duration::ZERO;
                break;
            }
            self.accumulator -= self.tick;
            ticks += 1;
        }
        ticks
    }
}
