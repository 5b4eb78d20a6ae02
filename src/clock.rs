//! Integer-second simulation clock (spec §4.1).
//!
//! `timeS` may run negative during the warm-up phase; the orchestrator
//! resets it to zero once warm-up converges and the real day begins.

/// Number of seconds in one simulated day.
pub const SECONDS_PER_DAY: i32 = 86_400;

/// Integer-second clock tracking time-of-day and day-of-year.
///
/// Mutated only by the orchestrator ([`crate::world::World`]); every other
/// subsystem treats it as read-only context for the current tick.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    /// Seconds since the start of the current simulated day. Negative during warm-up.
    time_s: i32,
    /// Day of year, 1..365.
    day_of_year: u16,
}

impl Clock {
    /// Creates a clock starting at `time_s = 0` on the given day of year.
    ///
    /// # Panics
    ///
    /// Panics if `day_of_year` is outside `1..=365`.
    pub fn new(day_of_year: u16) -> Self {
        assert!((1..=365).contains(&day_of_year), "day_of_year must be 1..=365");
        Self {
            time_s: 0,
            day_of_year,
        }
    }

    /// Advances the clock by exactly one second.
    ///
    /// When `time_s` reaches [`SECONDS_PER_DAY`], it is NOT auto-rolled —
    /// the orchestrator is responsible for detecting `time_s >= 86_400` and
    /// calling [`Clock::roll_to_next_day`] (or ending the run).
    pub fn advance(&mut self) {
        self.time_s += 1;
    }

    /// Rolls the clock back to `time_s = 0` and advances the day of year,
    /// wrapping `365 -> 1`.
    pub fn roll_to_next_day(&mut self) {
        self.time_s = 0;
        self.day_of_year = if self.day_of_year >= 365 {
            1
        } else {
            self.day_of_year + 1
        };
    }

    /// Resets `time_s` to zero without changing the day of year. Used when
    /// the warm-up phase (§4.1) converges and the real day begins.
    pub fn reset_to_start_of_day(&mut self) {
        self.time_s = 0;
    }

    pub fn time_s(self) -> i32 {
        self.time_s
    }

    pub fn day_of_year(self) -> u16 {
        self.day_of_year
    }

    /// Whether the simulated day has completed (`time_s >= 86_400`).
    pub fn day_complete(self) -> bool {
        self.time_s >= SECONDS_PER_DAY
    }

    fn wrapped(self) -> i32 {
        self.time_s.rem_euclid(SECONDS_PER_DAY)
    }

    pub fn local_hour(self) -> u32 {
        (self.wrapped() / 3600) as u32
    }

    pub fn local_minute(self) -> u32 {
        ((self.wrapped() % 3600) / 60) as u32
    }

    pub fn local_second(self) -> u32 {
        (self.wrapped() % 60) as u32
    }

    /// The index into a 1 Hz, 86400-slot day array that this tick maps to.
    pub fn second_index(self) -> usize {
        self.wrapped() as usize
    }

    /// The index into a 60 s cadence array (forecast, dispatch plan source).
    pub fn minute_index(self) -> usize {
        self.second_index() / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clock_starts_at_zero() {
        let clock = Clock::new(200);
        assert_eq!(clock.time_s(), 0);
        assert_eq!(clock.day_of_year(), 200);
    }

    #[test]
    fn advance_increments_time() {
        let mut clock = Clock::new(1);
        clock.advance();
        clock.advance();
        assert_eq!(clock.time_s(), 2);
    }

    #[test]
    fn local_hour_minute_second_wrap_correctly() {
        let mut clock = Clock::new(1);
        for _ in 0..(3 * 3600 + 14 * 60 + 5) {
            clock.advance();
        }
        assert_eq!(clock.local_hour(), 3);
        assert_eq!(clock.local_minute(), 14);
        assert_eq!(clock.local_second(), 5);
    }

    #[test]
    fn day_complete_at_86400() {
        let mut clock = Clock::new(1);
        for _ in 0..86_400 {
            assert!(!clock.day_complete());
            clock.advance();
        }
        assert!(clock.day_complete());
    }

    #[test]
    fn roll_to_next_day_wraps_365_to_1() {
        let mut clock = Clock::new(365);
        for _ in 0..86_400 {
            clock.advance();
        }
        clock.roll_to_next_day();
        assert_eq!(clock.time_s(), 0);
        assert_eq!(clock.day_of_year(), 1);
    }

    #[test]
    fn negative_time_s_wraps_correctly() {
        let clock = Clock {
            time_s: -1,
            day_of_year: 10,
        };
        assert_eq!(clock.second_index(), SECONDS_PER_DAY as usize - 1);
        assert_eq!(clock.local_hour(), 23);
    }

    #[test]
    fn minute_index_is_second_index_over_60() {
        let mut clock = Clock::new(1);
        for _ in 0..125 {
            clock.advance();
        }
        assert_eq!(clock.minute_index(), 2);
    }
}
