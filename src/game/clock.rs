//! Wall-time clock for one side.

use std::time::{Duration, Instant};

/// Cumulative thinking time of one side.
///
/// The clock only accumulates between `start` and `stop`. `revert` discards
/// whatever was accumulated since the most recent `start`.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    elapsed: Duration,
    elapsed_at_start: Duration,
    ticking_since: Option<Instant>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking_since.is_some()
    }

    pub fn start(&mut self) {
        if self.ticking_since.is_none() {
            self.elapsed_at_start = self.elapsed;
            self.ticking_since = Some(Instant::now());
        }
    }

    pub fn stop(&mut self) {
        if let Some(since) = self.ticking_since.take() {
            self.elapsed += since.elapsed();
        }
    }

    /// Stops the clock and restores the value held before the last `start`.
    pub fn revert(&mut self) {
        self.ticking_since = None;
        self.elapsed = self.elapsed_at_start;
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.elapsed_at_start = Duration::ZERO;
        self.ticking_since = None;
    }

    pub fn time_elapsed(&self) -> Duration {
        match self.ticking_since {
            Some(since) => self.elapsed + since.elapsed(),
            None => self.elapsed,
        }
    }

    /// Overwrites the accumulated time. Used when rebuilding history by
    /// undo, redo or replay.
    pub fn set_time_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
        self.elapsed_at_start = elapsed;
        if self.ticking_since.is_some() {
            self.ticking_since = Some(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn stopped_clock_does_not_advance() {
        let mut clock = Clock::new();
        clock.set_time_elapsed(Duration::from_secs(5));
        thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.time_elapsed(), Duration::from_secs(5));
        assert!(!clock.is_ticking());
    }

    #[test]
    fn start_stop_accumulates() {
        let mut clock = Clock::new();
        clock.start();
        thread::sleep(Duration::from_millis(10));
        clock.stop();
        let first = clock.time_elapsed();
        assert!(first >= Duration::from_millis(10));

        clock.start();
        thread::sleep(Duration::from_millis(10));
        clock.stop();
        assert!(clock.time_elapsed() >= first + Duration::from_millis(10));
    }

    #[test]
    fn revert_discards_time_since_start() {
        let mut clock = Clock::new();
        clock.set_time_elapsed(Duration::from_secs(30));
        clock.start();
        thread::sleep(Duration::from_millis(5));
        clock.revert();
        assert!(!clock.is_ticking());
        assert_eq!(clock.time_elapsed(), Duration::from_secs(30));
    }

    #[test]
    fn reset_zeroes_and_stops() {
        let mut clock = Clock::new();
        clock.start();
        clock.set_time_elapsed(Duration::from_secs(12));
        clock.reset();
        assert!(!clock.is_ticking());
        assert_eq!(clock.time_elapsed(), Duration::ZERO);
    }
}
