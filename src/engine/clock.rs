/// Level clock. Timestamps come from the host (`performance.now()` in the
/// browser) and are only ever compared against `origin_ms`.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin_ms: f64, // host time when the current level started
}

impl Clock {
    pub fn new(now: f64) -> Self {
        Self { origin_ms: now }
    }

    pub fn restart(&mut self, now: f64) {
        self.origin_ms = now;
    }

    pub fn origin_ms(&self) -> f64 {
        self.origin_ms
    }

    /// Milliseconds since the level started. Host clocks that step backwards
    /// read as zero rather than negative time.
    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.origin_ms).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        let mut clock = Clock::new(1_000.0);
        assert!((clock.elapsed(1_000.0) - 0.0).abs() < 1e-9);
        assert!((clock.elapsed(1_750.0) - 750.0).abs() < 1e-9);
        assert_eq!(clock.elapsed(900.0), 0.0);
        clock.restart(5_000.0);
        assert!((clock.elapsed(5_500.0) - 500.0).abs() < 1e-9);
    }
}
