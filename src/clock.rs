use std::time::Instant;

/// Monotonic millisecond clock, sampled once per frame.
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
