use instant::Instant;
use std::time::Duration;

#[inline]
fn since(now: Instant, earlier: Instant) -> Duration {
    if now > earlier {
        now - earlier
    } else {
        Duration::ZERO
    }
}

/// Monotonic frame timer. The first tick reports a zero delta.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    start: Option<Instant>,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(last) => since(now, last).as_secs_f32() * 1000.0,
            None => {
                self.start = Some(now);
                0.0
            }
        };
        self.last = Some(now);
        dt
    }

    /// Seconds between the first tick and the most recent one.
    pub fn elapsed_sec(&self) -> f32 {
        match (self.start, self.last) {
            (Some(start), Some(last)) => since(last, start).as_secs_f32(),
            _ => 0.0,
        }
    }
}
