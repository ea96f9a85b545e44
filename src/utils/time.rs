/// Converts absolute frame timestamps into per-frame deltas.
///
/// Timestamps are milliseconds, as handed out by the frame scheduler.
/// The first frame and any backwards step yield a zero delta.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    previous: Option<f64>,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `timestamp_ms` and returns the seconds elapsed since the
    /// previous call.
    pub fn advance(&mut self, timestamp_ms: f64) -> f32 {
        let now = timestamp_ms * 0.001;
        let elapsed = self.previous.map_or(0.0, |previous| (now - previous).max(0.0));
        self.previous = Some(now);
        elapsed as f32
    }

    /// Previous timestamp in seconds, if any frame ran yet.
    #[must_use]
    pub fn previous(&self) -> Option<f64> {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_zero_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(1000.0), 0.0);
        assert_eq!(clock.previous(), Some(1.0));
    }

    #[test]
    fn backwards_timestamp_clamps_to_zero() {
        let mut clock = FrameClock::new();
        clock.advance(2000.0);
        assert_eq!(clock.advance(1500.0), 0.0);
        assert!((clock.advance(1516.0) - 0.016).abs() < 1e-6);
    }
}
