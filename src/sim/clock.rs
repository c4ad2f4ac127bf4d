//! Wall-clock to simulation delta conversion
//!
//! The host calls [`GameClock::advance`] once per display frame with its
//! current timestamp. The clock remembers the previous timestamp, produces
//! zero while paused, and drops the stale reference on resume so the first
//! frame back does not carry the whole pause as one delta.

/// Frame timestamp bookkeeping
#[derive(Debug, Clone, Default)]
pub struct GameClock {
    last_time_ms: Option<f64>,
    paused: bool,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous call. The first call after
    /// construction or a resume yields 0.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        if self.paused {
            return 0.0;
        }
        let delta = match self.last_time_ms {
            Some(last) if now_ms.is_finite() && now_ms > last => (now_ms - last) as f32,
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_time_ms = Some(now_ms);
        }
        delta
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume, taking `now_ms` as the new reference
    pub fn resume(&mut self, now_ms: f64) {
        self.paused = false;
        self.last_time_ms = Some(now_ms);
    }

    /// Follow the session's pause state. Call after each tick with
    /// `GameState::is_paused` so a pause toggled through `TickInput` also
    /// stops the clock, and the first delta after resuming is one frame.
    pub fn sync_pause(&mut self, paused: bool, now_ms: f64) {
        match (self.paused, paused) {
            (false, true) => self.pause(),
            (true, false) => self.resume(now_ms),
            _ => {}
        }
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Forget the previous timestamp
    pub fn reset(&mut self) {
        self.last_time_ms = None;
    }
}

/// Clamp `delta_ms` to `max_delta_ms`, then split it into equal sub-steps
/// of at most `max_step_ms`. Returns `(count, step_ms)`; a zero delta yields
/// a single zero-length step.
pub fn split_delta(delta_ms: f32, max_delta_ms: f32, max_step_ms: f32) -> (u32, f32) {
    let delta = if delta_ms.is_finite() {
        delta_ms.clamp(0.0, max_delta_ms)
    } else {
        0.0
    };
    // Epsilon keeps an exact multiple of the step from rounding up to one more
    let count = (delta / max_step_ms - 1e-4).ceil().max(1.0) as u32;
    (count, delta / count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_advance_is_zero() {
        let mut clock = GameClock::new();
        assert_eq!(clock.advance(1000.0), 0.0);
        assert!((clock.advance(1016.5) - 16.5).abs() < 1e-4);
    }

    #[test]
    fn test_backwards_time_is_zero() {
        let mut clock = GameClock::new();
        clock.advance(500.0);
        assert_eq!(clock.advance(400.0), 0.0);
        assert!((clock.advance(420.0) - 20.0).abs() < 1e-4);
        assert_eq!(clock.advance(f64::NAN), 0.0);
        assert!((clock.advance(430.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_pause_and_resume_skip_gap() {
        let mut clock = GameClock::new();
        clock.advance(0.0);
        clock.advance(16.0);
        clock.pause();
        assert!(clock.is_paused());
        assert_eq!(clock.advance(5000.0), 0.0);

        clock.resume(60_000.0);
        assert!(!clock.is_paused());
        assert!((clock.advance(60_016.0) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_sync_pause_follows_session() {
        let mut clock = GameClock::new();
        clock.advance(0.0);
        clock.sync_pause(false, 10.0);
        assert!(!clock.is_paused());
        assert!((clock.advance(16.0) - 16.0).abs() < 1e-4);

        clock.sync_pause(true, 16.0);
        assert_eq!(clock.advance(30_000.0), 0.0);
        // Repeated syncs while paused keep the clock stopped
        clock.sync_pause(true, 30_000.0);
        assert!(clock.is_paused());

        clock.sync_pause(false, 30_000.0);
        assert!((clock.advance(30_017.0) - 17.0).abs() < 1e-4);
    }

    #[test]
    fn test_reset_forgets_reference() {
        let mut clock = GameClock::new();
        clock.advance(0.0);
        clock.reset();
        assert_eq!(clock.advance(9000.0), 0.0);
    }

    #[test]
    fn test_split_delta() {
        let frame = 1000.0 / 60.0;
        assert_eq!(split_delta(0.0, 100.0, 2.0 * frame), (1, 0.0));

        let (n, step) = split_delta(frame, 100.0, 2.0 * frame);
        assert_eq!(n, 1);
        assert!((step - frame).abs() < 1e-4);

        // Clamped to 100ms, then three steps of 33.3ms
        let (n, step) = split_delta(5000.0, 100.0, 2.0 * frame);
        assert_eq!(n, 3);
        assert!((step * n as f32 - 100.0).abs() < 1e-3);
        assert!(step <= 2.0 * frame + 1e-4);

        assert_eq!(split_delta(-5.0, 100.0, 10.0), (1, 0.0));
        assert_eq!(split_delta(f32::INFINITY, 100.0, 10.0), (1, 0.0));
    }
}
