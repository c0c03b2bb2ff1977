//! Heartbeat timer.

/// Fires once per elapsed interval, measured against a reference timestamp.
///
/// Missed intervals are not caught up: after a long stall a single heartbeat
/// fires and the reference moves to the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    interval_ms: u32,
    last_ms: u32,
}

impl Heartbeat {
    /// Create a timer whose first window starts at `now_ms`.
    pub fn new(interval_ms: u32, now_ms: u32) -> Self {
        Heartbeat {
            interval_ms,
            last_ms: now_ms,
        }
    }

    /// Restart the current window at `now_ms`.
    pub fn reset(&mut self, now_ms: u32) {
        self.last_ms = now_ms;
    }

    /// Returns `true` if a heartbeat is due at `now_ms`, and starts a new window.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_ms) >= self.interval_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_heartbeat_before_first_window() {
        let mut hb = Heartbeat::new(1000, 0);
        for t in 0..1000 {
            assert!(!hb.poll(t), "fired at {}", t);
        }
        assert!(hb.poll(1000));
    }

    #[test]
    fn test_once_per_window() {
        let mut hb = Heartbeat::new(1000, 0);
        let fired = (0..=10_000).step_by(7).filter(|&t| hb.poll(t)).count();
        // Each firing happens at the first poll at or after the window end, so
        // windows stretch slightly past 1000 ms.
        assert!((9..=10).contains(&fired), "fired {} times", fired);
    }

    #[test]
    fn test_no_catch_up() {
        let mut hb = Heartbeat::new(1000, 0);
        assert!(hb.poll(5500));
        assert!(!hb.poll(5501));
        assert!(!hb.poll(6499));
        assert!(hb.poll(6500));
    }

    #[test]
    fn test_wraparound() {
        let mut hb = Heartbeat::new(1000, u32::MAX - 100);
        assert!(!hb.poll(u32::MAX));
        assert!(!hb.poll(898));
        assert!(hb.poll(899));
    }
}
