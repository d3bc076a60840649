use std::time::Instant;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the clock was created (monotonic).
    pub elapsed: f32,
}

/// Wall-clock origin for the shader's `time` uniform.
///
/// Elapsed time is never clamped: a stall (debugger, minimized window,
/// fullscreen transition) shows up as a jump, like any animation driven by
/// real time.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Returns the `FrameTime` for the frame about to be drawn.
    pub fn tick(&mut self) -> FrameTime {
        FrameTime {
            elapsed: Instant::now()
                .saturating_duration_since(self.origin)
                .as_secs_f32(),
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_near_zero() {
        let mut clock = FrameClock::new();
        assert!(clock.tick().elapsed < 1.0);
    }

    #[test]
    fn elapsed_is_monotonic_and_unclamped() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        std::thread::sleep(Duration::from_millis(300));
        let b = clock.tick();

        assert!(b.elapsed >= a.elapsed);
        assert!(b.elapsed - a.elapsed >= 0.290);
    }
}
