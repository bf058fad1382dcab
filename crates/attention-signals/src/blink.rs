/// Consecutive closed frames needed before a reopening counts as a blink.
pub const BLINK_CONSEC_FRAMES: u32 = 3;

/// Debounced blink counter.
///
/// A blink is registered on the frame the eye reopens, and only if it stayed
/// closed for at least `min_run` consecutive frames.
#[derive(Debug, Clone)]
pub struct BlinkCounter {
    min_run: u32,
    run_length: u32,
    blink_count: u32,
}

impl Default for BlinkCounter {
    fn default() -> Self {
        Self::new(BLINK_CONSEC_FRAMES)
    }
}

impl BlinkCounter {
    pub fn new(min_run: u32) -> Self {
        Self {
            min_run: min_run.max(1),
            run_length: 0,
            blink_count: 0,
        }
    }

    /// Feeds one frame; returns `true` when this frame completed a blink.
    pub fn update(&mut self, is_closed: bool) -> bool {
        if is_closed {
            self.run_length = self.run_length.saturating_add(1);
            return false;
        }

        let blinked = self.run_length >= self.min_run;
        if blinked {
            self.blink_count += 1;
        }
        self.run_length = 0;
        blinked
    }

    pub fn blink_count(&self) -> u32 {
        self.blink_count
    }

    /// Clears the count but keeps an in-progress closure run.
    pub fn reset_count(&mut self) {
        self.blink_count = 0;
    }
}
