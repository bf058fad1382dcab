//! PERCLOS (percentage of eye closure) windows.
//!
//! Two views over the same closure flags: a batch that is drained once per
//! report interval, and a short fixed-capacity FIFO used for local alerting.

use std::collections::VecDeque;

/// About ten seconds of frames at 30 fps.
pub const SLIDING_WINDOW_FRAMES: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PERCLOSResult {
    /// Closed-frame share, 0..=100, truncated.
    pub perclos: u8,
    pub total_frames: u32,
    pub closed_frames: u32,
}

#[inline]
fn percent(closed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (closed * 100 / total).min(100) as u8
}

/// Closure counts for the interval since the last report.
#[derive(Debug, Clone, Default)]
pub struct BatchAccumulator {
    closed_frames: u32,
    total_frames: u32,
}

impl BatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, is_closed: bool) {
        self.total_frames = self.total_frames.saturating_add(1);
        if is_closed {
            self.closed_frames = self.closed_frames.saturating_add(1);
        }
    }

    pub fn calculate(&self) -> PERCLOSResult {
        PERCLOSResult {
            perclos: percent(self.closed_frames as usize, self.total_frames as usize),
            total_frames: self.total_frames,
            closed_frames: self.closed_frames,
        }
    }

    /// Returns the completed interval and starts a fresh one.
    pub fn drain(&mut self) -> PERCLOSResult {
        let result = self.calculate();
        self.reset();
        result
    }

    pub fn reset(&mut self) {
        self.closed_frames = 0;
        self.total_frames = 0;
    }
}

/// Fixed-capacity FIFO of closure flags; the oldest flag falls out when full.
#[derive(Debug, Clone)]
pub struct SlidingBuffer {
    samples: VecDeque<bool>,
    capacity: usize,
    closed: usize,
}

impl Default for SlidingBuffer {
    fn default() -> Self {
        Self::new(SLIDING_WINDOW_FRAMES)
    }
}

impl SlidingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            closed: 0,
        }
    }

    pub fn push(&mut self, is_closed: bool) {
        if self.samples.len() == self.capacity {
            if let Some(true) = self.samples.pop_front() {
                self.closed -= 1;
            }
        }
        self.samples.push_back(is_closed);
        if is_closed {
            self.closed += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Smoothed closure percentage, 0 when empty.
    pub fn perclos(&self) -> u8 {
        percent(self.closed, self.samples.len())
    }
}
