use crate::blink::BlinkCounter;
use crate::features::FeatureSample;
use crate::perclos::{BatchAccumulator, PERCLOSResult, SlidingBuffer};

/// Summary of a completed report interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub perclos: PERCLOSResult,
    pub blink_count: u32,
}

/// Windowed eye-closure metrics over detected frames.
///
/// Owned by the frame loop; nothing here is shared across threads.
#[derive(Debug, Clone, Default)]
pub struct TemporalAggregator {
    batch: BatchAccumulator,
    sliding: SlidingBuffer,
    blinks: BlinkCounter,
}

impl TemporalAggregator {
    pub fn new(sliding_capacity: usize, blink_min_run: u32) -> Self {
        Self {
            batch: BatchAccumulator::new(),
            sliding: SlidingBuffer::new(sliding_capacity),
            blinks: BlinkCounter::new(blink_min_run),
        }
    }

    /// Records one detected frame. Frames without a face must not be passed here.
    pub fn observe(&mut self, sample: &FeatureSample) {
        self.batch.add_sample(sample.is_closed);
        self.sliding.push(sample.is_closed);
        self.blinks.update(sample.is_closed);
    }

    /// Live smoothed closure percentage for local alerting.
    pub fn live_perclos(&self) -> u8 {
        self.sliding.perclos()
    }

    /// Closure percentage of the interval in progress.
    pub fn batch_perclos(&self) -> u8 {
        self.batch.calculate().perclos
    }

    pub fn blink_count(&self) -> u32 {
        self.blinks.blink_count()
    }

    /// Closes the current interval: returns its summary and resets the batch
    /// counters and blink count. The sliding window is untouched.
    pub fn complete_batch(&mut self) -> BatchSummary {
        let summary = BatchSummary {
            perclos: self.batch.drain(),
            blink_count: self.blinks.blink_count(),
        };
        self.blinks.reset_count();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(is_closed: bool) -> FeatureSample {
        FeatureSample {
            is_closed,
            ..FeatureSample::default()
        }
    }

    #[test]
    fn test_batch_and_sliding_diverge_after_reset() {
        let mut agg = TemporalAggregator::new(10, 3);
        for _ in 0..4 {
            agg.observe(&sample(true));
        }
        agg.observe(&sample(false));

        assert_eq!(agg.batch_perclos(), 80);
        let summary = agg.complete_batch();
        assert_eq!(summary.perclos.perclos, 80);
        assert_eq!(summary.blink_count, 1);

        assert_eq!(agg.batch_perclos(), 0);
        assert_eq!(agg.blink_count(), 0);
        assert_eq!(agg.live_perclos(), 80);
    }

    #[test]
    fn test_empty_interval() {
        let mut agg = TemporalAggregator::default();
        let summary = agg.complete_batch();
        assert_eq!(summary.perclos.perclos, 0);
        assert_eq!(summary.perclos.total_frames, 0);
        assert_eq!(agg.live_perclos(), 0);
    }
}
