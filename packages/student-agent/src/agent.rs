use std::time::{Duration, Instant};

use attention_signals::{
    classify, AlertController, AlertSink, AttentionStatus, FeatureExtractor, FeatureSample,
    FrameFeatures, LandmarkFrame, StudentMetricsMessage, TemporalAggregator, BLINK_CONSEC_FRAMES,
    SLIDING_WINDOW_FRAMES,
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::reporter::{Participant, ReportSink, ReportingScheduler};

/// What happened during one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub features: FrameFeatures,
    /// Live status; `None` when the frame had no usable face.
    pub status: Option<AttentionStatus>,
    pub alerted: bool,
    /// Report built this tick, whether or not it was queued.
    pub report: Option<StudentMetricsMessage>,
}

/// The per-participant pipeline: extraction, windows, classification,
/// alerting, and interval reports. Owned by a single frame loop.
pub struct StudentAgent<A, R> {
    participant: Participant,
    extractor: FeatureExtractor,
    aggregator: TemporalAggregator,
    alerts: AlertController<A>,
    scheduler: ReportingScheduler,
    reports: R,
    last_sample: FeatureSample,
    missed_frames: u64,
}

fn now_epoch_seconds() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

impl<A: AlertSink, R: ReportSink> StudentAgent<A, R> {
    pub fn new(
        participant: Participant,
        alert_sink: A,
        alert_cooldown: Duration,
        reports: R,
        report_interval: Duration,
        started_at: Instant,
    ) -> Self {
        Self {
            participant,
            extractor: FeatureExtractor::new(),
            aggregator: TemporalAggregator::new(SLIDING_WINDOW_FRAMES, BLINK_CONSEC_FRAMES),
            alerts: AlertController::new(alert_sink, alert_cooldown),
            scheduler: ReportingScheduler::new(report_interval, started_at),
            reports,
            last_sample: FeatureSample::default(),
            missed_frames: 0,
        }
    }

    pub fn aggregator(&self) -> &TemporalAggregator {
        &self.aggregator
    }

    /// Frames seen without a usable face since start.
    pub fn missed_frames(&self) -> u64 {
        self.missed_frames
    }

    /// Processes one frame. `frame` is `None` when nothing was detected.
    pub fn tick(&mut self, frame: Option<&LandmarkFrame>, now: Instant) -> TickOutcome {
        let features = self.extractor.extract(frame);

        let mut status = None;
        let mut alerted = false;
        match features.detected() {
            Some(sample) => {
                self.aggregator.observe(sample);
                self.last_sample = *sample;

                let live = classify(
                    f64::from(self.aggregator.live_perclos()),
                    sample.is_yawning,
                    sample.yaw,
                    sample.pitch,
                );
                alerted = self.alerts.evaluate(live, now);
                status = Some(live);
            }
            None => self.missed_frames += 1,
        }

        let report = self.scheduler.poll(
            now,
            &mut self.aggregator,
            &self.participant,
            &self.last_sample,
            now_epoch_seconds(),
        );
        if let Some(message) = &report {
            if self.reports.submit(message.clone()) {
                debug!(fatigue = message.fatigue, "report queued");
            } else {
                warn!(fatigue = message.fatigue, "report dropped before delivery");
            }
        }

        TickOutcome {
            features,
            status,
            alerted,
            report,
        }
    }
}
