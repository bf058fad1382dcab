use std::time::{Duration, Instant};

use attention_signals::{classify, FeatureSample, StudentMetricsMessage, TemporalAggregator};
use reqwest::StatusCode;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Reports waiting for delivery; beyond this the newest report is dropped.
pub const REPORT_QUEUE_CAPACITY: usize = 4;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("collector responded with {0}")]
    Status(StatusCode),
}

/// Who the reports are about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

/// Decides when an interval is complete and turns it into a report.
///
/// Intervals are measured from the previous attempt, not a fixed grid.
#[derive(Debug, Clone)]
pub struct ReportingScheduler {
    interval: Duration,
    last_attempt: Instant,
}

impl ReportingScheduler {
    pub fn new(interval: Duration, started_at: Instant) -> Self {
        Self {
            interval,
            last_attempt: started_at,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_attempt) >= self.interval
    }

    /// Completes the batch and builds its report once the interval has
    /// elapsed. The batch is reset whether or not the report is delivered.
    pub fn poll(
        &mut self,
        now: Instant,
        aggregator: &mut TemporalAggregator,
        participant: &Participant,
        last_sample: &FeatureSample,
        timestamp: f64,
    ) -> Option<StudentMetricsMessage> {
        if !self.is_due(now) {
            return None;
        }
        self.last_attempt = now;

        let batch = aggregator.complete_batch();
        let fatigue = batch.perclos.perclos;
        let status = classify(
            f64::from(fatigue),
            last_sample.is_yawning,
            last_sample.yaw,
            last_sample.pitch,
        );

        info!(
            fatigue,
            frames = batch.perclos.total_frames,
            blinks = batch.blink_count,
            %status,
            "interval complete"
        );

        Some(StudentMetricsMessage::from_sample(
            participant.id.as_str(),
            participant.name.as_str(),
            last_sample,
            fatigue,
            status,
            timestamp,
        ))
    }
}

/// Hand-off point between the frame loop and delivery. Must not block.
pub trait ReportSink: Send {
    /// Queues `message`; returns false if it was dropped.
    fn submit(&self, message: StudentMetricsMessage) -> bool;
}

#[derive(Debug, Clone)]
pub struct ChannelReportSink {
    tx: mpsc::Sender<StudentMetricsMessage>,
}

impl ReportSink for ChannelReportSink {
    fn submit(&self, message: StudentMetricsMessage) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("report queue full, dropping report");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("report worker stopped, dropping report");
                false
            }
        }
    }
}

/// Bounded report queue: the sink for the frame loop and the receiving end
/// for [`Reporter::run`].
pub fn report_channel(capacity: usize) -> (ChannelReportSink, mpsc::Receiver<StudentMetricsMessage>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelReportSink { tx }, rx)
}

/// Posts reports to the collector's update endpoint.
#[derive(Debug, Clone)]
pub struct Reporter {
    client: reqwest::Client,
    endpoint: String,
}

impl Reporter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ReportError::Client)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub async fn send(&self, message: &StudentMetricsMessage) -> Result<(), ReportError> {
        let response = self.client.post(&self.endpoint).json(message).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Status(status));
        }
        Ok(())
    }

    /// Delivers queued reports until every sender is dropped. Failed reports
    /// are dropped; there is no retry.
    pub async fn run(self, mut rx: mpsc::Receiver<StudentMetricsMessage>) -> DeliveryStats {
        let mut stats = DeliveryStats::default();

        while let Some(message) = rx.recv().await {
            match self.send(&message).await {
                Ok(()) => {
                    stats.delivered += 1;
                    debug!(fatigue = message.fatigue, status = %message.status, "report delivered");
                }
                Err(e) => {
                    stats.dropped += 1;
                    debug!(error = %e, endpoint = %self.endpoint, "report not delivered");
                }
            }
        }

        stats
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub dropped: u64,
}
