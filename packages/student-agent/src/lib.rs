//! Per-participant attention agent.
//!
//! Reads face-mesh landmarks from a [`provider::LandmarkProvider`], runs them
//! through the signal pipeline in [`agent::StudentAgent`], alerts locally when
//! attention drops, and posts an interval report to the classroom collector.

pub mod agent;
pub mod config;
pub mod platform;
pub mod provider;
pub mod reporter;

use std::sync::Arc;
use std::time::{Duration, Instant};

use attention_signals::AlertSink;
use thiserror::Error;
use tracing::{info, warn};

use crate::agent::StudentAgent;
use crate::config::AgentConfig;
use crate::provider::{LandmarkProvider, ProviderError};
use crate::reporter::{
    report_channel, DeliveryStats, Participant, ReportError, ReportSink, Reporter,
    REPORT_QUEUE_CAPACITY,
};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("frame loop panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub missed_frames: u64,
    pub skipped_lines: u64,
    pub reports: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: FrameStats,
    pub delivery: DeliveryStats,
}

/// Runs the frame loop on a blocking thread until the provider is exhausted,
/// then waits for queued reports to be delivered or dropped.
pub async fn run(
    config: AgentConfig,
    provider: Box<dyn LandmarkProvider>,
    alert_sink: Arc<dyn AlertSink>,
) -> Result<RunSummary, AgentError> {
    let reporter = Reporter::new(config.collector_url.as_str(), config.send_timeout)?;
    let (reports, rx) = report_channel(REPORT_QUEUE_CAPACITY);
    let delivery = tokio::spawn(reporter.run(rx));

    let agent = StudentAgent::new(
        Participant {
            id: config.student_id.clone(),
            name: config.student_name.clone(),
        },
        alert_sink,
        config.alert_cooldown,
        reports,
        config.report_interval,
        Instant::now(),
    );
    let pace = config.frame_interval;

    let frames = tokio::task::spawn_blocking(move || drive(agent, provider, pace)).await??;
    let delivery = delivery.await?;

    info!(
        frames = frames.frames,
        missed = frames.missed_frames,
        reports = frames.reports,
        delivered = delivery.delivered,
        "landmark stream finished"
    );
    Ok(RunSummary { frames, delivery })
}

/// Feeds every frame from `provider` through `agent`. Consumes the agent so
/// its report sink closes when the stream ends.
pub fn drive<A, R>(
    mut agent: StudentAgent<A, R>,
    mut provider: Box<dyn LandmarkProvider>,
    pace: Option<Duration>,
) -> Result<FrameStats, ProviderError>
where
    A: AlertSink,
    R: ReportSink,
{
    let mut stats = FrameStats::default();

    loop {
        let started = Instant::now();
        let capture = match provider.next_frame() {
            Ok(Some(capture)) => capture,
            Ok(None) => break,
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "skipping landmark frame");
                stats.skipped_lines += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let outcome = agent.tick(capture.frame(), Instant::now());
        stats.frames += 1;
        if outcome.report.is_some() {
            stats.reports += 1;
        }

        if let Some(pace) = pace {
            let spent = started.elapsed();
            if spent < pace {
                std::thread::sleep(pace - spent);
            }
        }
    }

    stats.missed_frames = agent.missed_frames();
    Ok(stats)
}
