use std::collections::HashMap;
use std::time::Duration;

use attention_signals::{AttentionStatus, EyeStatus, HeadStatus, StudentMetricsMessage, YawningStatus};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use super::rollup::{summarize, SessionReport};

/// Latest known state of one participant plus session accumulators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantRecord {
    pub name: String,
    pub ear: f64,
    pub eye_status: EyeStatus,
    pub fatigue: u8,
    pub yawning_status: YawningStatus,
    pub head_status: HeadStatus,
    pub status: AttentionStatus,
    /// Server receipt time, epoch seconds. Never decreases for a participant.
    pub timestamp: f64,
    #[serde(skip)]
    pub fatigue_sum: u64,
    #[serde(skip)]
    pub sample_count: u64,
}

impl ParticipantRecord {
    fn new(message: &StudentMetricsMessage, now: f64) -> Self {
        Self {
            name: message.student_name.clone(),
            ear: message.ear,
            eye_status: message.eye_status,
            fatigue: message.fatigue,
            yawning_status: message.yawning_status,
            head_status: message.head_status,
            status: message.status,
            timestamp: now,
            fatigue_sum: u64::from(message.fatigue),
            sample_count: 1,
        }
    }

    fn apply(&mut self, message: &StudentMetricsMessage, now: f64) {
        self.name.clone_from(&message.student_name);
        self.ear = message.ear;
        self.eye_status = message.eye_status;
        self.fatigue = message.fatigue;
        self.yawning_status = message.yawning_status;
        self.head_status = message.head_status;
        self.status = message.status;
        self.timestamp = self.timestamp.max(now);
        self.fatigue_sum += u64::from(message.fatigue);
        self.sample_count += 1;
    }

    /// Session-average fatigue: running mean when samples exist, otherwise
    /// the last observed value.
    pub fn average_fatigue(&self) -> u8 {
        if self.sample_count > 0 {
            (self.fatigue_sum / self.sample_count).min(100) as u8
        } else {
            self.fatigue
        }
    }
}

/// Snapshot of a record taken when it was evicted for inactivity.
pub type HistoryRecord = ParticipantRecord;

pub type ActiveParticipants = HashMap<String, ParticipantRecord>;

#[derive(Debug, Default)]
struct SessionState {
    live: HashMap<String, ParticipantRecord>,
    history: HashMap<String, HistoryRecord>,
}

/// The session store: live participants and evicted history behind a single
/// lock. Every public operation is one critical section.
#[derive(Debug, Default)]
pub struct SessionService {
    state: Mutex<SessionState>,
}

pub fn now_epoch_seconds() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&self, message: &StudentMetricsMessage) {
        self.ingest_at(message, now_epoch_seconds());
    }

    /// Upserts the participant's record, stamping it with `now`.
    pub fn ingest_at(&self, message: &StudentMetricsMessage, now: f64) {
        let mut state = self.state.lock();
        let id = message.student_id.as_str();

        if let Some(record) = state.live.get_mut(id) {
            record.apply(message, now);
            debug!(student_id = %id, fatigue = message.fatigue, status = %message.status, "report ingested");
            return;
        }

        let record = match state.history.remove(id) {
            Some(mut returning) => {
                returning.apply(message, now);
                info!(student_id = %id, name = %message.student_name, "participant reconnected");
                returning
            }
            None => {
                info!(student_id = %id, name = %message.student_name, "participant joined");
                ParticipantRecord::new(message, now)
            }
        };
        state.live.insert(id.to_string(), record);
    }

    pub fn snapshot_active(&self, idle_threshold: Duration) -> ActiveParticipants {
        self.snapshot_active_at(idle_threshold, now_epoch_seconds())
    }

    /// Moves participants idle for longer than `idle_threshold` into history
    /// and returns a copy of the remaining live set.
    pub fn snapshot_active_at(&self, idle_threshold: Duration, now: f64) -> ActiveParticipants {
        let idle_secs = idle_threshold.as_secs_f64();
        let mut state = self.state.lock();

        let idle: Vec<String> = state
            .live
            .iter()
            .filter(|(_, record)| now - record.timestamp > idle_secs)
            .map(|(id, _)| id.clone())
            .collect();

        for id in idle {
            if let Some(record) = state.live.remove(&id) {
                info!(student_id = %id, name = %record.name, "participant idle, moved to history");
                state.history.insert(id, record);
            }
        }

        state.live.clone()
    }

    /// Rolls up history and live participants into the session report, then
    /// clears the session. Both happen under the same lock, so a concurrent
    /// ingest lands entirely before the rollup or entirely in the next session.
    pub fn end_session(&self) -> SessionReport {
        let mut state = self.state.lock();
        let report = summarize(state.history.iter().chain(state.live.iter()));
        Self::clear_locked(&mut state);

        info!(
            total_students = report.summary.total_students,
            class_average_fatigue = report.summary.class_average_fatigue,
            engagement_score = report.summary.engagement_score,
            "session ended"
        );
        report
    }

    /// Drops every live and historical record.
    pub fn clear_all(&self) {
        let mut state = self.state.lock();
        Self::clear_locked(&mut state);
    }

    fn clear_locked(state: &mut SessionState) {
        state.live.clear();
        state.history.clear();
    }

    pub fn active_count(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn history_count(&self) -> usize {
        self.state.lock().history.len()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn message(id: &str, name: &str, fatigue: u8) -> StudentMetricsMessage {
        StudentMetricsMessage {
            student_id: id.to_string(),
            student_name: name.to_string(),
            ear: 0.3,
            eye_status: EyeStatus::Open,
            fatigue,
            yawning_status: YawningStatus::No,
            head_status: HeadStatus::Normal,
            status: attention_signals::fatigue_band(f64::from(fatigue)),
            timestamp: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::message;
    use super::*;

    const IDLE: Duration = Duration::from_secs(15);

    #[test]
    fn test_ingest_accumulates() {
        let service = SessionService::new();
        service.ingest_at(&message("a", "Ada", 30), 100.0);
        service.ingest_at(&message("a", "Ada", 50), 110.0);

        let active = service.snapshot_active_at(IDLE, 111.0);
        let record = &active["a"];
        assert_eq!(record.fatigue, 50);
        assert_eq!(record.fatigue_sum, 80);
        assert_eq!(record.sample_count, 2);
        assert_eq!(record.average_fatigue(), 40);
        assert_eq!(record.timestamp, 110.0);
    }

    #[test]
    fn test_server_timestamp_never_decreases() {
        let service = SessionService::new();
        service.ingest_at(&message("a", "Ada", 30), 200.0);
        service.ingest_at(&message("a", "Ada", 30), 190.0);

        let active = service.snapshot_active_at(IDLE, 200.0);
        assert_eq!(active["a"].timestamp, 200.0);
    }

    #[test]
    fn test_idle_participant_moves_to_history() {
        let service = SessionService::new();
        service.ingest_at(&message("a", "Ada", 30), 100.0);
        service.ingest_at(&message("b", "Bob", 80), 110.0);

        let active = service.snapshot_active_at(IDLE, 116.0);
        assert!(!active.contains_key("a"));
        assert!(active.contains_key("b"));
        assert_eq!(service.active_count(), 1);
        assert_eq!(service.history_count(), 1);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let service = SessionService::new();
        service.ingest_at(&message("a", "Ada", 30), 100.0);
        assert!(service.snapshot_active_at(IDLE, 115.0).contains_key("a"));
    }

    #[test]
    fn test_returning_participant_leaves_history() {
        let service = SessionService::new();
        service.ingest_at(&message("a", "Ada", 20), 100.0);
        service.snapshot_active_at(IDLE, 200.0);
        assert_eq!(service.history_count(), 1);

        service.ingest_at(&message("a", "Ada", 40), 201.0);
        assert_eq!(service.history_count(), 0);
        let active = service.snapshot_active_at(IDLE, 202.0);
        assert_eq!(active["a"].sample_count, 2);
        assert_eq!(active["a"].average_fatigue(), 30);
    }

    #[test]
    fn test_end_session_rolls_up_and_clears() {
        let service = SessionService::new();
        for t in 0..3 {
            service.ingest_at(&message("a", "Ada", 30), 100.0 + t as f64);
        }
        for t in 0..2 {
            service.ingest_at(&message("b", "Bob", 80), 100.0 + t as f64);
        }

        let report = service.end_session();
        assert_eq!(report.students["a"].fatigue, 30);
        assert_eq!(report.students["a"].status, AttentionStatus::Active);
        assert_eq!(report.students["b"].fatigue, 80);
        assert_eq!(report.students["b"].status, AttentionStatus::Drowsy);
        assert_eq!(report.summary.class_average_fatigue, 55.0);
        assert_eq!(report.summary.engagement_score, 45.0);
        assert_eq!(report.summary.total_students, 2);

        assert_eq!(service.active_count(), 0);
        assert_eq!(service.history_count(), 0);
    }

    #[test]
    fn test_evicted_record_reported_unchanged() {
        let service = SessionService::new();
        service.ingest_at(&message("a", "Ada", 60), 100.0);
        service.snapshot_active_at(IDLE, 500.0);

        let report = service.end_session();
        assert_eq!(report.students["a"].name, "Ada");
        assert_eq!(report.students["a"].fatigue, 60);
        assert_eq!(report.students["a"].status, AttentionStatus::Passive);
    }

    #[test]
    fn test_clear_all() {
        let service = SessionService::new();
        service.ingest_at(&message("a", "Ada", 60), 100.0);
        service.snapshot_active_at(IDLE, 500.0);
        service.ingest_at(&message("b", "Bob", 60), 500.0);
        service.clear_all();
        assert_eq!(service.active_count(), 0);
        assert_eq!(service.history_count(), 0);
    }

    #[test]
    fn test_concurrent_ingest_never_lost_or_double_counted() {
        use std::sync::Arc;

        let service = Arc::new(SessionService::new());
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        service.ingest(&message(&format!("w{w}-{i}"), "P", 10));
                    }
                })
            })
            .collect();

        let mut reported = 0;
        for _ in 0..20 {
            reported += service.end_session().summary.total_students;
        }
        for writer in writers {
            writer.join().unwrap();
        }
        reported += service.end_session().summary.total_students;

        assert_eq!(reported, 1000);
    }

    #[test]
    fn test_average_falls_back_to_last_fatigue() {
        let mut record = ParticipantRecord::new(&message("a", "Ada", 70), 0.0);
        record.fatigue_sum = 0;
        record.sample_count = 0;
        assert_eq!(record.average_fatigue(), 70);
    }
}
