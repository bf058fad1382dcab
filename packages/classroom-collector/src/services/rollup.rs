use std::collections::BTreeMap;

use attention_signals::{fatigue_band, AttentionStatus};
use serde::Serialize;

use super::session::ParticipantRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantSummary {
    pub name: String,
    /// Session status from the average fatigue band alone.
    pub status: AttentionStatus,
    /// Average fatigue over the session.
    pub fatigue: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub class_average_fatigue: f64,
    pub engagement_score: f64,
    pub total_students: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub students: BTreeMap<String, ParticipantSummary>,
    pub summary: ClassSummary,
}

/// Rounds to one decimal from the exact binary value, ties to even.
fn round1(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Builds the end-of-session report. Momentary overrides (yawning, looking
/// away) are not reapplied; only the fatigue band of each average counts.
pub fn summarize<'a, I>(records: I) -> SessionReport
where
    I: IntoIterator<Item = (&'a String, &'a ParticipantRecord)>,
{
    let students: BTreeMap<String, ParticipantSummary> = records
        .into_iter()
        .map(|(id, record)| {
            let fatigue = record.average_fatigue();
            let summary = ParticipantSummary {
                name: record.name.clone(),
                status: fatigue_band(f64::from(fatigue)),
                fatigue,
            };
            (id.clone(), summary)
        })
        .collect();

    let total_students = students.len();
    let class_average_fatigue = if total_students == 0 {
        0.0
    } else {
        let total: u64 = students.values().map(|s| u64::from(s.fatigue)).sum();
        round1(total as f64 / total_students as f64)
    };

    SessionReport {
        students,
        summary: ClassSummary {
            class_average_fatigue,
            engagement_score: round1(100.0 - class_average_fatigue),
            total_students,
        },
    }
}
