use serde::{Deserialize, Serialize};

use crate::features::FeatureSample;
use crate::status::AttentionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EyeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum YawningStatus {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeadStatus {
    Normal,
    Rotated,
}

/// Per-interval report a participant sends to the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentMetricsMessage {
    pub student_id: String,
    pub student_name: String,
    pub ear: f64,
    pub eye_status: EyeStatus,
    /// PERCLOS of the completed interval, 0..=100.
    pub fatigue: u8,
    pub yawning_status: YawningStatus,
    pub head_status: HeadStatus,
    pub status: AttentionStatus,
    /// Client wall clock, epoch seconds. Informational only.
    pub timestamp: f64,
}

impl StudentMetricsMessage {
    /// Builds a report from the interval's fatigue and the most recent frame.
    pub fn from_sample(
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        sample: &FeatureSample,
        fatigue: u8,
        status: AttentionStatus,
        timestamp: f64,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            student_name: student_name.into(),
            ear: sample.eye_ratio,
            eye_status: if sample.is_closed { EyeStatus::Closed } else { EyeStatus::Open },
            fatigue: fatigue.min(100),
            yawning_status: if sample.is_yawning { YawningStatus::Yes } else { YawningStatus::No },
            head_status: if sample.is_rotated { HeadStatus::Rotated } else { HeadStatus::Normal },
            status,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let sample = FeatureSample {
            eye_ratio: 0.18,
            is_closed: true,
            is_rotated: true,
            ..FeatureSample::default()
        };
        let msg = StudentMetricsMessage::from_sample(
            "ab12cd34",
            "Ada",
            &sample,
            55,
            AttentionStatus::Distracted,
            1_700_000_000.5,
        );

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["student_id"], "ab12cd34");
        assert_eq!(value["student_name"], "Ada");
        assert_eq!(value["eye_status"], "CLOSED");
        assert_eq!(value["yawning_status"], "NO");
        assert_eq!(value["head_status"], "ROTATED");
        assert_eq!(value["status"], "DISTRACTED");
        assert_eq!(value["fatigue"], 55);
    }

    #[test]
    fn test_rejects_out_of_range_fatigue() {
        let raw = r#"{"student_id":"a","student_name":"b","ear":0.3,"eye_status":"OPEN",
            "fatigue":300,"yawning_status":"NO","head_status":"NORMAL","status":"ACTIVE","timestamp":1.0}"#;
        assert!(serde_json::from_str::<StudentMetricsMessage>(raw).is_err());
    }
}
