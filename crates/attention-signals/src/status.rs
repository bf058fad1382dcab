use std::fmt;

use serde::{Deserialize, Serialize};

use crate::head_pose::ROTATED_YAW_DEGREES;

/// Fatigue below this percentage is active.
pub const ACTIVE_BELOW: f64 = 40.0;
/// Fatigue below this percentage (and not active) is passive; the rest is drowsy.
pub const PASSIVE_BELOW: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttentionStatus {
    Active,
    Passive,
    Drowsy,
    Distracted,
    Yawning,
}

impl AttentionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Passive => "PASSIVE",
            Self::Drowsy => "DROWSY",
            Self::Distracted => "DISTRACTED",
            Self::Yawning => "YAWNING",
        }
    }

    /// Statuses that warrant prompting the participant.
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::Distracted | Self::Drowsy | Self::Yawning)
    }
}

impl fmt::Display for AttentionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a fatigue percentage onto the three fatigue bands only.
pub fn fatigue_band(fatigue_percent: f64) -> AttentionStatus {
    if fatigue_percent < ACTIVE_BELOW {
        AttentionStatus::Active
    } else if fatigue_percent < PASSIVE_BELOW {
        AttentionStatus::Passive
    } else {
        AttentionStatus::Drowsy
    }
}

/// Classifies attention. Yawning, then a turned head, override the fatigue
/// band. `pitch` does not currently affect the outcome.
pub fn classify(fatigue_percent: f64, is_yawning: bool, yaw: f64, _pitch: f64) -> AttentionStatus {
    if is_yawning {
        return AttentionStatus::Yawning;
    }
    if yaw.abs() > ROTATED_YAW_DEGREES {
        return AttentionStatus::Distracted;
    }
    fatigue_band(fatigue_percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_yaw_overrides_fatigue() {
        assert_eq!(classify(50.0, false, 30.0, 0.0), AttentionStatus::Distracted);
        assert_eq!(classify(50.0, false, -30.0, 0.0), AttentionStatus::Distracted);
        assert_eq!(classify(50.0, false, 25.0, 0.0), AttentionStatus::Passive);
    }

    #[test]
    fn test_fatigue_bands() {
        assert_eq!(classify(35.0, false, 0.0, 0.0), AttentionStatus::Active);
        assert_eq!(classify(40.0, false, 0.0, 0.0), AttentionStatus::Passive);
        assert_eq!(classify(69.0, false, 0.0, 0.0), AttentionStatus::Passive);
        assert_eq!(classify(70.0, false, 0.0, 0.0), AttentionStatus::Drowsy);
        assert_eq!(classify(100.0, false, 0.0, 0.0), AttentionStatus::Drowsy);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&AttentionStatus::Distracted).unwrap(), "\"DISTRACTED\"");
        assert_eq!(AttentionStatus::Yawning.to_string(), "YAWNING");
        assert!(!AttentionStatus::Passive.needs_attention());
        assert!(AttentionStatus::Drowsy.needs_attention());
    }

    proptest! {
        #[test]
        fn prop_yawning_always_wins(
            fatigue in 0.0f64..=100.0,
            yaw in -90.0f64..90.0,
            pitch in -90.0f64..90.0,
        ) {
            prop_assert_eq!(classify(fatigue, true, yaw, pitch), AttentionStatus::Yawning);
        }
    }
}
