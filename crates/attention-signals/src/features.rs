use crate::ear::{eye_aspect_ratio, is_eye_closed, LandmarkFrame};
use crate::head_pose::{estimate_head_pose, HeadPose};
use crate::yawn::mouth_aspect_ratio;

/// Scalar signals derived from a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureSample {
    pub eye_ratio: f64,
    pub mouth_ratio: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
    pub is_closed: bool,
    pub is_yawning: bool,
    pub is_rotated: bool,
}

/// Outcome of feature extraction for one frame.
///
/// Frames without a usable face carry no signal and must not be fed to the
/// closure windows; both variants keep that decision in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameFeatures {
    Detected(FeatureSample),
    /// No landmarks, or the pose solve failed. Holds the degraded all-zero values.
    Missing(FeatureSample),
}

impl FrameFeatures {
    pub fn sample(&self) -> &FeatureSample {
        match self {
            Self::Detected(sample) | Self::Missing(sample) => sample,
        }
    }

    pub fn detected(&self) -> Option<&FeatureSample> {
        match self {
            Self::Detected(sample) => Some(sample),
            Self::Missing(_) => None,
        }
    }
}

/// Stateless conversion of landmark frames into [`FeatureSample`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, frame: Option<&LandmarkFrame>) -> FrameFeatures {
        let Some(frame) = frame else {
            return FrameFeatures::Missing(FeatureSample::default());
        };

        let (Some(ear), Some(mar)) = (eye_aspect_ratio(frame), mouth_aspect_ratio(frame)) else {
            return FrameFeatures::Missing(FeatureSample::default());
        };

        let Some(pose) = estimate_head_pose(frame) else {
            tracing::trace!("head pose unavailable for frame");
            return FrameFeatures::Missing(FeatureSample::default());
        };

        FrameFeatures::Detected(Self::combine(ear.avg_ear, mar.mar, mar.is_yawning, pose))
    }

    fn combine(eye_ratio: f64, mouth_ratio: f64, is_yawning: bool, pose: HeadPose) -> FeatureSample {
        FeatureSample {
            eye_ratio,
            mouth_ratio,
            pitch: pose.pitch,
            yaw: pose.yaw,
            roll: pose.roll,
            is_closed: is_eye_closed(eye_ratio),
            is_yawning,
            is_rotated: pose.is_rotated(),
        }
    }
}
