//! Attention signals derived from face-mesh landmarks.
//!
//! Frame in, status out: [`FeatureExtractor`] turns landmarks into ratios and
//! head pose, [`TemporalAggregator`] keeps the PERCLOS windows,
//! [`classify`] maps them to an [`AttentionStatus`], and [`AlertController`]
//! rate-limits local prompts.

mod alert;
mod blink;
mod ear;
mod features;
mod head_pose;
mod perclos;
mod report;
mod status;
mod temporal;
mod yawn;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use alert::*;
pub use blink::*;
pub use ear::*;
pub use features::*;
pub use head_pose::*;
pub use perclos::*;
pub use report::*;
pub use status::*;
pub use temporal::*;
pub use yawn::*;
