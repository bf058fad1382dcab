//! Synthetic landmark frames for tests in this and dependent crates.
//!
//! Enabled with the `fixtures` feature.

pub use crate::ear::test_support::{blank_frame, set_eye};
pub use crate::head_pose::test_support::posed_frame;
pub use crate::yawn::test_support::set_mouth;

use crate::ear::{LandmarkFrame, Point3D, LEFT_EYE, RIGHT_EYE};

const EYE_WIDTH_PX: f64 = 60.0;

/// Lays out an eye between a fixed outer corner and an inner corner
/// `EYE_WIDTH_PX` toward the nose, with aspect ratio `ear`.
fn anchor_eye(frame: &mut LandmarkFrame, indices: &[usize; 6], outer: usize, inward: f64, ear: f64) {
    let (w, h) = (frame.width as f64, frame.height as f64);
    let corner = frame.pixel(outer);
    let (x0, y) = (corner.x, corner.y);
    let x1 = x0 + inward * EYE_WIDTH_PX;
    let (left, right) = if x0 < x1 { (x0, x1) } else { (x1, x0) };
    let half_gap = ear * EYE_WIDTH_PX / 2.0;
    let at = |x: f64, y: f64| Point3D::new(x / w, y / h, 0.0);

    // Landmark order within each eye: corner, upper, upper, corner, lower, lower.
    let (first, last) = if indices[0] == outer { (x0, x1) } else { (x1, x0) };
    let upper_a = left + EYE_WIDTH_PX / 3.0;
    let upper_b = right - EYE_WIDTH_PX / 3.0;
    frame.points[indices[0]] = at(first, y);
    frame.points[indices[3]] = at(last, y);
    frame.points[indices[1]] = at(upper_a, y - half_gap);
    frame.points[indices[5]] = at(upper_a, y + half_gap);
    frame.points[indices[2]] = at(upper_b, y - half_gap);
    frame.points[indices[4]] = at(upper_b, y + half_gap);
}

/// A full face turned by `yaw` degrees, eyes at `ear`, mouth at `mar`.
///
/// The outer eye corners are pose landmarks too; they stay where the posed
/// head put them so the solved pose matches `yaw`.
pub fn face_frame(ear: f64, mar: f64, yaw: f64) -> LandmarkFrame {
    let mut frame = posed_frame(0.0, yaw, 0.0);
    anchor_eye(&mut frame, &LEFT_EYE, LEFT_EYE[0], 1.0, ear);
    anchor_eye(&mut frame, &RIGHT_EYE, RIGHT_EYE[3], -1.0, ear);
    set_mouth(&mut frame, mar);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{estimate_head_pose, eye_aspect_ratio, mouth_aspect_ratio};

    #[test]
    fn test_face_frame_is_consistent() {
        let frame = face_frame(0.3, 0.2, 0.0);
        let ear = eye_aspect_ratio(&frame).unwrap();
        assert!((ear.avg_ear - 0.3).abs() < 1e-9);
        assert!((mouth_aspect_ratio(&frame).unwrap().mar - 0.2).abs() < 1e-9);
        assert!(estimate_head_pose(&frame).unwrap().yaw.abs() < 0.5);
    }

    #[test]
    fn test_turned_face_keeps_pose() {
        let pose = estimate_head_pose(&face_frame(0.3, 0.2, 30.0)).unwrap();
        assert!((pose.yaw - 30.0).abs() < 0.5);
        assert!(pose.is_rotated());
    }
}
