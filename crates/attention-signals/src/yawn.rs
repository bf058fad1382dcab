use crate::ear::{euclidean_distance, LandmarkFrame};

const MOUTH_TOP: usize = 13;
const MOUTH_BOTTOM: usize = 14;
const MOUTH_LEFT: usize = 78;
const MOUTH_RIGHT: usize = 308;

/// Mouth openness above this ratio counts as a yawn; talking stays well below 0.5.
pub const YAWN_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MARResult {
    pub mar: f64,
    pub is_yawning: bool,
}

/// Mouth aspect ratio over the inner-lip landmarks. `None` when the frame holds no face.
pub fn mouth_aspect_ratio(frame: &LandmarkFrame) -> Option<MARResult> {
    if !frame.has_face() {
        return None;
    }

    let top = frame.pixel(MOUTH_TOP);
    let bottom = frame.pixel(MOUTH_BOTTOM);
    let left = frame.pixel(MOUTH_LEFT);
    let right = frame.pixel(MOUTH_RIGHT);

    let vertical = euclidean_distance(&top, &bottom);
    let horizontal = euclidean_distance(&left, &right);

    let mar = if horizontal == 0.0 { 0.0 } else { vertical / horizontal };
    Some(MARResult {
        mar,
        is_yawning: mar > YAWN_THRESHOLD,
    })
}

#[cfg(any(test, feature = "fixtures"))]
pub(crate) mod test_support {
    use super::*;
    use crate::ear::Point3D;

    pub fn set_mouth(frame: &mut LandmarkFrame, mar: f64) {
        let w = frame.width as f64;
        let h = frame.height as f64;
        let half_width = 40.0;
        let half_gap = mar * half_width;
        let (cx, cy) = (0.5 * w, 0.7 * h);
        let at = |x: f64, y: f64| Point3D::new(x / w, y / h, 0.0);

        frame.points[MOUTH_LEFT] = at(cx - half_width, cy);
        frame.points[MOUTH_RIGHT] = at(cx + half_width, cy);
        frame.points[MOUTH_TOP] = at(cx, cy - half_gap);
        frame.points[MOUTH_BOTTOM] = at(cx, cy + half_gap);
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::set_mouth;
    use super::*;
    use crate::ear::test_support::blank_frame;

    #[test]
    fn test_wide_open_mouth_is_yawn() {
        let mut frame = blank_frame();
        set_mouth(&mut frame, 0.9);
        let result = mouth_aspect_ratio(&frame).unwrap();
        assert!((result.mar - 0.9).abs() < 1e-9);
        assert!(result.is_yawning);
    }

    #[test]
    fn test_talking_is_not_yawn() {
        let mut frame = blank_frame();
        set_mouth(&mut frame, 0.4);
        assert!(!mouth_aspect_ratio(&frame).unwrap().is_yawning);
    }

    #[test]
    fn test_degenerate_mouth_is_zero() {
        let frame = blank_frame();
        let result = mouth_aspect_ratio(&frame).unwrap();
        assert_eq!(result.mar, 0.0);
        assert!(!result.is_yawning);
    }
}
