use serde::{Deserialize, Serialize};

/// Number of points in a face-mesh frame; anything shorter is treated as "no face".
pub const FACE_MESH_POINTS: usize = 468;

/// Face-mesh eye landmark indices, ordered p1..p6 (corner, upper, upper, corner, lower, lower).
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Eyes count as closed below this ratio.
pub const EYE_CLOSED_THRESHOLD: f64 = 0.22;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One processed video frame worth of normalized landmarks, plus the frame size
/// needed to bring them back into pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub width: u32,
    pub height: u32,
    pub points: Vec<Point3D>,
}

impl LandmarkFrame {
    pub fn new(width: u32, height: u32, points: Vec<Point3D>) -> Self {
        Self { width, height, points }
    }

    pub fn has_face(&self) -> bool {
        self.points.len() >= FACE_MESH_POINTS && self.width > 0 && self.height > 0
    }

    /// Landmark `index` scaled to pixels; `z` stays in mesh units.
    pub fn pixel(&self, index: usize) -> Point3D {
        let p = self.points[index];
        Point3D {
            x: p.x * self.width as f64,
            y: p.y * self.height as f64,
            z: p.z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EARResult {
    pub left_ear: f64,
    pub right_ear: f64,
    pub avg_ear: f64,
}

#[inline]
pub(crate) fn euclidean_distance(p1: &Point3D, p2: &Point3D) -> f64 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let dz = p2.z - p1.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

fn compute_single_eye_ear(frame: &LandmarkFrame, indices: &[usize; 6]) -> f64 {
    let p = indices.map(|i| frame.pixel(i));

    let vertical1 = euclidean_distance(&p[1], &p[5]);
    let vertical2 = euclidean_distance(&p[2], &p[4]);
    let horizontal = euclidean_distance(&p[0], &p[3]);

    if horizontal == 0.0 {
        return 0.0;
    }

    (vertical1 + vertical2) / (2.0 * horizontal)
}

/// Eye aspect ratio of both eyes. Returns `None` when the frame holds no face.
pub fn eye_aspect_ratio(frame: &LandmarkFrame) -> Option<EARResult> {
    if !frame.has_face() {
        return None;
    }

    let left_ear = compute_single_eye_ear(frame, &LEFT_EYE);
    let right_ear = compute_single_eye_ear(frame, &RIGHT_EYE);

    Some(EARResult {
        left_ear,
        right_ear,
        avg_ear: (left_ear + right_ear) / 2.0,
    })
}

#[inline]
pub fn is_eye_closed(ear: f64) -> bool {
    ear < EYE_CLOSED_THRESHOLD
}

#[cfg(any(test, feature = "fixtures"))]
pub(crate) mod test_support {
    use super::*;

    /// A 640x480 frame with every landmark parked at the centre.
    pub fn blank_frame() -> LandmarkFrame {
        LandmarkFrame::new(640, 480, vec![Point3D::new(0.5, 0.5, 0.0); FACE_MESH_POINTS])
    }

    /// Places an eye whose pixel-space aspect ratio equals `ear`.
    pub fn set_eye(frame: &mut LandmarkFrame, indices: &[usize; 6], center_x: f64, ear: f64) {
        let w = frame.width as f64;
        let h = frame.height as f64;
        let half_width_px = 30.0;
        let half_gap_px = ear * half_width_px;
        let cx = center_x * w;
        let cy = 0.4 * h;

        let at = |x: f64, y: f64| Point3D::new(x / w, y / h, 0.0);
        frame.points[indices[0]] = at(cx - half_width_px, cy);
        frame.points[indices[3]] = at(cx + half_width_px, cy);
        frame.points[indices[1]] = at(cx - 10.0, cy - half_gap_px);
        frame.points[indices[5]] = at(cx - 10.0, cy + half_gap_px);
        frame.points[indices[2]] = at(cx + 10.0, cy - half_gap_px);
        frame.points[indices[4]] = at(cx + 10.0, cy + half_gap_px);
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_ear_matches_geometry() {
        let mut frame = blank_frame();
        set_eye(&mut frame, &LEFT_EYE, 0.4, 0.30);
        set_eye(&mut frame, &RIGHT_EYE, 0.6, 0.20);

        let result = eye_aspect_ratio(&frame).unwrap();
        assert!((result.left_ear - 0.30).abs() < 1e-9);
        assert!((result.right_ear - 0.20).abs() < 1e-9);
        assert!((result.avg_ear - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_short_frame_has_no_face() {
        let frame = LandmarkFrame::new(640, 480, vec![Point3D::default(); 10]);
        assert!(eye_aspect_ratio(&frame).is_none());
    }

    #[test]
    fn test_collapsed_eye_corners_yield_zero() {
        let frame = blank_frame();
        let result = eye_aspect_ratio(&frame).unwrap();
        assert_eq!(result.avg_ear, 0.0);
    }

    #[test]
    fn test_closed_threshold() {
        assert!(is_eye_closed(0.21));
        assert!(!is_eye_closed(0.22));
    }
}
