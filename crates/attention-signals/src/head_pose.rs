//! Head pose from six facial landmarks.
//!
//! The landmarks are matched against a generic 3D face and the rigid transform
//! that best reprojects the model onto the image is found with a damped
//! Gauss-Newton (Levenberg-Marquardt) solve under a pinhole camera whose focal
//! length equals the frame width and whose principal point is the frame centre.
//! Lens distortion is ignored.

use crate::ear::LandmarkFrame;

/// Nose tip, chin, outer eye corners, mouth corners.
pub const POSE_LANDMARKS: [usize; 6] = [1, 199, 33, 263, 61, 291];

/// Heads turned further than this (degrees) count as rotated away.
pub const ROTATED_YAW_DEGREES: f64 = 25.0;

/// Generic face in model units (y up, z toward the viewer), same order as
/// [`POSE_LANDMARKS`].
const FACE_MODEL: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [0.0, -330.0, -65.0],
    [-225.0, 170.0, -135.0],
    [225.0, 170.0, -135.0],
    [-150.0, -150.0, -125.0],
    [150.0, -150.0, -125.0],
];

const EYE_CORNER_SPAN: f64 = 450.0;
const MAX_ITERATIONS: usize = 100;
const MAX_DAMPING_STEPS: usize = 12;

type Vec3 = [f64; 3];
type Mat3 = [[f64; 3]; 3];

const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Head rotation in degrees. Zero on all axes for a face looking straight
/// into the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadPose {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl HeadPose {
    pub fn is_rotated(&self) -> bool {
        self.yaw.abs() > ROTATED_YAW_DEGREES
    }

    fn from_rotation(r: &Mat3) -> Self {
        let pitch = r[2][1].atan2(r[2][2]);
        let yaw = (-r[2][0]).atan2(r[2][1].hypot(r[2][2]));
        let roll = r[1][0].atan2(r[0][0]);
        Self {
            pitch: pitch.to_degrees(),
            yaw: yaw.to_degrees(),
            roll: roll.to_degrees(),
        }
    }
}

/// Solves the head pose for a frame. `None` when the frame holds no face or
/// the landmark geometry does not admit a solution.
pub fn estimate_head_pose(frame: &LandmarkFrame) -> Option<HeadPose> {
    if !frame.has_face() {
        return None;
    }

    let width = frame.width as f64;
    let height = frame.height as f64;
    let image = POSE_LANDMARKS.map(|i| {
        let p = frame.pixel(i);
        [p.x, p.y]
    });

    let problem = PnpProblem {
        // Camera axes: x right, y down, z away from the camera.
        model: FACE_MODEL.map(|[x, y, z]| [x, -y, -z]),
        image,
        camera: Camera {
            focal: width,
            cx: width / 2.0,
            cy: height / 2.0,
        },
    };

    let (rotation, _translation) = problem.solve()?;
    let pose = HeadPose::from_rotation(&rotation);
    if pose.pitch.is_finite() && pose.yaw.is_finite() && pose.roll.is_finite() {
        Some(pose)
    } else {
        None
    }
}

struct Camera {
    focal: f64,
    cx: f64,
    cy: f64,
}

impl Camera {
    fn project(&self, p: &Vec3) -> Option<[f64; 2]> {
        if p[2] <= 1e-9 {
            return None;
        }
        Some([
            self.focal * p[0] / p[2] + self.cx,
            self.focal * p[1] / p[2] + self.cy,
        ])
    }
}

struct PnpProblem {
    model: [Vec3; 6],
    image: [[f64; 2]; 6],
    camera: Camera,
}

impl PnpProblem {
    fn residuals(&self, rotation: &Mat3, translation: &Vec3) -> Option<[f64; 12]> {
        let mut out = [0.0; 12];
        for (i, (model, image)) in self.model.iter().zip(&self.image).enumerate() {
            let camera_point = add(&mat_vec(rotation, model), translation);
            let [u, v] = self.camera.project(&camera_point)?;
            out[2 * i] = u - image[0];
            out[2 * i + 1] = v - image[1];
        }
        Some(out)
    }

    /// Frontal rotation, depth from the apparent eye-corner span, nose tip on
    /// its observed ray.
    fn initial_translation(&self) -> Option<Vec3> {
        let [lx, ly] = self.image[2];
        let [rx, ry] = self.image[3];
        let span = (rx - lx).hypot(ry - ly);
        if !span.is_finite() || span < 1e-6 {
            return None;
        }

        let depth = self.camera.focal * EYE_CORNER_SPAN / span;
        let [nx, ny] = self.image[0];
        Some([
            (nx - self.camera.cx) * depth / self.camera.focal,
            (ny - self.camera.cy) * depth / self.camera.focal,
            depth,
        ])
    }

    fn solve(&self) -> Option<(Mat3, Vec3)> {
        let mut rotation = IDENTITY;
        let mut translation = self.initial_translation()?;
        let mut residuals = self.residuals(&rotation, &translation)?;
        let mut current = sum_squares(&residuals);
        let mut lambda = 1e-3;

        for _ in 0..MAX_ITERATIONS {
            if current < 1e-12 {
                break;
            }

            let mut jacobian = [[0.0; 6]; 12];
            for k in 0..6 {
                let step = if k < 3 {
                    1e-6
                } else {
                    1e-6 * (1.0 + translation[k - 3].abs())
                };
                let mut delta = [0.0; 6];
                delta[k] = step;
                let (r, t) = apply_update(&rotation, &translation, &delta);
                let perturbed = self.residuals(&r, &t)?;
                for row in 0..12 {
                    jacobian[row][k] = (perturbed[row] - residuals[row]) / step;
                }
            }

            let mut jtj = [[0.0; 6]; 6];
            let mut jtr = [0.0; 6];
            for row in 0..12 {
                for i in 0..6 {
                    jtr[i] += jacobian[row][i] * residuals[row];
                    for j in 0..6 {
                        jtj[i][j] += jacobian[row][i] * jacobian[row][j];
                    }
                }
            }

            let mut accepted = None;
            for _ in 0..MAX_DAMPING_STEPS {
                let mut damped = jtj;
                for (i, row) in damped.iter_mut().enumerate() {
                    row[i] += lambda * jtj[i][i].max(1e-9);
                }
                let rhs = jtr.map(|g| -g);

                if let Some(delta) = solve_linear_6(damped, rhs) {
                    let (r, t) = apply_update(&rotation, &translation, &delta);
                    if let Some(candidate) = self.residuals(&r, &t) {
                        let cost = sum_squares(&candidate);
                        if cost < current {
                            accepted = Some((r, t, candidate, cost, delta));
                            lambda = (lambda / 10.0).max(1e-12);
                            break;
                        }
                    }
                }
                lambda *= 10.0;
            }

            let Some((r, t, candidate, cost, delta)) = accepted else {
                break;
            };
            rotation = r;
            translation = t;
            residuals = candidate;
            current = cost;

            if delta.iter().map(|d| d * d).sum::<f64>().sqrt() < 1e-10 {
                break;
            }
        }

        if current.is_finite() {
            Some((rotation, translation))
        } else {
            None
        }
    }
}

fn apply_update(rotation: &Mat3, translation: &Vec3, delta: &[f64; 6]) -> (Mat3, Vec3) {
    let r = mat_mul(&rodrigues(&[delta[0], delta[1], delta[2]]), rotation);
    let t = [
        translation[0] + delta[3],
        translation[1] + delta[4],
        translation[2] + delta[5],
    ];
    (r, t)
}

fn sum_squares(values: &[f64; 12]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Rotation vector to matrix.
fn rodrigues(w: &Vec3) -> Mat3 {
    let theta = (w[0] * w[0] + w[1] * w[1] + w[2] * w[2]).sqrt();
    if theta < 1e-12 {
        return IDENTITY;
    }

    let k = [w[0] / theta, w[1] / theta, w[2] / theta];
    let skew: Mat3 = [[0.0, -k[2], k[1]], [k[2], 0.0, -k[0]], [-k[1], k[0], 0.0]];
    let skew2 = mat_mul(&skew, &skew);
    let (s, c) = theta.sin_cos();

    let mut out = IDENTITY;
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] += s * skew[i][j] + (1.0 - c) * skew2[i][j];
        }
    }
    out
}

fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

fn mat_vec(a: &Mat3, v: &Vec3) -> Vec3 {
    [
        a[0][0] * v[0] + a[0][1] * v[1] + a[0][2] * v[2],
        a[1][0] * v[0] + a[1][1] * v[1] + a[1][2] * v[2],
        a[2][0] * v[0] + a[2][1] * v[1] + a[2][2] * v[2],
    ]
}

fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Gaussian elimination with partial pivoting. `None` for a singular system.
fn solve_linear_6(mut a: [[f64; 6]; 6], mut b: [f64; 6]) -> Option<[f64; 6]> {
    for col in 0..6 {
        let pivot = (col..6).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if !a[pivot][col].is_finite() || a[pivot][col].abs() < 1e-15 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..6 {
            let factor = a[row][col] / a[col][col];
            for k in col..6 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; 6];
    for row in (0..6).rev() {
        let tail: f64 = (row + 1..6).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(any(test, feature = "fixtures"))]
pub(crate) mod test_support {
    use super::*;
    use crate::ear::{LandmarkFrame, Point3D, FACE_MESH_POINTS};

    fn axis_rotation(axis: usize, degrees: f64) -> Mat3 {
        let mut w = [0.0; 3];
        w[axis] = degrees.to_radians();
        rodrigues(&w)
    }

    /// Renders the generic face at the given pose into a 640x480 frame.
    pub fn posed_frame(pitch: f64, yaw: f64, roll: f64) -> LandmarkFrame {
        let (width, height) = (640u32, 480u32);
        let camera = Camera {
            focal: width as f64,
            cx: width as f64 / 2.0,
            cy: height as f64 / 2.0,
        };
        let rotation = mat_mul(
            &axis_rotation(2, roll),
            &mat_mul(&axis_rotation(1, yaw), &axis_rotation(0, pitch)),
        );
        let translation = [20.0, -10.0, 3000.0];

        let mut points = vec![Point3D::new(0.5, 0.5, 0.0); FACE_MESH_POINTS];
        for (idx, [x, y, z]) in POSE_LANDMARKS.iter().zip(FACE_MODEL) {
            let p = add(&mat_vec(&rotation, &[x, -y, -z]), &translation);
            let [u, v] = camera.project(&p).unwrap();
            points[*idx] = Point3D::new(u / width as f64, v / height as f64, 0.0);
        }
        LandmarkFrame::new(width, height, points)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::posed_frame;
    use super::*;
    use crate::ear::{Point3D, FACE_MESH_POINTS};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_frontal_face_is_level() {
        let pose = estimate_head_pose(&posed_frame(0.0, 0.0, 0.0)).unwrap();
        assert_close(pose.pitch, 0.0);
        assert_close(pose.yaw, 0.0);
        assert_close(pose.roll, 0.0);
        assert!(!pose.is_rotated());
    }

    #[test]
    fn test_recovers_turned_head() {
        let pose = estimate_head_pose(&posed_frame(0.0, 30.0, 0.0)).unwrap();
        assert_close(pose.yaw, 30.0);
        assert!(pose.is_rotated());

        let pose = estimate_head_pose(&posed_frame(0.0, -30.0, 0.0)).unwrap();
        assert_close(pose.yaw, -30.0);
        assert!(pose.is_rotated());
    }

    #[test]
    fn test_recovers_combined_rotation() {
        let pose = estimate_head_pose(&posed_frame(10.0, -20.0, 5.0)).unwrap();
        assert_close(pose.pitch, 10.0);
        assert_close(pose.yaw, -20.0);
        assert_close(pose.roll, 5.0);
    }

    #[test]
    fn test_collapsed_landmarks_have_no_pose() {
        let frame = LandmarkFrame::new(640, 480, vec![Point3D::new(0.5, 0.5, 0.0); FACE_MESH_POINTS]);
        assert!(estimate_head_pose(&frame).is_none());
    }

    #[test]
    fn test_rodrigues_quarter_turn() {
        let r = rodrigues(&[0.0, 0.0, std::f64::consts::FRAC_PI_2]);
        let v = mat_vec(&r, &[1.0, 0.0, 0.0]);
        assert!(v[0].abs() < 1e-12);
        assert!((v[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_system_rejected() {
        assert!(solve_linear_6([[0.0; 6]; 6], [1.0; 6]).is_none());
    }
}
