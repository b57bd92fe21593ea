//! Video-to-court homography estimation.
//!
//! The transform has 8 unknowns with `h[2][2]` fixed to 1. Each
//! correspondence `(x, y) -> (x', y')` contributes two rows:
//!
//! ```text
//! [ x  y  1  0  0  0  -x'x  -x'y ] h = x'
//! [ 0  0  0  x  y  1  -y'x  -y'y ] h = y'
//! ```
//!
//! Four points give an exactly determined system; more points are fitted in
//! the least-squares sense through the normal equations.

use crate::calibration::{CalibrationPoint, CalibrationSet, SourceScale};
use crate::linalg::{solve_least_squares, LinearSolveError, PIVOT_TOLERANCE};
use log::debug;
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Minimum number of correspondences for a projective fit.
pub const MIN_POINTS: usize = 4;

/// Homogeneous divisors below this magnitude are treated as points at infinity.
pub const W_EPSILON: f64 = 1e-12;

/// Errors returned by homography estimation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HomographyError {
    #[error("insufficient calibration points: need at least {MIN_POINTS}, got {got}")]
    InsufficientPoints { got: usize },
    #[error("degenerate calibration (collinear or coincident points), undetermined columns {deficient_columns:?}")]
    DegenerateConfiguration { deficient_columns: Vec<usize> },
    #[error("invalid source scale ({x}, {y})")]
    InvalidScale { x: f64, y: f64 },
    #[error(transparent)]
    Solver(#[from] LinearSolveError),
}

/// Immutable projective transform from scaled video space to court meters.
///
/// The source scale is part of the value: projecting through a
/// `CourtHomography` always applies the scale it was estimated with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "HomographyRepr", into = "HomographyRepr")]
pub struct CourtHomography {
    h: Matrix3<f64>,
    scale: SourceScale,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct HomographyRepr {
    matrix: [[f64; 3]; 3],
    #[serde(default)]
    scale: SourceScale,
}

impl From<HomographyRepr> for CourtHomography {
    fn from(repr: HomographyRepr) -> Self {
        CourtHomography::from_array(repr.matrix, repr.scale)
    }
}

impl From<CourtHomography> for HomographyRepr {
    fn from(h: CourtHomography) -> Self {
        HomographyRepr {
            matrix: h.to_array(),
            scale: h.scale,
        }
    }
}

impl CourtHomography {
    pub fn new(h: Matrix3<f64>, scale: SourceScale) -> Self {
        Self { h, scale }
    }

    /// Build from a row-major array.
    pub fn from_array(rows: [[f64; 3]; 3], scale: SourceScale) -> Self {
        Self::new(
            Matrix3::from_row_slice(&[
                rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2],
                rows[2][0], rows[2][1], rows[2][2],
            ]),
            scale,
        )
    }

    /// Row-major copy of the matrix.
    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.h
    }

    pub fn scale(&self) -> SourceScale {
        self.scale
    }

    /// Map a normalized video point to court meters.
    ///
    /// Returns `Err(w)` with the homogeneous divisor when the point maps to
    /// infinity or the result is not finite.
    pub fn video_to_court(&self, video_x: f64, video_y: f64) -> Result<[f64; 2], f64> {
        let (u, v) = self.scale.apply(video_x, video_y);
        divide(self.h * Vector3::new(u, v, 1.0))
    }

    /// Map court meters back to normalized video coordinates.
    ///
    /// `None` when the matrix is singular or the point maps to infinity.
    pub fn court_to_video(&self, court_x: f64, court_y: f64) -> Option<[f64; 2]> {
        let inv = self.h.try_inverse()?;
        let [u, v] = divide(inv * Vector3::new(court_x, court_y, 1.0)).ok()?;
        Some([u / self.scale.x, v / self.scale.y])
    }

    /// Reprojection residuals of `points` through this transform, in meters.
    pub fn residuals(&self, points: &[CalibrationPoint]) -> CalibrationQuality {
        let per_point: Vec<PointResidual> = points
            .iter()
            .map(|p| {
                let error = match self.video_to_court(p.video_x, p.video_y) {
                    Ok([x, y]) => (x - p.court_x).hypot(y - p.court_y),
                    Err(_) => f64::INFINITY,
                };
                PointResidual {
                    label: p.label.clone(),
                    error,
                }
            })
            .collect();

        let n = per_point.len().max(1) as f64;
        let rms_error = (per_point.iter().map(|r| r.error * r.error).sum::<f64>() / n).sqrt();
        let max_error = per_point.iter().map(|r| r.error).fold(0.0_f64, f64::max);

        CalibrationQuality {
            per_point,
            rms_error,
            max_error,
        }
    }
}

fn divide(p: Vector3<f64>) -> Result<[f64; 2], f64> {
    let w = p[2];
    if !w.is_finite() || w.abs() < W_EPSILON {
        return Err(w);
    }
    let x = p[0] / w;
    let y = p[1] / w;
    if !x.is_finite() || !y.is_finite() {
        return Err(w);
    }
    Ok([x, y])
}

/// Reprojection error for one calibration point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointResidual {
    pub label: String,
    /// Euclidean distance in meters; infinite when the point maps to infinity.
    pub error: f64,
}

/// Summary of how well a homography explains its calibration points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationQuality {
    pub per_point: Vec<PointResidual>,
    pub rms_error: f64,
    pub max_error: f64,
}

/// Estimate the video-to-court homography from at least 4 correspondences.
///
/// Video coordinates are multiplied by `scale` before entering the system.
/// Rank-deficient systems (collinear or coincident points) are rejected
/// rather than returning an unstable matrix.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points), fields(points = points.len()))
)]
pub fn estimate_court_homography(
    points: &[CalibrationPoint],
    scale: SourceScale,
) -> Result<CourtHomography, HomographyError> {
    if points.len() < MIN_POINTS {
        return Err(HomographyError::InsufficientPoints { got: points.len() });
    }
    if !scale.is_usable() {
        return Err(HomographyError::InvalidScale {
            x: scale.x,
            y: scale.y,
        });
    }

    let rows = 2 * points.len();
    let mut a = DMatrix::<f64>::zeros(rows, 8);
    let mut b = DVector::<f64>::zeros(rows);

    for (k, p) in points.iter().enumerate() {
        let (x, y) = scale.apply(p.video_x, p.video_y);
        let u = p.court_x;
        let v = p.court_y;

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let sol = solve_least_squares(&a, &b, PIVOT_TOLERANCE)?;
    if !sol.is_full_rank() {
        debug!(
            "homography system rank-deficient: {} of 8 columns undetermined",
            sol.deficient.len()
        );
        return Err(HomographyError::DegenerateConfiguration {
            deficient_columns: sol.deficient,
        });
    }

    let x = &sol.x;
    let h = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );
    if h.iter().any(|v| !v.is_finite()) {
        return Err(HomographyError::DegenerateConfiguration {
            deficient_columns: Vec::new(),
        });
    }

    debug!("estimated homography from {} points", points.len());
    Ok(CourtHomography::new(h, scale))
}

impl CalibrationSet {
    /// Estimate the homography for this set.
    pub fn estimate(&self, scale: SourceScale) -> Result<CourtHomography, HomographyError> {
        estimate_court_homography(self.points(), scale)
    }
}
