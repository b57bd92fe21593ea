//! Projection of tracker samples from video space onto the court.

use crate::homography::CourtHomography;
use log::debug;
use serde::{Deserialize, Serialize};

/// One raw tracker sample in normalized video space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoPoint {
    /// Seconds, same clock as rally windows.
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
}

/// One tracked sample in court space (meters).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourtPosition {
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
}

impl CourtPosition {
    pub fn new(timestamp: f64, x: f64, y: f64) -> Self {
        Self { timestamp, x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.timestamp.is_finite() && self.x.is_finite() && self.y.is_finite()
    }
}

/// Per-point projection failure.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ProjectionError {
    #[error("sample at t={timestamp}s projects to infinity (w={w:e})")]
    ProjectionToInfinity { timestamp: f64, w: f64 },
}

/// Project one video sample into court space.
#[inline]
pub fn project(h: &CourtHomography, p: &VideoPoint) -> Result<CourtPosition, ProjectionError> {
    h.video_to_court(p.x, p.y)
        .map(|[x, y]| CourtPosition::new(p.timestamp, x, y))
        .map_err(|w| ProjectionError::ProjectionToInfinity {
            timestamp: p.timestamp,
            w,
        })
}

/// Project a batch, one result per input in input order.
pub fn project_batch(
    h: &CourtHomography,
    points: &[VideoPoint],
) -> Vec<Result<CourtPosition, ProjectionError>> {
    points.iter().map(|p| project(h, p)).collect()
}

/// Project a batch and keep only the samples that land on the plane.
pub fn project_valid(h: &CourtHomography, points: &[VideoPoint]) -> Vec<CourtPosition> {
    let out: Vec<CourtPosition> = points.iter().filter_map(|p| project(h, p).ok()).collect();
    let dropped = points.len() - out.len();
    if dropped > 0 {
        debug!("dropped {dropped} of {} samples projecting to infinity", points.len());
    }
    out
}
