//! Court calibration core.
//!
//! This crate estimates the projective transform between user-marked video
//! points and court coordinates in meters, and projects tracked samples
//! through it. It is purely geometric and does no I/O.
//!
//! ```
//! use courtmap_core::{estimate_court_homography, project, CalibrationPoint, SourceScale, VideoPoint};
//!
//! let points = vec![
//!     CalibrationPoint::new("back-left", [0.0, 0.0], [0.0, 0.0]),
//!     CalibrationPoint::new("back-right", [1.0, 0.0], [10.0, 0.0]),
//!     CalibrationPoint::new("front-right", [1.0, 1.0], [10.0, 20.0]),
//!     CalibrationPoint::new("front-left", [0.0, 1.0], [0.0, 20.0]),
//! ];
//! let h = estimate_court_homography(&points, SourceScale::PADEL)?;
//! let p = project(&h, &VideoPoint { timestamp: 0.0, x: 0.5, y: 0.5 })?;
//! assert!((p.x - 5.0).abs() < 1e-9 && (p.y - 10.0).abs() < 1e-9);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod calibration;
mod homography;
pub mod linalg;
mod logger;
mod projection;

pub use calibration::{CalibrationError, CalibrationPoint, CalibrationSet, SourceScale};
pub use homography::{
    estimate_court_homography, CalibrationQuality, CourtHomography, HomographyError,
    PointResidual, MIN_POINTS, W_EPSILON,
};
pub use projection::{
    project, project_batch, project_valid, CourtPosition, ProjectionError, VideoPoint,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_logger, init_with_level, LogFilter};
