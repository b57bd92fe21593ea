//! Calibration input types: user-marked correspondences and the source scale.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One user-marked correspondence between the video frame and the court.
///
/// Video coordinates are normalized to `[0, 1]` with the origin at the
/// top-left of the frame; court coordinates are in meters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationPoint {
    pub video_x: f64,
    pub video_y: f64,
    pub court_x: f64,
    pub court_y: f64,
    /// Court landmark this point marks, e.g. `"net-left"`.
    pub label: String,
}

impl CalibrationPoint {
    pub fn new(label: impl Into<String>, video: [f64; 2], court: [f64; 2]) -> Self {
        Self {
            video_x: video[0],
            video_y: video[1],
            court_x: court[0],
            court_y: court[1],
            label: label.into(),
        }
    }

    fn is_finite(&self) -> bool {
        self.video_x.is_finite()
            && self.video_y.is_finite()
            && self.court_x.is_finite()
            && self.court_y.is_finite()
    }
}

/// Per-axis factor applied to normalized video coordinates before they enter
/// the homography.
///
/// Estimation and projection must agree on it, which is why
/// [`crate::CourtHomography`] carries the scale it was estimated with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceScale {
    pub x: f64,
    pub y: f64,
}

impl SourceScale {
    pub const UNIT: SourceScale = SourceScale { x: 1.0, y: 1.0 };
    /// Matches a 10 m × 20 m padel court.
    pub const PADEL: SourceScale = SourceScale { x: 10.0, y: 20.0 };

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.x, y * self.y)
    }

    pub(crate) fn is_usable(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x != 0.0 && self.y != 0.0
    }
}

impl Default for SourceScale {
    fn default() -> Self {
        Self::PADEL
    }
}

/// Errors raised while assembling a calibration set.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("calibration label `{label}` is used more than once")]
    DuplicateLabel { label: String },
    #[error("calibration point `{label}` has a non-finite coordinate")]
    NonFiniteCoordinate { label: String },
}

/// Validated calibration points for one session.
///
/// Labels are unique and every coordinate is finite. The 4-point minimum is
/// enforced at estimation time, so a set may be built up incrementally.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CalibrationSet {
    points: Vec<CalibrationPoint>,
}

impl CalibrationSet {
    pub fn new(points: Vec<CalibrationPoint>) -> Result<Self, CalibrationError> {
        let mut seen = HashSet::with_capacity(points.len());
        for p in &points {
            if !p.is_finite() {
                return Err(CalibrationError::NonFiniteCoordinate {
                    label: p.label.clone(),
                });
            }
            if !seen.insert(p.label.as_str()) {
                return Err(CalibrationError::DuplicateLabel {
                    label: p.label.clone(),
                });
            }
        }
        Ok(Self { points })
    }

    /// Return a new set with `point` appended.
    pub fn with_point(&self, point: CalibrationPoint) -> Result<Self, CalibrationError> {
        let mut points = self.points.clone();
        points.push(point);
        Self::new(points)
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<'de> Deserialize<'de> for CalibrationSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            points: Vec<CalibrationPoint>,
        }
        let raw = Raw::deserialize(deserializer)?;
        CalibrationSet::new(raw.points).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_labels_are_rejected() {
        let err = CalibrationSet::new(vec![
            CalibrationPoint::new("net-left", [0.1, 0.5], [0.0, 10.0]),
            CalibrationPoint::new("net-left", [0.9, 0.5], [10.0, 10.0]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            CalibrationError::DuplicateLabel {
                label: "net-left".into()
            }
        );
    }

    #[test]
    fn non_finite_points_are_rejected() {
        let err = CalibrationSet::new(vec![CalibrationPoint::new(
            "corner",
            [f64::NAN, 0.0],
            [0.0, 0.0],
        )])
        .unwrap_err();
        assert!(matches!(err, CalibrationError::NonFiniteCoordinate { .. }));
    }

    #[test]
    fn with_point_keeps_original_untouched() {
        let base = CalibrationSet::new(vec![CalibrationPoint::new("a", [0.0, 0.0], [0.0, 0.0])])
            .expect("set");
        let grown = base
            .with_point(CalibrationPoint::new("b", [1.0, 0.0], [10.0, 0.0]))
            .expect("grown");
        assert_eq!(base.len(), 1);
        assert_eq!(grown.len(), 2);
        assert!(base
            .with_point(CalibrationPoint::new("a", [1.0, 1.0], [1.0, 1.0]))
            .is_err());
    }

    #[test]
    fn points_use_camel_case_on_the_wire() {
        let json = r#"{"points":[{"videoX":0.5,"videoY":0.25,"courtX":5.0,"courtY":5.0,"label":"t"}]}"#;
        let set: CalibrationSet = serde_json::from_str(json).expect("parse");
        assert_eq!(set.points()[0].video_y, 0.25);

        let dup = r#"{"points":[
            {"videoX":0,"videoY":0,"courtX":0,"courtY":0,"label":"t"},
            {"videoX":1,"videoY":0,"courtX":1,"courtY":0,"label":"t"}]}"#;
        assert!(serde_json::from_str::<CalibrationSet>(dup).is_err());
    }
}
