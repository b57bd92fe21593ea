//! JSON session configuration and report helpers.

use courtmap_core::{
    project, CalibrationError, CalibrationPoint, CalibrationQuality, CalibrationSet,
    CourtHomography, HomographyError, SourceScale, VideoPoint,
};
use courtmap_zones::{
    AggregatorParams, CourtConvention, RallyWindow, ZoneDominance, ZoneDominanceAggregator,
    ZoneError, ZoneModel, ZoneScheme, GAP_THRESHOLD,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors that make a session unusable as configured.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Homography(#[from] HomographyError),
    #[error(transparent)]
    Zone(#[from] ZoneError),
}

/// Where the zone partition comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSource {
    Scheme(ZoneScheme),
    Custom(ZoneModel),
}

impl ZoneSource {
    pub fn model(&self) -> ZoneModel {
        match self {
            ZoneSource::Scheme(s) => s.model(),
            ZoneSource::Custom(m) => m.clone(),
        }
    }

    /// Convention used when the config does not name one.
    pub fn default_convention(&self) -> CourtConvention {
        match self {
            ZoneSource::Scheme(s) => s.convention(),
            ZoneSource::Custom(_) => CourtConvention::Raw,
        }
    }
}

/// Raw tracker samples for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectTrack {
    pub name: String,
    #[serde(default)]
    pub samples: Vec<VideoPoint>,
}

fn default_gap_threshold() -> f64 {
    GAP_THRESHOLD
}

/// One analysis session: calibration, zones and tracking input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub calibration: Vec<CalibrationPoint>,
    #[serde(default)]
    pub scale: SourceScale,
    pub zones: ZoneSource,
    #[serde(default)]
    pub convention: Option<CourtConvention>,
    #[serde(default = "default_gap_threshold")]
    pub gap_threshold: f64,
    #[serde(default)]
    pub subjects: Vec<SubjectTrack>,
    #[serde(default)]
    pub rallies: Vec<RallyWindow>,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl SessionConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("courtmap_report.json"))
    }

    pub fn calibration_set(&self) -> Result<CalibrationSet, CalibrationError> {
        CalibrationSet::new(self.calibration.clone())
    }

    /// Validate the calibration points and estimate the homography.
    pub fn estimate(&self) -> Result<CourtHomography, SessionError> {
        Ok(self.calibration_set()?.estimate(self.scale)?)
    }

    pub fn aggregator_params(&self) -> AggregatorParams {
        AggregatorParams {
            gap_threshold: self.gap_threshold,
            convention: self
                .convention
                .unwrap_or_else(|| self.zones.default_convention()),
        }
    }

    pub fn build_aggregator(&self) -> Result<ZoneDominanceAggregator, ZoneError> {
        ZoneDominanceAggregator::with_params(self.zones.model(), self.aggregator_params())
    }
}

/// Zone statistics for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectReport {
    pub name: String,
    pub dominance: ZoneDominance,
    #[serde(default)]
    pub dominant_zone: Option<String>,
    pub pressure_share: f64,
    /// Samples dropped because they projected to infinity.
    pub failed_projections: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    #[serde(default)]
    pub config_path: Option<String>,
    #[serde(default)]
    pub homography: Option<CourtHomography>,
    #[serde(default)]
    pub quality: Option<CalibrationQuality>,
    #[serde(default)]
    pub subjects: Vec<SubjectReport>,
    #[serde(default)]
    pub all_players: Option<ZoneDominance>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SessionReport {
    pub fn new(config_path: Option<&Path>) -> Self {
        Self {
            config_path: config_path.map(|p| p.to_string_lossy().into_owned()),
            homography: None,
            quality: None,
            subjects: Vec::new(),
            all_players: None,
            error: None,
        }
    }

    /// Record a calibration or analysis failure.
    pub fn set_error(&mut self, err: SessionError) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Run a full session: calibrate, project every subject, aggregate zones.
///
/// Calibration failures are recorded in [`SessionReport::error`] so the
/// caller can ask for better points; an invalid zone or convention setup is
/// returned as an error.
pub fn run_session(
    cfg: &SessionConfig,
    config_path: Option<&Path>,
) -> Result<SessionReport, SessionError> {
    let aggregator = cfg.build_aggregator()?;
    let mut report = SessionReport::new(config_path);

    let h = match cfg.estimate() {
        Ok(h) => h,
        Err(err) => {
            warn!("calibration failed: {err}");
            report.set_error(err);
            return Ok(report);
        }
    };
    let quality = h.residuals(&cfg.calibration);
    info!(
        "calibrated from {} points, rms {:.4} m, max {:.4} m",
        cfg.calibration.len(),
        quality.rms_error,
        quality.max_error
    );
    report.homography = Some(h);
    report.quality = Some(quality);

    for subject in &cfg.subjects {
        let mut positions = Vec::with_capacity(subject.samples.len());
        let mut failed = 0;
        for sample in &subject.samples {
            match project(&h, sample) {
                Ok(p) => positions.push(p),
                Err(_) => failed += 1,
            }
        }
        if failed > 0 {
            warn!("{}: {failed} samples projected to infinity", subject.name);
        }

        let dominance = aggregator.aggregate(&positions, &cfg.rallies);
        report.subjects.push(SubjectReport {
            name: subject.name.clone(),
            dominant_zone: dominance.dominant().map(|s| s.zone_id.clone()),
            pressure_share: dominance.pressure_share(aggregator.model()),
            dominance,
            failed_projections: failed,
        });
    }

    if !report.subjects.is_empty() {
        let parts: Vec<ZoneDominance> =
            report.subjects.iter().map(|s| s.dominance.clone()).collect();
        report.all_players = Some(ZoneDominance::combine(&parts)?);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn corners() -> Vec<CalibrationPoint> {
        vec![
            CalibrationPoint::new("near-back-left", [0.0, 0.0], [0.0, 0.0]),
            CalibrationPoint::new("near-back-right", [1.0, 0.0], [10.0, 0.0]),
            CalibrationPoint::new("far-back-right", [1.0, 1.0], [10.0, 20.0]),
            CalibrationPoint::new("far-back-left", [0.0, 1.0], [0.0, 20.0]),
        ]
    }

    fn config() -> SessionConfig {
        SessionConfig {
            calibration: corners(),
            scale: SourceScale::PADEL,
            zones: ZoneSource::Scheme(ZoneScheme::PadelDepth),
            convention: None,
            gap_threshold: GAP_THRESHOLD,
            subjects: vec![
                SubjectTrack {
                    name: "p1".into(),
                    // Video y 0.05 -> court y 1 m, near the back wall.
                    samples: (0..5)
                        .map(|i| VideoPoint {
                            timestamp: i as f64 * 0.5,
                            x: 0.5,
                            y: 0.05,
                        })
                        .collect(),
                },
                SubjectTrack {
                    name: "p2".into(),
                    // Video y 0.55 -> court y 11 m, far side at the net.
                    samples: (0..3)
                        .map(|i| VideoPoint {
                            timestamp: i as f64 * 0.5,
                            x: 0.5,
                            y: 0.55,
                        })
                        .collect(),
                },
            ],
            rallies: vec![RallyWindow::new(0.0, 10.0)],
            output_path: None,
        }
    }

    #[test]
    fn session_reports_each_subject_and_the_combined_view() {
        let report = run_session(&config(), None).expect("valid session");
        assert!(report.error.is_none());
        assert_eq!(report.subjects.len(), 2);

        let p1 = &report.subjects[0];
        assert_eq!(p1.dominant_zone.as_deref(), Some("defense"));
        assert_relative_eq!(p1.dominance.total_time, 2.0, epsilon = 1e-9);
        assert_eq!(p1.failed_projections, 0);

        let all = report.all_players.as_ref().expect("combined");
        assert_relative_eq!(all.total_time, 3.0, epsilon = 1e-9);
        let defense = all.stat("defense").expect("defense zone");
        assert_relative_eq!(defense.percentage, 200.0 / 3.0, epsilon = 1e-6);
        assert_eq!(all.stat("net").map(|s| s.entry_count), Some(1));
        assert_eq!(report.subjects[1].dominant_zone.as_deref(), Some("net"));
    }

    #[test]
    fn calibration_failures_land_in_the_report() {
        let mut cfg = config();
        cfg.calibration.truncate(3);
        let report = run_session(&cfg, None).expect("zones are valid");
        assert!(report.homography.is_none());
        assert!(report
            .error
            .as_deref()
            .is_some_and(|e| e.contains("insufficient")));
    }

    #[test]
    fn invalid_zone_setup_is_an_error() {
        let mut cfg = config();
        cfg.gap_threshold = -1.0;
        assert!(matches!(
            run_session(&cfg, None),
            Err(SessionError::Zone(ZoneError::InvalidGapThreshold { .. }))
        ));
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let cfg = config();
        cfg.write_json(&path).expect("write");

        let loaded = SessionConfig::load_json(&path).expect("load");
        assert_eq!(loaded.calibration, cfg.calibration);
        assert_eq!(loaded.zones, cfg.zones);
        assert_eq!(loaded.output_path(), PathBuf::from("courtmap_report.json"));
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let json = r#"{
            "calibration": [],
            "zones": {"custom": {"name": "all", "zones": [
                {"id": "court", "name": "Court", "x_min": 0, "x_max": 10, "y_min": 0, "y_max": 20}
            ]}}
        }"#;
        let cfg: SessionConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(cfg.scale, SourceScale::PADEL);
        assert_eq!(cfg.gap_threshold, GAP_THRESHOLD);
        assert_eq!(cfg.aggregator_params().convention, CourtConvention::Raw);
        assert!(cfg.subjects.is_empty());
    }
}
