//! High-level facade crate for the `courtmap-*` workspace.
//!
//! This crate provides:
//! - re-exports of the calibration core and the zone analytics crates
//! - JSON session configuration and report helpers ([`io`])
//! - (feature `cli`) the `courtmap` command-line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use courtmap::io::{run_session, SessionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = SessionConfig::load_json("session.json")?;
//! let report = run_session(&cfg, None)?;
//! report.write_json(cfg.output_path())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `courtmap::core`: calibration points, homography estimation, projection.
//! - `courtmap::zones`: zone models, court conventions, zone dominance.
//! - `courtmap::io`: session config, reports and the end-to-end runner.

pub use courtmap_core as core;
pub use courtmap_zones as zones;

pub use courtmap_core::{
    estimate_court_homography, project, project_batch, CalibrationPoint, CourtHomography,
    CourtPosition, SourceScale, VideoPoint,
};
pub use courtmap_zones::{
    CourtConvention, RallyWindow, ZoneDominance, ZoneDominanceAggregator, ZoneModel, ZoneScheme,
    ZoneStat,
};

pub mod io;
