//! Court zones and zone-dominance statistics.
//!
//! A [`ZoneModel`] partitions a court into named rectangles (in meters). A
//! [`ZoneDominanceAggregator`] walks one subject's court-space samples over
//! a set of rally windows and reports time spent, occupancy percentage and
//! entry count per zone. A [`CourtConvention`] maps sport-specific court
//! coordinates into the frame the zone model is laid out in.
//!
//! ```
//! use courtmap_core::CourtPosition;
//! use courtmap_zones::{CourtConvention, RallyWindow, ZoneDominanceAggregator, ZoneScheme};
//!
//! let agg = ZoneDominanceAggregator::new(ZoneScheme::PadelDepth.model())
//!     .with_convention(CourtConvention::PADEL)?;
//! let samples = [
//!     CourtPosition::new(0.0, 5.0, 9.0),
//!     CourtPosition::new(0.5, 5.0, 11.5),
//!     CourtPosition::new(1.0, 5.0, 2.0),
//! ];
//! let dominance = agg.aggregate(&samples, &[RallyWindow::new(0.0, 10.0)]);
//! assert_eq!(dominance.stat("net").map(|s| s.entry_count), Some(1));
//! # Ok::<(), courtmap_zones::ZoneError>(())
//! ```

mod convention;
mod dominance;
mod model;
mod schemes;

pub use convention::CourtConvention;
pub use dominance::{
    AggregatorParams, RallyWindow, ZoneDominance, ZoneDominanceAggregator, ZoneStat,
    GAP_THRESHOLD,
};
pub use model::{ZoneDefinition, ZoneModel, ZoneModelError};
pub use schemes::{
    ZoneScheme, PADEL_HALF_DEPTH, PADEL_WIDTH, TENNIS_DOUBLES_WIDTH, TENNIS_LENGTH,
    TENNIS_NET_FROM_BASELINE, TENNIS_SERVICE_LINE,
};

/// Errors raised by aggregation setup and post-aggregation combination.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ZoneError {
    #[error("cannot combine stats from zone model `{found}` with `{expected}`")]
    ModelMismatch { expected: String, found: String },
    #[error("no zone stats to combine")]
    NothingToCombine,
    #[error("gap threshold must be a positive number of seconds, got {value}")]
    InvalidGapThreshold { value: f64 },
    #[error("invalid court convention: {reason}")]
    InvalidConvention { reason: &'static str },
}
