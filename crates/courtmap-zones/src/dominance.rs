//! Time-weighted zone occupancy over rally windows.
//!
//! Only samples inside a rally window count. Consecutive in-play samples
//! credit the gap between them to the zone of the later sample, unless the
//! gap reaches the gap threshold, in which case it is treated as a tracking
//! discontinuity and credits nothing.

use crate::convention::CourtConvention;
use crate::model::ZoneModel;
use crate::ZoneError;
use courtmap_core::CourtPosition;
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Gaps between consecutive samples at or above this many seconds accrue no time.
pub const GAP_THRESHOLD: f64 = 2.0;

/// Closed interval of active play, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RallyWindow {
    pub start: f64,
    pub end: f64,
}

impl RallyWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Occupancy of one zone for one subject.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneStat {
    pub zone_id: String,
    /// Seconds.
    pub time_spent: f64,
    /// Share of the total accrued time, `0..=100`.
    pub percentage: f64,
    pub entry_count: u32,
}

/// One [`ZoneStat`] per zone, in model order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneDominance {
    /// Name of the zone model the stats refer to.
    pub model: String,
    pub stats: Vec<ZoneStat>,
    pub total_time: f64,
    /// Samples that fell inside a rally window.
    pub samples_in_play: usize,
}

impl ZoneDominance {
    fn from_accumulators(
        model: &str,
        ids: impl Iterator<Item = String>,
        time: &[f64],
        entries: &[u32],
        samples_in_play: usize,
    ) -> Self {
        let total_time: f64 = time.iter().sum();
        let stats = ids
            .zip(time.iter().zip(entries))
            .map(|(zone_id, (&t, &n))| ZoneStat {
                zone_id,
                time_spent: t,
                percentage: percentage(t, total_time),
                entry_count: n,
            })
            .collect();
        Self {
            model: model.to_string(),
            stats,
            total_time,
            samples_in_play,
        }
    }

    pub fn stat(&self, zone_id: &str) -> Option<&ZoneStat> {
        self.stats.iter().find(|s| s.zone_id == zone_id)
    }

    /// Zone with the most accrued time; the first in model order wins ties.
    pub fn dominant(&self) -> Option<&ZoneStat> {
        if self.total_time <= 0.0 {
            return None;
        }
        let mut best: Option<&ZoneStat> = None;
        for s in &self.stats {
            if best.is_none_or(|b| s.time_spent > b.time_spent) {
                best = Some(s);
            }
        }
        best
    }

    /// Percentage of accrued time spent in the pressure zones of `model`.
    pub fn pressure_share(&self, model: &ZoneModel) -> f64 {
        self.stats
            .iter()
            .filter(|s| model.get(&s.zone_id).is_some_and(|z| z.is_pressure_zone))
            .map(|s| s.percentage)
            .sum()
    }

    /// Sum several subjects into one view, recomputing percentages from the
    /// combined total.
    pub fn combine(parts: &[ZoneDominance]) -> Result<ZoneDominance, ZoneError> {
        let first = parts.first().ok_or(ZoneError::NothingToCombine)?;
        let n = first.stats.len();
        let mut time = vec![0.0; n];
        let mut entries = vec![0u32; n];
        let mut samples = 0;

        for part in parts {
            let same_layout = part.stats.len() == n
                && part
                    .stats
                    .iter()
                    .zip(&first.stats)
                    .all(|(a, b)| a.zone_id == b.zone_id);
            if !same_layout {
                return Err(ZoneError::ModelMismatch {
                    expected: first.model.clone(),
                    found: part.model.clone(),
                });
            }
            for (i, s) in part.stats.iter().enumerate() {
                time[i] += s.time_spent;
                entries[i] = entries[i].saturating_add(s.entry_count);
            }
            samples += part.samples_in_play;
        }

        Ok(ZoneDominance::from_accumulators(
            &first.model,
            first.stats.iter().map(|s| s.zone_id.clone()),
            &time,
            &entries,
            samples,
        ))
    }
}

fn percentage(t: f64, total: f64) -> f64 {
    if total > 0.0 {
        t / total * 100.0
    } else {
        0.0
    }
}

fn default_gap_threshold() -> f64 {
    GAP_THRESHOLD
}

/// Aggregation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatorParams {
    #[serde(default = "default_gap_threshold")]
    pub gap_threshold: f64,
    #[serde(default)]
    pub convention: CourtConvention,
}

impl Default for AggregatorParams {
    fn default() -> Self {
        Self {
            gap_threshold: GAP_THRESHOLD,
            convention: CourtConvention::Raw,
        }
    }
}

impl AggregatorParams {
    pub fn validate(&self) -> Result<(), ZoneError> {
        if !(self.gap_threshold.is_finite() && self.gap_threshold > 0.0) {
            return Err(ZoneError::InvalidGapThreshold {
                value: self.gap_threshold,
            });
        }
        self.convention.validate()
    }
}

/// Computes [`ZoneDominance`] for one subject at a time.
///
/// Holds no per-call state; one aggregator can serve any number of subjects
/// and threads.
#[derive(Clone, Debug)]
pub struct ZoneDominanceAggregator {
    model: ZoneModel,
    params: AggregatorParams,
}

impl ZoneDominanceAggregator {
    /// Aggregator with raw coordinates and the default gap threshold.
    pub fn new(model: ZoneModel) -> Self {
        Self {
            model,
            params: AggregatorParams::default(),
        }
    }

    pub fn with_params(model: ZoneModel, params: AggregatorParams) -> Result<Self, ZoneError> {
        params.validate()?;
        Ok(Self { model, params })
    }

    pub fn with_convention(self, convention: CourtConvention) -> Result<Self, ZoneError> {
        let params = AggregatorParams {
            convention,
            ..self.params
        };
        Self::with_params(self.model, params)
    }

    pub fn with_gap_threshold(self, gap_threshold: f64) -> Result<Self, ZoneError> {
        let params = AggregatorParams {
            gap_threshold,
            ..self.params
        };
        Self::with_params(self.model, params)
    }

    pub fn model(&self) -> &ZoneModel {
        &self.model
    }

    pub fn params(&self) -> &AggregatorParams {
        &self.params
    }

    /// Aggregate one subject's samples. Input order is not significant.
    ///
    /// Zero in-play samples yield all-zero stats, one per zone.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip_all,
            fields(samples = samples.len(), rallies = rallies.len(), model = self.model.name())
        )
    )]
    pub fn aggregate(&self, samples: &[CourtPosition], rallies: &[RallyWindow]) -> ZoneDominance {
        let mut in_play: Vec<CourtPosition> = samples
            .iter()
            .filter(|p| p.is_finite() && rallies.iter().any(|r| r.contains(p.timestamp)))
            .copied()
            .collect();
        in_play.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        if in_play.len() < samples.len() {
            debug!(
                "{} of {} samples outside rally windows or non-finite",
                samples.len() - in_play.len(),
                samples.len()
            );
        }

        let n = self.model.len();
        let mut time = vec![0.0; n];
        let mut entries = vec![0u32; n];

        let gap = self.params.gap_threshold;
        let mut last_timestamp = in_play.first().map_or(0.0, |p| p.timestamp);
        let mut last_zone: Option<usize> = None;

        for p in &in_play {
            let zone = self
                .params
                .convention
                .to_zone_frame(p)
                .and_then(|q| self.model.locate_index(q.x, q.y));

            if let Some(z) = zone {
                let dt = p.timestamp - last_timestamp;
                if dt > 0.0 && dt < gap {
                    time[z] += dt;
                }
                if last_zone != Some(z) {
                    entries[z] = entries[z].saturating_add(1);
                    last_zone = Some(z);
                }
            }
            last_timestamp = p.timestamp;
        }

        ZoneDominance::from_accumulators(
            self.model.name(),
            self.model.zones().iter().map(|z| z.id.clone()),
            &time,
            &entries,
            in_play.len(),
        )
    }
}
