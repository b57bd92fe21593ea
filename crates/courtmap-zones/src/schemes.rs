//! Built-in zone partitions.
//!
//! Padel schemes use a single half court in the player's own frame produced
//! by [`CourtConvention::Padel`]: `y = 0` at the net, `y = 10` at the back
//! wall, `x` across the 10 m width.
//! Tennis schemes use the baseline frame produced by
//! [`CourtConvention::Tennis`]: `y = 0` at the baseline, `y = 11.885` at the
//! net.

use crate::convention::CourtConvention;
use crate::model::{ZoneDefinition, ZoneModel};
use serde::{Deserialize, Serialize};

pub const PADEL_WIDTH: f64 = 10.0;
pub const PADEL_HALF_DEPTH: f64 = 10.0;

pub const TENNIS_LENGTH: f64 = 23.77;
pub const TENNIS_NET_FROM_BASELINE: f64 = TENNIS_LENGTH / 2.0;
pub const TENNIS_DOUBLES_WIDTH: f64 = 10.97;
/// Service line distance from the baseline.
pub const TENNIS_SERVICE_LINE: f64 = TENNIS_NET_FROM_BASELINE - 6.40;

const PADEL_NET_DEPTH: f64 = 3.5;
const PADEL_TRANSITION_DEPTH: f64 = 7.0;

/// Named built-in partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneScheme {
    /// Net, transition and defense bands of a padel half court.
    PadelDepth,
    /// 3 × 3 grid over a padel half court.
    PadelGrid,
    /// Depth bands of a tennis half court, baseline frame.
    TennisDepth,
}

impl ZoneScheme {
    pub fn model(self) -> ZoneModel {
        match self {
            ZoneScheme::PadelDepth => padel_depth(),
            ZoneScheme::PadelGrid => padel_grid(),
            ZoneScheme::TennisDepth => tennis_depth(),
        }
    }

    /// The court convention whose output frame this scheme is laid out in.
    pub fn convention(self) -> CourtConvention {
        match self {
            ZoneScheme::PadelDepth | ZoneScheme::PadelGrid => CourtConvention::PADEL,
            ZoneScheme::TennisDepth => CourtConvention::TENNIS,
        }
    }
}

fn padel_depth() -> ZoneModel {
    let x = [0.0, PADEL_WIDTH];
    ZoneModel::from_static(
        "padel_depth",
        vec![
            ZoneDefinition::new("net", "Net", x, [0.0, PADEL_NET_DEPTH]),
            ZoneDefinition::new(
                "transition",
                "Transition",
                x,
                [PADEL_NET_DEPTH, PADEL_TRANSITION_DEPTH],
            )
            .pressure(),
            ZoneDefinition::new("defense", "Defense", x, [PADEL_TRANSITION_DEPTH, PADEL_HALF_DEPTH]),
        ],
    )
}

fn padel_grid() -> ZoneModel {
    let third = PADEL_WIDTH / 3.0;
    let columns = [
        ("left", "Left", [0.0, third]),
        ("center", "Center", [third, 2.0 * third]),
        ("right", "Right", [2.0 * third, PADEL_WIDTH]),
    ];
    let rows = [
        ("net", "Net", [0.0, PADEL_NET_DEPTH], false),
        ("mid", "Mid", [PADEL_NET_DEPTH, PADEL_TRANSITION_DEPTH], true),
        ("back", "Back", [PADEL_TRANSITION_DEPTH, PADEL_HALF_DEPTH], false),
    ];

    let mut zones = Vec::with_capacity(9);
    for (row_id, row_name, y, pressure) in rows {
        for (col_id, col_name, x) in columns {
            let mut z = ZoneDefinition::new(
                format!("{row_id}_{col_id}"),
                format!("{row_name} {col_name}"),
                x,
                y,
            );
            z.is_pressure_zone = pressure;
            zones.push(z);
        }
    }
    ZoneModel::from_static("padel_grid", zones)
}

fn tennis_depth() -> ZoneModel {
    let x = [-3.0, TENNIS_DOUBLES_WIDTH + 3.0];
    ZoneModel::from_static(
        "tennis_depth",
        vec![
            ZoneDefinition::new("behind_baseline", "Behind baseline", x, [-6.0, 0.0]),
            ZoneDefinition::new("baseline", "Baseline", x, [0.0, 3.0]),
            ZoneDefinition::new("no_mans_land", "No man's land", x, [3.0, TENNIS_SERVICE_LINE])
                .pressure(),
            ZoneDefinition::new(
                "service_box",
                "Service box",
                x,
                [TENNIS_SERVICE_LINE, TENNIS_NET_FROM_BASELINE - 2.0],
            ),
            ZoneDefinition::new(
                "net",
                "Net",
                x,
                [TENNIS_NET_FROM_BASELINE - 2.0, TENNIS_NET_FROM_BASELINE],
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [ZoneScheme; 3] = [
        ZoneScheme::PadelDepth,
        ZoneScheme::PadelGrid,
        ZoneScheme::TennisDepth,
    ];

    #[test]
    fn built_in_models_pass_validation() {
        for scheme in ALL {
            let m = scheme.model();
            let rebuilt = ZoneModel::new(m.name(), m.zones().to_vec());
            assert_eq!(rebuilt.as_ref(), Ok(&m), "{scheme:?}");
            assert!(scheme.convention().validate().is_ok());
        }
    }

    #[test]
    fn padel_grid_tiles_the_half_court() {
        let m = ZoneScheme::PadelGrid.model();
        assert_eq!(m.len(), 9);
        let area: f64 = m.zones().iter().map(|z| z.area()).sum();
        assert_relative_eq!(area, PADEL_WIDTH * PADEL_HALF_DEPTH, epsilon = 1e-9);
        assert_eq!(m.locate(5.0, 5.0).map(|z| z.id.as_str()), Some("mid_center"));
        assert!(m.get("mid_left").is_some_and(|z| z.is_pressure_zone));
        assert!(m.get("back_right").is_some_and(|z| !z.is_pressure_zone));
    }

    #[test]
    fn padel_depth_band_edges() {
        let m = ZoneScheme::PadelDepth.model();
        assert_eq!(m.locate(5.0, 3.5).map(|z| z.id.as_str()), Some("net"));
        assert_eq!(m.locate(5.0, 3.6).map(|z| z.id.as_str()), Some("transition"));
        assert_eq!(m.locate(5.0, 10.0).map(|z| z.id.as_str()), Some("defense"));
        assert!(m.locate(5.0, 10.1).is_none());
    }

    #[test]
    fn tennis_bands_follow_court_markings() {
        let m = ZoneScheme::TennisDepth.model();
        assert_relative_eq!(TENNIS_SERVICE_LINE, 5.485, epsilon = 1e-9);
        assert_eq!(m.locate(5.0, -1.0).map(|z| z.id.as_str()), Some("behind_baseline"));
        assert_eq!(m.locate(5.0, 4.0).map(|z| z.id.as_str()), Some("no_mans_land"));
        assert_eq!(m.locate(5.0, 7.0).map(|z| z.id.as_str()), Some("service_box"));
        assert_eq!(m.locate(5.0, 11.0).map(|z| z.id.as_str()), Some("net"));
    }

    #[test]
    fn scheme_names_are_snake_case() {
        let s: ZoneScheme = serde_json::from_str("\"tennis_depth\"").expect("parse");
        assert_eq!(s, ZoneScheme::TennisDepth);
    }
}
