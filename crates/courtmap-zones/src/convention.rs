//! Per-sport mapping from court coordinates into the frame a zone model is
//! laid out in.
//!
//! Both sport conventions take full-court input with `y` running from one
//! back line to the other, and fold the far half onto the near one. Folding
//! mirrors `x` as well, so "left" is the same side of the court from every
//! player's point of view.

use crate::schemes::{
    PADEL_HALF_DEPTH, PADEL_WIDTH, TENNIS_DOUBLES_WIDTH, TENNIS_LENGTH, TENNIS_NET_FROM_BASELINE,
};
use crate::ZoneError;
use courtmap_core::CourtPosition;
use serde::{Deserialize, Serialize};

fn tennis_width() -> f64 {
    TENNIS_DOUBLES_WIDTH
}

fn padel_width() -> f64 {
    PADEL_WIDTH
}

/// Coordinate convention applied to every sample before zone lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CourtConvention {
    /// Positions are used as-is.
    #[default]
    Raw,
    /// Full-court tennis, `y = 0` at the near baseline. Output is in the
    /// baseline frame: `y = 0` at the player's own baseline, `y = net_position`
    /// at the net.
    Tennis {
        net_position: f64,
        full_court_length: f64,
        #[serde(default = "tennis_width")]
        court_width: f64,
    },
    /// Full-court padel, `y = 0` at the near back wall and the net at
    /// `y = half_court_depth`. Output is the player's own half: `y = 0` at the
    /// net, `y = half_court_depth` at their back wall. Samples outside the
    /// court length have no frame position.
    Padel {
        half_court_depth: f64,
        #[serde(default = "padel_width")]
        court_width: f64,
    },
}

impl CourtConvention {
    pub const TENNIS: CourtConvention = CourtConvention::Tennis {
        net_position: TENNIS_NET_FROM_BASELINE,
        full_court_length: TENNIS_LENGTH,
        court_width: TENNIS_DOUBLES_WIDTH,
    };
    pub const PADEL: CourtConvention = CourtConvention::Padel {
        half_court_depth: PADEL_HALF_DEPTH,
        court_width: PADEL_WIDTH,
    };

    pub fn validate(&self) -> Result<(), ZoneError> {
        match *self {
            CourtConvention::Raw => Ok(()),
            CourtConvention::Tennis {
                net_position,
                full_court_length,
                court_width,
            } => {
                if !net_position.is_finite() || !full_court_length.is_finite() {
                    return Err(ZoneError::InvalidConvention {
                        reason: "tennis dimensions must be finite",
                    });
                }
                if net_position <= 0.0 || net_position >= full_court_length {
                    return Err(ZoneError::InvalidConvention {
                        reason: "tennis net must lie strictly inside the court length",
                    });
                }
                check_width(court_width)
            }
            CourtConvention::Padel {
                half_court_depth,
                court_width,
            } => {
                if !(half_court_depth.is_finite() && half_court_depth > 0.0) {
                    return Err(ZoneError::InvalidConvention {
                        reason: "padel half-court depth must be positive",
                    });
                }
                check_width(court_width)
            }
        }
    }

    /// Map `p` into the zone frame, or `None` when it has no position there.
    #[inline]
    pub fn to_zone_frame(&self, p: &CourtPosition) -> Option<CourtPosition> {
        match *self {
            CourtConvention::Raw => Some(*p),
            CourtConvention::Tennis {
                net_position,
                full_court_length,
                court_width,
            } => {
                let (x, y) = if p.y > net_position {
                    (court_width - p.x, full_court_length - p.y)
                } else {
                    (p.x, p.y)
                };
                Some(CourtPosition::new(p.timestamp, x, y))
            }
            CourtConvention::Padel {
                half_court_depth,
                court_width,
            } => {
                if p.y < 0.0 || p.y > 2.0 * half_court_depth {
                    return None;
                }
                let (x, y) = if p.y > half_court_depth {
                    (court_width - p.x, p.y - half_court_depth)
                } else {
                    (p.x, half_court_depth - p.y)
                };
                Some(CourtPosition::new(p.timestamp, x, y))
            }
        }
    }
}

fn check_width(width: f64) -> Result<(), ZoneError> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(ZoneError::InvalidConvention {
            reason: "court width must be positive",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at(x: f64, y: f64) -> CourtPosition {
        CourtPosition::new(1.0, x, y)
    }

    #[test]
    fn raw_passes_through() {
        assert_eq!(CourtConvention::Raw.to_zone_frame(&at(3.0, 40.0)), Some(at(3.0, 40.0)));
    }

    #[test]
    fn tennis_mirrors_the_far_half_only() {
        let c = CourtConvention::TENNIS;
        let near = c.to_zone_frame(&at(2.0, 4.0)).expect("mapped");
        assert_eq!(near, at(2.0, 4.0));

        let far = c.to_zone_frame(&at(2.0, 20.0)).expect("mapped");
        assert_relative_eq!(far.x, 8.97, epsilon = 1e-9);
        assert_relative_eq!(far.y, 3.77, epsilon = 1e-9);

        let net = c.to_zone_frame(&at(2.0, TENNIS_NET_FROM_BASELINE)).expect("mapped");
        assert_eq!(net, at(2.0, TENNIS_NET_FROM_BASELINE));

        // Behind the far baseline lands behind the near one.
        let deep = c.to_zone_frame(&at(2.0, 25.77)).expect("mapped");
        assert_relative_eq!(deep.y, -2.0, epsilon = 1e-9);
    }

    #[test]
    fn padel_folds_both_halves_to_distance_from_the_net() {
        let c = CourtConvention::PADEL;
        assert_eq!(c.to_zone_frame(&at(3.0, 9.5)), Some(at(3.0, 0.5)));
        assert_eq!(c.to_zone_frame(&at(3.0, 0.0)), Some(at(3.0, 10.0)));
        assert_eq!(c.to_zone_frame(&at(3.0, 10.0)), Some(at(3.0, 0.0)));

        let far_net = c.to_zone_frame(&at(3.0, 10.5)).expect("mapped");
        assert_relative_eq!(far_net.x, 7.0, epsilon = 1e-9);
        assert_relative_eq!(far_net.y, 0.5, epsilon = 1e-9);

        let far_back = c.to_zone_frame(&at(3.0, 20.0)).expect("mapped");
        assert_relative_eq!(far_back.y, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn padel_drops_samples_beyond_the_back_walls() {
        let c = CourtConvention::PADEL;
        assert_eq!(c.to_zone_frame(&at(5.0, -0.1)), None);
        assert_eq!(c.to_zone_frame(&at(5.0, 20.1)), None);
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        let inverted = CourtConvention::Tennis {
            net_position: 30.0,
            full_court_length: 23.77,
            court_width: TENNIS_DOUBLES_WIDTH,
        };
        assert!(inverted.validate().is_err());
        assert!(CourtConvention::Padel {
            half_court_depth: 0.0,
            court_width: PADEL_WIDTH,
        }
        .validate()
        .is_err());
        assert!(CourtConvention::Padel {
            half_court_depth: 10.0,
            court_width: -1.0,
        }
        .validate()
        .is_err());
        assert!(CourtConvention::Raw.validate().is_ok());
    }

    #[test]
    fn tagged_serde_form() {
        let c: CourtConvention =
            serde_json::from_str(r#"{"kind":"padel","half_court_depth":10.0}"#).expect("parse");
        assert_eq!(c, CourtConvention::PADEL);
        let raw: CourtConvention = serde_json::from_str(r#"{"kind":"raw"}"#).expect("parse");
        assert_eq!(raw, CourtConvention::Raw);
    }
}
