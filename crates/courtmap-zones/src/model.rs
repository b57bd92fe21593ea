use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Axis-aligned rectangular court region in meters.
///
/// Bounds are closed on all sides; where two zones share an edge, the zone
/// listed first in its [`ZoneModel`] owns the edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    pub id: String,
    pub name: String,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    #[serde(default)]
    pub is_pressure_zone: bool,
}

impl ZoneDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, x: [f64; 2], y: [f64; 2]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            x_min: x[0],
            x_max: x[1],
            y_min: y[0],
            y_max: y[1],
            is_pressure_zone: false,
        }
    }

    /// Mark this zone as a pressure zone.
    pub fn pressure(mut self) -> Self {
        self.is_pressure_zone = true;
        self
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    pub fn area(&self) -> f64 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min)
    }
}

/// Errors raised when a zone model fails validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneModelError {
    #[error("zone model `{name}` has no zones")]
    Empty { name: String },
    #[error("zone id `{id}` appears more than once")]
    DuplicateZoneId { id: String },
    #[error("zone `{id}` has min bounds above max bounds")]
    InvertedBounds { id: String },
    #[error("zone `{id}` has non-finite bounds")]
    NonFiniteBounds { id: String },
}

/// Ordered, immutable partition of a court into named zones.
///
/// Zones need not cover the court exhaustively. Lookups return the first
/// zone in model order that contains the point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZoneModel {
    name: String,
    zones: Vec<ZoneDefinition>,
}

impl ZoneModel {
    pub fn new(name: impl Into<String>, zones: Vec<ZoneDefinition>) -> Result<Self, ZoneModelError> {
        let name = name.into();
        if zones.is_empty() {
            return Err(ZoneModelError::Empty { name });
        }

        let mut ids = HashSet::with_capacity(zones.len());
        for z in &zones {
            let bounds = [z.x_min, z.x_max, z.y_min, z.y_max];
            if bounds.iter().any(|v| !v.is_finite()) {
                return Err(ZoneModelError::NonFiniteBounds { id: z.id.clone() });
            }
            if z.x_min > z.x_max || z.y_min > z.y_max {
                return Err(ZoneModelError::InvertedBounds { id: z.id.clone() });
            }
            if !ids.insert(z.id.as_str()) {
                return Err(ZoneModelError::DuplicateZoneId { id: z.id.clone() });
            }
        }

        Ok(Self { name, zones })
    }

    /// Built-in models are checked by tests instead of at runtime.
    pub(crate) fn from_static(name: &str, zones: Vec<ZoneDefinition>) -> Self {
        Self {
            name: name.to_string(),
            zones,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn zones(&self) -> &[ZoneDefinition] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ZoneDefinition> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Index of the first zone containing `(x, y)`.
    #[inline]
    pub fn locate_index(&self, x: f64, y: f64) -> Option<usize> {
        self.zones.iter().position(|z| z.contains(x, y))
    }

    pub fn locate(&self, x: f64, y: f64) -> Option<&ZoneDefinition> {
        self.locate_index(x, y).map(|i| &self.zones[i])
    }
}

impl<'de> Deserialize<'de> for ZoneModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            name: String,
            zones: Vec<ZoneDefinition>,
        }
        let raw = Raw::deserialize(deserializer)?;
        ZoneModel::new(raw.name, raw.zones).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halves() -> ZoneModel {
        ZoneModel::new(
            "halves",
            vec![
                ZoneDefinition::new("left", "Left", [0.0, 5.0], [0.0, 10.0]),
                ZoneDefinition::new("right", "Right", [5.0, 10.0], [0.0, 10.0]),
            ],
        )
        .expect("valid model")
    }

    #[test]
    fn shared_edges_resolve_to_first_listed_zone() {
        let m = halves();
        assert_eq!(m.locate(5.0, 3.0).map(|z| z.id.as_str()), Some("left"));
        assert_eq!(m.locate(7.0, 3.0).map(|z| z.id.as_str()), Some("right"));
        assert_eq!(m.locate_index(0.0, 10.0), Some(0));
        assert!(m.locate(10.5, 3.0).is_none());
        assert!(m.locate(f64::NAN, 3.0).is_none());
    }

    #[test]
    fn validation_rejects_bad_models() {
        assert_eq!(
            ZoneModel::new("empty", Vec::new()),
            Err(ZoneModelError::Empty {
                name: "empty".into()
            })
        );

        let dup = ZoneModel::new(
            "dup",
            vec![
                ZoneDefinition::new("a", "A", [0.0, 1.0], [0.0, 1.0]),
                ZoneDefinition::new("a", "A again", [1.0, 2.0], [0.0, 1.0]),
            ],
        );
        assert_eq!(dup, Err(ZoneModelError::DuplicateZoneId { id: "a".into() }));

        let inverted = ZoneModel::new(
            "inv",
            vec![ZoneDefinition::new("a", "A", [2.0, 1.0], [0.0, 1.0])],
        );
        assert_eq!(inverted, Err(ZoneModelError::InvertedBounds { id: "a".into() }));

        let infinite = ZoneModel::new(
            "inf",
            vec![ZoneDefinition::new("a", "A", [0.0, f64::INFINITY], [0.0, 1.0])],
        );
        assert_eq!(infinite, Err(ZoneModelError::NonFiniteBounds { id: "a".into() }));
    }

    #[test]
    fn deserialization_validates() {
        let ok = r#"{"name":"one","zones":[
            {"id":"a","name":"A","x_min":0,"x_max":1,"y_min":0,"y_max":1,"is_pressure_zone":true}]}"#;
        let m: ZoneModel = serde_json::from_str(ok).expect("parse");
        assert!(m.zones()[0].is_pressure_zone);
        assert_eq!(m.get("a").map(|z| z.area()), Some(1.0));

        let bad = r#"{"name":"one","zones":[]}"#;
        assert!(serde_json::from_str::<ZoneModel>(bad).is_err());
    }
}
