use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, geom::{Geometry, Polygon}, io};

/// Geometry as it arrives from a source, before parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum RawGeometry {
    /// Well-known text, e.g. a `the_geom` column.
    Wkt(String),
    /// A GeoJSON geometry object.
    GeoJson(Value),
    /// Already parsed.
    Structured(Geometry),
}

/// What to do with multi-part polygons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MultiPolygonPolicy {
    /// Keep every part, holes included.
    #[default]
    Preserve,
    /// Collapse to a single polygon made of the outer ring of each part.
    /// Lossy: holes are dropped and the parts become peer rings.
    FlattenOuterRings,
}

impl std::str::FromStr for MultiPolygonPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "flatten" | "flatten-outer-rings" | "legacy" => Ok(Self::FlattenOuterRings),
            other => Err(format!("unknown multipolygon policy {other:?}")),
        }
    }
}

/// Parses raw geometries and applies the multipolygon policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeometryNormalizer {
    pub policy: MultiPolygonPolicy,
}

impl GeometryNormalizer {
    pub fn new(policy: MultiPolygonPolicy) -> Self {
        Self { policy }
    }

    /// Parse `raw` and normalize it.
    ///
    /// Fails with `Error::Parse` for malformed WKT or GeoJSON and with
    /// `Error::InvalidGeometry` for non-polygonal types.
    pub fn normalize(&self, raw: &RawGeometry) -> Result<Geometry> {
        let geom = match raw {
            RawGeometry::Wkt(text) => io::parse_wkt(text)?,
            RawGeometry::GeoJson(value) => io::parse_geojson_geometry(value)?,
            RawGeometry::Structured(geom) => geom.clone(),
        };
        Ok(self.apply(geom))
    }

    /// Apply the policy to an already parsed geometry. Polygons pass through unchanged.
    pub fn apply(&self, geom: Geometry) -> Geometry {
        match (self.policy, geom) {
            (MultiPolygonPolicy::FlattenOuterRings, Geometry::MultiPolygon(parts)) => {
                Geometry::Polygon(flatten_outer_rings(&parts))
            }
            (_, geom) => geom,
        }
    }

    pub fn flattens(&self) -> bool {
        self.policy == MultiPolygonPolicy::FlattenOuterRings
    }
}

/// One polygon holding the first ring of every part, in part order.
pub fn flatten_outer_rings(parts: &[Polygon]) -> Polygon {
    Polygon::new(parts.iter().filter_map(|p| p.outer().cloned()).collect())
}
