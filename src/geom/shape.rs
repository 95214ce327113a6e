use geo::{Centroid, LineString, MultiPolygon};
use serde_json::Value;

use crate::{Error, Result};

/// Polygon as an ordered list of rings.
///
/// For geometries read from WKT or GeoJSON the first ring is the exterior and
/// the rest are holes. A polygon produced by `flatten_outer_rings` instead
/// holds one exterior ring per original part, all as peers.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub rings: Vec<LineString<f64>>,
}

impl Polygon {
    pub fn new(rings: Vec<LineString<f64>>) -> Self {
        Self { rings }
    }

    pub fn from_geo(polygon: &geo::Polygon<f64>) -> Self {
        let mut rings = Vec::with_capacity(1 + polygon.interiors().len());
        rings.push(polygon.exterior().clone());
        rings.extend(polygon.interiors().iter().cloned());
        Self { rings }
    }

    /// The first ring, which is the exterior for parsed polygons.
    pub fn outer(&self) -> Option<&LineString<f64>> {
        self.rings.first()
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    /// Rings as GeoJSON position arrays.
    pub fn coordinates(&self) -> Vec<Vec<[f64; 2]>> {
        self.rings.iter()
            .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
            .collect()
    }
}

/// Geometry accepted by the pipeline: a polygon or a multi-part polygon.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Convert a parsed `geo` geometry, rejecting anything that is not polygonal.
    pub fn from_geo(geom: geo::Geometry<f64>) -> Result<Self> {
        match geom {
            geo::Geometry::Polygon(p) => Ok(Geometry::Polygon(Polygon::from_geo(&p))),
            geo::Geometry::MultiPolygon(mp) => {
                Ok(Geometry::MultiPolygon(mp.0.iter().map(Polygon::from_geo).collect()))
            }
            other => Err(Error::InvalidGeometry(geo_type_name(&other).to_string())),
        }
    }

    /// Convert to a `geo::MultiPolygon`, taking each polygon's first ring as exterior.
    ///
    /// Flattened polygons are split back into one part per ring so that their
    /// peer outer rings are not read as holes.
    pub fn to_geo(&self, flattened: bool) -> MultiPolygon<f64> {
        let to_geo = |p: &Polygon| {
            let mut rings = p.rings.iter().cloned();
            let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
            geo::Polygon::new(exterior, rings.collect())
        };
        match self {
            Geometry::Polygon(p) if flattened => MultiPolygon(
                p.rings.iter().map(|r| geo::Polygon::new(r.clone(), vec![])).collect()
            ),
            Geometry::Polygon(p) => MultiPolygon(vec![to_geo(p)]),
            Geometry::MultiPolygon(ps) => MultiPolygon(ps.iter().map(to_geo).collect()),
        }
    }

    /// Area-weighted centroid as `(x, y)`, or `None` for empty geometry.
    pub fn centroid(&self, flattened: bool) -> Option<(f64, f64)> {
        self.to_geo(flattened).centroid().map(|p| (p.x(), p.y()))
    }

    /// GeoJSON geometry object.
    pub fn to_geojson(&self) -> Value {
        match self {
            Geometry::Polygon(p) => serde_json::json!({
                "type": "Polygon",
                "coordinates": p.coordinates(),
            }),
            Geometry::MultiPolygon(ps) => serde_json::json!({
                "type": "MultiPolygon",
                "coordinates": ps.iter().map(Polygon::coordinates).collect::<Vec<_>>(),
            }),
        }
    }
}

fn geo_type_name(geom: &geo::Geometry<f64>) -> &'static str {
    match geom {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}
