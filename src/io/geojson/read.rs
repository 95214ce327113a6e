//! GeoJSON reading operations.

use std::{fs, path::Path};

use geo::{Coord, LineString};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    Error, Result,
    geom::{Geometry, Polygon, RawGeometry},
    merge::GeometryFeature,
};

/// Geometry features read from a GeoJSON FeatureCollection.
#[derive(Clone, Debug, Default)]
pub struct GeometryLayer {
    pub features: Vec<GeometryFeature>,
    /// Features dropped because they carried no usable key.
    pub skipped: usize,
}

impl GeometryLayer {
    pub fn new(features: Vec<GeometryFeature>) -> Self {
        Self { features, skipped: 0 }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Read a FeatureCollection from `path`, keying each feature by `properties.<key_field>`.
pub fn read_geometry_layer(path: &Path, key_field: &str) -> Result<GeometryLayer> {
    let bytes = fs::read(path).map_err(|e| Error::from_open(e, path))?;
    read_geometry_layer_bytes(&bytes, key_field)
}

/// Read a FeatureCollection from bytes.
pub fn read_geometry_layer_bytes(bytes: &[u8], key_field: &str) -> Result<GeometryLayer> {
    let value: Value = serde_json::from_slice(bytes)?;
    let features = value["features"].as_array()
        .ok_or_else(|| Error::Parse("[io::geojson::read] expected a FeatureCollection with a features array".into()))?;

    let mut layer = GeometryLayer::default();
    for (idx, feature) in features.iter().enumerate() {
        let Some(key) = property_key(&feature["properties"][key_field]) else {
            warn!(feature = idx, key_field, "skipping feature without a key");
            layer.skipped += 1;
            continue;
        };
        // Geometry stays raw here; parse failures surface per record during merge.
        layer.features.push(GeometryFeature { key, geometry: RawGeometry::GeoJson(feature["geometry"].clone()) });
    }
    debug!(features = layer.len(), skipped = layer.skipped, "read geometry layer");
    Ok(layer)
}

/// Keys may be strings or numbers.
fn property_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a GeoJSON geometry object (`Polygon` or `MultiPolygon`).
pub(crate) fn parse_geojson_geometry(value: &Value) -> Result<Geometry> {
    let kind = value["type"].as_str()
        .ok_or_else(|| Error::Parse("[io::geojson::read] geometry has no type".into()))?;
    let coords = &value["coordinates"];
    match kind {
        "Polygon" => Ok(Geometry::Polygon(parse_polygon_coords(coords)?)),
        "MultiPolygon" => {
            let parts = coords.as_array()
                .ok_or_else(|| Error::Parse("[io::geojson::read] MultiPolygon coordinates must be an array".into()))?;
            Ok(Geometry::MultiPolygon(parts.iter().map(parse_polygon_coords).collect::<Result<_>>()?))
        }
        other => Err(Error::InvalidGeometry(other.to_string())),
    }
}

/// Parse Polygon coordinates: `[ring, ring, ...]`, exterior first.
fn parse_polygon_coords(coords: &Value) -> Result<Polygon> {
    let rings = coords.as_array()
        .ok_or_else(|| Error::Parse("[io::geojson::read] Polygon coordinates must be an array of rings".into()))?;
    if rings.is_empty() {
        return Err(Error::Parse("[io::geojson::read] Polygon has no rings".into()));
    }
    Ok(Polygon::new(rings.iter().map(parse_ring_coords).collect::<Result<_>>()?))
}

/// Parse a ring `[[x, y], ...]`, closing it if the last position differs from the first.
fn parse_ring_coords(ring: &Value) -> Result<LineString<f64>> {
    let positions = ring.as_array()
        .ok_or_else(|| Error::Parse("[io::geojson::read] ring must be an array of positions".into()))?;

    let mut points = Vec::with_capacity(positions.len() + 1);
    for position in positions {
        let (x, y) = match position.as_array().map(Vec::as_slice) {
            Some([x, y, ..]) => (x.as_f64(), y.as_f64()),
            _ => (None, None),
        };
        let (Some(x), Some(y)) = (x, y) else {
            return Err(Error::Parse(format!("[io::geojson::read] invalid position {position}")));
        };
        points.push(Coord { x, y });
    }

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }
    Ok(LineString(points))
}
