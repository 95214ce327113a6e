//! GeoJSON writing operations.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use serde_json::{Map, Value, json};

use crate::{Result, merge::Feature};

/// Export features as a GeoJSON FeatureCollection.
/// Each feature's properties carry the key (under `key_field`), score, RGBA color and hex fill.
pub fn features_to_geojson(features: &[Feature], key_field: &str) -> Value {
    let features: Vec<Value> = features.iter().map(|f| {
        let mut properties = Map::new();
        properties.insert(key_field.to_string(), json!(f.key));
        properties.insert("score".to_string(), json!(f.score));
        properties.insert("color".to_string(), json!(f.color.to_array()));
        properties.insert("fill".to_string(), json!(f.color.to_hex()));

        json!({
            "type": "Feature",
            "id": f.key, // Feature ID for renderers that diff by id
            "geometry": f.geometry.to_geojson(),
            "properties": properties,
        })
    }).collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write features as a GeoJSON FeatureCollection to `path`.
pub fn write_feature_collection(features: &[Feature], key_field: &str, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &features_to_geojson(features, key_field))?;
    writer.flush()?;
    Ok(())
}
