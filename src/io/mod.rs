//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `csv` - score tables in, scored and top-N tables out
//! - `geojson` - neighbourhood geometry in, colored feature collections out
//! - `wkt` - Well-Known Text geometry columns

pub(crate) mod csv;
pub(crate) mod geojson;
mod wkt;

pub use csv::{read_score_table, read_score_table_bytes, read_score_table_str, round2, write_scores, write_scores_string};
pub use geojson::{
    GeometryLayer, features_to_geojson, read_geometry_layer, read_geometry_layer_bytes, write_feature_collection,
};

pub(crate) use geojson::parse_geojson_geometry;
pub(crate) use wkt::parse_wkt;
