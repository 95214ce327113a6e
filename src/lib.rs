#![doc = "Neighbourhood vulnerability map pipeline: scores to colors, geometry normalization, and keyed feature merging"]
mod cache;
mod color;
mod config;
mod dashboard;
mod error;
mod geom;
mod io;
mod merge;
mod table;

#[doc(inline)]
pub use error::{Error, RecordError, Result};

#[doc(inline)]
pub use color::{ColorMapper, ColorMode, EMPHASIS_EXPONENT, Palette, Rgba, ScoreRange, map_score};

#[doc(inline)]
pub use geom::{Geometry, GeometryNormalizer, MultiPolygonPolicy, Polygon, RawGeometry, flatten_outer_rings};

#[doc(inline)]
pub use table::{ScoreRecord, ScoreStats, ScoreTable, TableSchema};

#[doc(inline)]
pub use merge::{
    DuplicatePolicy, Feature, FeatureMerger, GeometryFeature, KeyIndex, MergeOutput, MergeReport, features_from_records, merge,
};

#[doc(inline)]
pub use config::{LayerVisibility, RenderConfig};

#[doc(inline)]
pub use cache::{SourceCache, sha256_hex};

#[doc(inline)]
pub use dashboard::{DEFAULT_PITCH, DEFAULT_ZOOM, Dashboard, Render, ScatterPoint, Summary, ViewState};

#[doc(inline)]
pub use io::{
    GeometryLayer, features_to_geojson, read_geometry_layer, read_geometry_layer_bytes, read_score_table,
    read_score_table_bytes, read_score_table_str, round2, write_feature_collection, write_scores, write_scores_string,
};
