//! One recomputation of the map per `RenderConfig` snapshot.

use std::{fmt, path::Path, sync::Arc};

use ahash::AHashMap;
use serde::Serialize;
use tracing::info;

use crate::{
    Result,
    cache::SourceCache,
    color::{Rgba, ScoreRange},
    config::RenderConfig,
    io::{GeometryLayer, write_feature_collection, write_scores},
    merge::{Feature, FeatureMerger, GeometryFeature, KeyIndex, MergeReport, features_from_records},
    table::{ScoreRecord, ScoreTable, TableSchema},
};

pub const DEFAULT_ZOOM: f64 = 9.0;
pub const DEFAULT_PITCH: f64 = 10.0;

/// Camera for the initial map view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

impl ViewState {
    pub fn centred(longitude: f64, latitude: f64) -> Self {
        Self { latitude, longitude, zoom: DEFAULT_ZOOM, pitch: DEFAULT_PITCH }
    }
}

/// One colored point per neighbourhood.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub key: String,
    pub lon: f64,
    pub lat: f64,
    pub color: Rgba,
    pub score: f64,
}

/// Counts shown alongside the map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Summary {
    /// Records in the table.
    pub total: usize,
    /// Records inside the score filter.
    pub displayed: usize,
    /// Features that made it onto the map.
    pub rendered: usize,
    /// Whole-number bounds for a range slider over the full table.
    pub slider: Option<ScoreRange>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Displaying data for {} neighbourhoods", self.displayed)
    }
}

/// Output of one recomputation.
#[derive(Debug)]
pub struct Render {
    pub features: Vec<Feature>,
    pub points: Vec<ScatterPoint>,
    pub view: Option<ViewState>,
    pub summary: Summary,
    pub report: MergeReport,
}

impl Render {
    pub fn write_geojson(&self, key_field: &str, path: &Path) -> Result<()> {
        write_feature_collection(&self.features, key_field, path)
    }
}

/// Loaded sources plus the operations a map view runs over them.
///
/// Sources are shared and immutable; `render` builds everything else from
/// scratch, so one dashboard can serve concurrent renders.
#[derive(Clone, Debug)]
pub struct Dashboard {
    table: Arc<ScoreTable>,
    geometry: Option<Arc<GeometryLayer>>,
}

impl Dashboard {
    /// Dashboard whose geometry comes from the table's own geometry column.
    pub fn new(table: Arc<ScoreTable>) -> Self {
        Self { table, geometry: None }
    }

    pub fn with_geometry(mut self, layer: Arc<GeometryLayer>) -> Self {
        self.geometry = Some(layer);
        self
    }

    /// Load sources through `cache`.
    pub fn open(cache: &SourceCache, scores: &Path, geometry: Option<&Path>, schema: &TableSchema, key_field: &str) -> Result<Self> {
        let mut dashboard = Self::new(cache.score_table(scores, schema)?);
        if let Some(path) = geometry {
            dashboard = dashboard.with_geometry(cache.geometry_layer(path, key_field)?);
        }
        Ok(dashboard)
    }

    pub fn table(&self) -> &ScoreTable {
        &self.table
    }

    /// Recompute features, points and view for `config`.
    pub fn render(&self, config: &RenderConfig) -> Result<Render> {
        let merger = FeatureMerger::new(config)?;
        let records = self.table.records();

        let own;
        let geometry_features: &[GeometryFeature] = match &self.geometry {
            Some(layer) => &layer.features,
            None => { own = features_from_records(records); &own }
        };

        let output = merger.merge(records, geometry_features);
        let kept = merger.in_range(records);
        let flattened = merger.normalizer().flattens();

        let points = match (config.layers.scatter, merger.color_mapper(&kept)) {
            (true, Some(mapper)) => {
                let centroids: AHashMap<&str, (f64, f64)> = output.features.iter()
                    .filter_map(|f| Some((f.key.as_str(), f.geometry.centroid(flattened)?)))
                    .collect();
                KeyIndex::resolve(&kept, config.duplicates).records(&kept).into_iter()
                    .filter_map(|r| {
                        let (lon, lat) = r.position.or_else(|| centroids.get(r.key.as_str()).copied())?;
                        Some(ScatterPoint { key: r.key.clone(), lon, lat, color: mapper.map(r.score), score: r.score })
                    })
                    .collect()
            }
            _ => Vec::new(),
        };

        let view = self.table.mean_position()
            .or_else(|| mean(output.features.iter().filter_map(|f| f.geometry.centroid(flattened))))
            .map(|(lon, lat)| ViewState::centred(lon, lat));

        let summary = Summary {
            total: records.len(),
            displayed: kept.len(),
            rendered: output.features.len(),
            slider: self.table.slider_bounds(),
        };
        info!(
            rendered = summary.rendered,
            displayed = summary.displayed,
            total = summary.total,
            errors = output.report.errors.len(),
            "rendered map"
        );

        let features = if config.layers.polygons { output.features } else { Vec::new() };
        Ok(Render { features, points, view, summary, report: output.report })
    }

    /// Write the full table (with quartiles) or its top `n` rows to `path`.
    /// Returns the number of rows written.
    pub fn export_csv(&self, top: Option<usize>, schema: &TableSchema, path: &Path) -> Result<usize> {
        let rows: Vec<&ScoreRecord> = match top {
            Some(n) => self.table.top_n(n),
            None => self.table.records().iter().collect(),
        };
        let stats = self.table.stats();
        write_scores(&rows, stats.as_ref(), schema, path)?;
        info!(rows = rows.len(), path = %path.display(), "exported scores");
        Ok(rows.len())
    }
}

fn mean(points: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    let (n, x, y) = points.fold((0usize, 0.0, 0.0), |(n, x, y), (px, py)| (n + 1, x + px, y + py));
    (n > 0).then(|| (x / n as f64, y / n as f64))
}
