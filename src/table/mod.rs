//! The score table: one record per neighbourhood.

mod stats;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{RecordError, color::ScoreRange, geom::RawGeometry};

pub use stats::ScoreStats;

/// One row of the score table.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreRecord {
    pub key: String,
    pub score: f64,
    pub geometry: Option<RawGeometry>,
    /// `(longitude, latitude)` when the table carries point coordinates.
    pub position: Option<(f64, f64)>,
}

impl ScoreRecord {
    pub fn new(key: impl Into<String>, score: f64) -> Self {
        Self { key: key.into(), score, geometry: None, position: None }
    }

    pub fn with_wkt(mut self, wkt: impl Into<String>) -> Self {
        self.geometry = Some(RawGeometry::Wkt(wkt.into()));
        self
    }

    pub fn with_position(mut self, lon: f64, lat: f64) -> Self {
        self.position = Some((lon, lat));
        self
    }
}

/// Column names of a score table file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    pub key: String,
    pub score: String,
    pub geometry: String,
    pub longitude: String,
    pub latitude: String,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            key: "neighbourhood".into(),
            score: "weighted_score".into(),
            geometry: "the_geom".into(),
            longitude: "longitude".into(),
            latitude: "latitude".into(),
        }
    }
}

/// Loaded score table. Immutable once built.
#[derive(Debug, Default)]
pub struct ScoreTable {
    records: Vec<ScoreRecord>,
    /// Rows dropped while loading (missing key, missing or non-finite score).
    pub rejected: Vec<RecordError>,
}

impl ScoreTable {
    pub fn new(records: Vec<ScoreRecord>) -> Self {
        Self { records, rejected: Vec::new() }
    }

    pub fn with_rejected(mut self, rejected: Vec<RecordError>) -> Self {
        self.rejected = rejected;
        self
    }

    /// Table of bare `(key, score)` pairs.
    pub fn from_scores<K: Into<String>>(scores: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self::new(scores.into_iter().map(|(k, s)| ScoreRecord::new(k, s)).collect())
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.score)
    }

    /// `[min, max]` of all scores.
    pub fn extent(&self) -> Option<ScoreRange> {
        ScoreRange::extent(self.scores())
    }

    /// Extent widened to whole numbers, the bounds offered to a range slider.
    pub fn slider_bounds(&self) -> Option<ScoreRange> {
        self.extent().map(ScoreRange::widened)
    }

    /// Records whose score lies in `range`, in table order.
    pub fn filter<'a>(&'a self, range: &'a ScoreRange) -> impl Iterator<Item = &'a ScoreRecord> + 'a {
        self.records.iter().filter(move |r| range.contains(r.score))
    }

    /// The `n` highest-scoring records, descending; ties keep table order.
    pub fn top_n(&self, n: usize) -> Vec<&ScoreRecord> {
        let mut ranked: Vec<&ScoreRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(n);
        ranked
    }

    /// Keys that occur more than once, in order of first occurrence.
    pub fn duplicate_keys(&self) -> Vec<&str> {
        let mut counts: AHashMap<&str, usize> = AHashMap::with_capacity(self.records.len());
        for r in &self.records { *counts.entry(r.key.as_str()).or_default() += 1 }

        let mut seen = ahash::AHashSet::new();
        self.records.iter()
            .map(|r| r.key.as_str())
            .filter(|k| counts.get(k).copied().unwrap_or(0) > 1 && seen.insert(*k))
            .collect()
    }

    pub fn stats(&self) -> Option<ScoreStats> {
        ScoreStats::from_scores(self.scores())
    }

    /// Mean `(longitude, latitude)` over records with a position.
    pub fn mean_position(&self) -> Option<(f64, f64)> {
        let (n, lon, lat) = self.records.iter()
            .filter_map(|r| r.position)
            .fold((0usize, 0.0, 0.0), |(n, x, y), (lon, lat)| (n + 1, x + lon, y + lat));
        (n > 0).then(|| (lon / n as f64, lat / n as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ScoreTable {
        ScoreTable::from_scores([("A", 5.15), ("B", 10.0), ("C", 15.51), ("B", 12.0), ("D", 10.0)])
    }

    #[test]
    fn extent_and_slider() {
        let t = table();
        assert_eq!(t.extent().unwrap(), ScoreRange { min: 5.15, max: 15.51 });
        assert_eq!(t.slider_bounds().unwrap(), ScoreRange { min: 5.0, max: 16.0 });
        assert!(ScoreTable::default().extent().is_none());
    }

    #[test]
    fn filter_is_inclusive() {
        let t = table();
        let range = ScoreRange::new(10.0, 12.0).unwrap();
        let keys: Vec<&str> = t.filter(&range).map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["B", "B", "D"]);
    }

    #[test]
    fn top_n_is_stable() {
        let t = table();
        let keys: Vec<&str> = t.top_n(4).iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["C", "B", "B", "D"]);
        assert_eq!(t.top_n(100).len(), 5);
    }

    #[test]
    fn duplicates_reported_once() {
        assert_eq!(table().duplicate_keys(), ["B"]);
    }

    #[test]
    fn mean_position_ignores_missing() {
        let t = ScoreTable::new(vec![
            ScoreRecord::new("A", 1.0).with_position(-113.5, 53.5),
            ScoreRecord::new("B", 2.0),
            ScoreRecord::new("C", 3.0).with_position(-113.3, 53.7),
        ]);
        let (lon, lat) = t.mean_position().unwrap();
        assert!((lon + 113.4).abs() < 1e-9 && (lat - 53.6).abs() < 1e-9);
    }
}
