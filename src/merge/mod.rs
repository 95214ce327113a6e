//! Joining scored records onto geometry features.

mod report;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    Error, RecordError, Result,
    color::{ColorMapper, ColorMode, Palette, Rgba, ScoreRange},
    config::RenderConfig,
    geom::{Geometry, GeometryNormalizer, RawGeometry},
    table::ScoreRecord,
};

pub use report::MergeReport;

/// A keyed geometry from a geometry source, not yet parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryFeature {
    pub key: String,
    pub geometry: RawGeometry,
}

/// One renderable map entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub key: String,
    pub geometry: Geometry,
    pub color: Rgba,
    pub score: f64,
}

/// How to resolve records that share a key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The first record in table order is used.
    #[default]
    FirstWins,
    /// The last record in table order is used.
    LastWins,
    /// The key is excluded and reported as an error.
    Reject,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first-wins" => Ok(Self::FirstWins),
            "last" | "last-wins" => Ok(Self::LastWins),
            "reject" | "error" => Ok(Self::Reject),
            other => Err(format!("unknown duplicate policy {other:?}")),
        }
    }
}

/// Features plus what happened to everything that did not become one.
#[derive(Debug, Default)]
pub struct MergeOutput {
    pub features: Vec<Feature>,
    pub report: MergeReport,
}

/// Joins records onto geometry features under one `RenderConfig`.
#[derive(Clone, Copy, Debug)]
pub struct FeatureMerger {
    range: Option<ScoreRange>,
    mode: ColorMode,
    palette: Palette,
    normalizer: GeometryNormalizer,
    duplicates: DuplicatePolicy,
}

impl FeatureMerger {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            range: config.range,
            mode: config.mode,
            palette: config.palette,
            normalizer: GeometryNormalizer::new(config.multipolygon),
            duplicates: config.duplicates,
        })
    }

    pub fn normalizer(&self) -> GeometryNormalizer {
        self.normalizer
    }

    /// Color mapper for `records`: the configured range, else the records' extent.
    pub fn color_mapper(&self, records: &[&ScoreRecord]) -> Option<ColorMapper> {
        let range = self.range.or_else(|| ScoreRange::extent(records.iter().map(|r| r.score)))?;
        Some(ColorMapper::new(range, self.mode, self.palette))
    }

    /// Records kept by the score filter, in table order.
    pub fn in_range<'a>(&self, records: &'a [ScoreRecord]) -> Vec<&'a ScoreRecord> {
        match &self.range {
            Some(range) => records.iter().filter(|r| range.contains(r.score)).collect(),
            None => records.iter().collect(),
        }
    }

    /// Join `records` onto `geometry_features`.
    ///
    /// Output follows geometry feature order. A geometry feature with no
    /// in-range record is skipped, as is a record with no geometry feature;
    /// both are listed in the report. A record that fails geometry parsing is
    /// excluded and its error collected.
    pub fn merge(&self, records: &[ScoreRecord], geometry_features: &[GeometryFeature]) -> MergeOutput {
        let mut report = MergeReport::default();

        let kept = self.in_range(records);
        report.filtered_out = records.len() - kept.len();

        let Some(mapper) = self.color_mapper(&kept) else {
            report.unmatched_features = geometry_features.iter().map(|f| f.key.clone()).collect();
            return MergeOutput { features: Vec::new(), report };
        };
        report.color_range = Some(mapper.range);
        report.degenerate_range = mapper.range.is_degenerate();

        let index = self.index(&kept, &mut report);

        let mut features = Vec::with_capacity(geometry_features.len().min(kept.len()));
        let mut used: AHashSet<&str> = AHashSet::with_capacity(index.len());
        for gf in geometry_features {
            let Some(&i) = index.get(gf.key.as_str()) else {
                // Rejected duplicates are already reported as errors.
                if !report.errors.iter().any(|e| e.key == gf.key) {
                    report.unmatched_features.push(gf.key.clone());
                }
                continue;
            };
            let record = kept[i];
            if !used.insert(record.key.as_str()) {
                report.duplicate_geometry.push(gf.key.clone());
                continue;
            }

            // A geometry carried on the record itself takes precedence.
            let raw = record.geometry.as_ref().unwrap_or(&gf.geometry);
            match self.normalizer.normalize(raw) {
                Ok(geometry) => features.push(Feature {
                    key: record.key.clone(),
                    geometry,
                    color: mapper.map(record.score),
                    score: record.score,
                }),
                Err(error) => {
                    warn!(key = %record.key, %error, "skipping record with unusable geometry");
                    report.errors.push(RecordError::new(&record.key, error));
                }
            }
        }

        report.unmatched_records = index.keys()
            .filter(|k| !used.contains(*k) && !report.errors.iter().any(|e| e.key == **k))
            .map(|k| k.to_string())
            .collect();
        report.unmatched_records.sort();

        debug!(
            features = features.len(),
            errors = report.errors.len(),
            key_mismatches = report.key_mismatches(),
            filtered_out = report.filtered_out,
            "merged features"
        );
        MergeOutput { features, report }
    }

    /// Key -> position in `kept`, resolving duplicates by policy.
    fn index<'a>(&self, kept: &[&'a ScoreRecord], report: &mut MergeReport) -> AHashMap<&'a str, usize> {
        let keys = KeyIndex::resolve(kept, self.duplicates);
        if !keys.duplicates.is_empty() {
            warn!(count = keys.duplicates.len(), policy = ?self.duplicates, "duplicate keys in score table");
        }
        if self.duplicates == DuplicatePolicy::Reject {
            for key in &keys.duplicates {
                report.errors.push(RecordError::new(*key, Error::DuplicateKey { key: key.to_string() }));
            }
        }
        report.duplicate_keys = keys.duplicates.iter().map(|k| k.to_string()).collect();
        keys.chosen
    }
}

/// The record chosen for each key under a `DuplicatePolicy`.
#[derive(Clone, Debug, Default)]
pub struct KeyIndex<'a> {
    /// Key -> position of the chosen record. Keys rejected under
    /// `DuplicatePolicy::Reject` are absent.
    pub chosen: AHashMap<&'a str, usize>,
    /// Keys held by more than one record, in order of first occurrence.
    pub duplicates: Vec<&'a str>,
}

impl<'a> KeyIndex<'a> {
    pub fn resolve(records: &[&'a ScoreRecord], policy: DuplicatePolicy) -> Self {
        let mut chosen: AHashMap<&'a str, usize> = AHashMap::with_capacity(records.len());
        let mut duplicates: Vec<&'a str> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let key = record.key.as_str();
            if !chosen.contains_key(key) {
                chosen.insert(key, i);
                continue;
            }
            if !duplicates.contains(&key) { duplicates.push(key) }
            if policy == DuplicatePolicy::LastWins { chosen.insert(key, i); }
        }
        if policy == DuplicatePolicy::Reject {
            for key in &duplicates { chosen.remove(key); }
        }
        Self { chosen, duplicates }
    }

    /// Chosen records, in the order of `records` (the slice passed to `resolve`).
    pub fn records(&self, records: &[&'a ScoreRecord]) -> Vec<&'a ScoreRecord> {
        records.iter().enumerate()
            .filter(|(i, r)| self.chosen.get(r.key.as_str()) == Some(i))
            .map(|(_, r)| *r)
            .collect()
    }

    pub fn is_duplicate(&self, key: &str) -> bool {
        self.duplicates.contains(&key)
    }
}

/// Join `records` onto `geometry_features` under `config`.
pub fn merge(records: &[ScoreRecord], geometry_features: &[GeometryFeature], config: &RenderConfig) -> Result<MergeOutput> {
    Ok(FeatureMerger::new(config)?.merge(records, geometry_features))
}

/// Geometry features taken from the records' own geometry column.
pub fn features_from_records(records: &[ScoreRecord]) -> Vec<GeometryFeature> {
    records.iter()
        .filter_map(|r| Some(GeometryFeature { key: r.key.clone(), geometry: r.geometry.clone()? }))
        .collect()
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use super::*;
    use crate::geom::{MultiPolygonPolicy, Polygon};

    fn square(key: &str, x: f64) -> GeometryFeature {
        let ring = line_string![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0), (x: x, y: 0.0)];
        GeometryFeature { key: key.into(), geometry: RawGeometry::Structured(Geometry::Polygon(Polygon::new(vec![ring]))) }
    }

    fn records(pairs: &[(&str, f64)]) -> Vec<ScoreRecord> {
        pairs.iter().map(|&(k, s)| ScoreRecord::new(k, s)).collect()
    }

    fn keys(out: &MergeOutput) -> Vec<&str> {
        out.features.iter().map(|f| f.key.as_str()).collect()
    }

    #[test]
    fn joins_only_matching_keys() {
        let recs = records(&[("A", 5.0), ("B", 10.0), ("C", 15.0)]);
        let geoms = [square("A", 0.0), square("B", 1.0), square("D", 2.0)];
        let out = merge(&recs, &geoms, &RenderConfig::default()).unwrap();

        assert_eq!(keys(&out), ["A", "B"]);
        assert!(out.report.errors.is_empty());
        assert_eq!(out.report.unmatched_features, ["D"]);
        assert_eq!(out.report.unmatched_records, ["C"]);
        assert_eq!(out.report.key_mismatches(), 2);
        // Colored over the data extent [5, 15].
        assert_eq!(out.features[0].color, Rgba::opaque(0, 255, 0));
        assert_eq!(out.features[1].color, Rgba::opaque(127, 128, 0));
    }

    #[test]
    fn filter_range_excludes_and_recolors() {
        let recs = records(&[("A", 5.0), ("B", 8.0), ("C", 10.0), ("D", 12.0), ("E", 15.0)]);
        let geoms: Vec<_> = ["A", "B", "C", "D", "E"].iter().enumerate().map(|(i, k)| square(k, i as f64)).collect();
        let config = RenderConfig::default().with_range(8.0, 12.0).unwrap();
        let out = merge(&recs, &geoms, &config).unwrap();

        assert_eq!(keys(&out), ["B", "C", "D"]);
        assert!(out.features.iter().all(|f| (8.0..=12.0).contains(&f.score)));
        assert_eq!(out.report.filtered_out, 2);
        assert_eq!(out.report.color_range, Some(ScoreRange { min: 8.0, max: 12.0 }));
        assert_eq!(out.features[0].color, Rgba::opaque(0, 255, 0));
        assert_eq!(out.features[1].color, Rgba::opaque(127, 128, 0));
        assert_eq!(out.features[2].color, Rgba::opaque(255, 0, 0));
    }

    #[test]
    fn duplicate_policies() {
        let recs = records(&[("A", 5.0), ("A", 15.0), ("B", 10.0)]);
        let geoms = [square("A", 0.0), square("B", 1.0)];

        let first = merge(&recs, &geoms, &RenderConfig::default()).unwrap();
        assert_eq!(first.features[0].score, 5.0);
        assert_eq!(first.report.duplicate_keys, ["A"]);

        let last = merge(&recs, &geoms, &RenderConfig::default().with_duplicates(DuplicatePolicy::LastWins)).unwrap();
        assert_eq!(last.features[0].score, 15.0);

        let reject = merge(&recs, &geoms, &RenderConfig::default().with_duplicates(DuplicatePolicy::Reject)).unwrap();
        assert_eq!(keys(&reject), ["B"]);
        assert!(matches!(reject.report.errors[0].error, Error::DuplicateKey { .. }));
        assert!(reject.report.unmatched_features.is_empty());
        assert_eq!(reject.report.key_mismatches(), 0);
    }

    #[test]
    fn key_index_orders_chosen_records() {
        let recs = records(&[("A", 1.0), ("B", 2.0), ("A", 3.0), ("C", 4.0), ("B", 5.0)]);
        let refs: Vec<&ScoreRecord> = recs.iter().collect();
        let scores = |p| {
            let keys = KeyIndex::resolve(&refs, p);
            keys.records(&refs).iter().map(|r| r.score).collect::<Vec<_>>()
        };
        assert_eq!(scores(DuplicatePolicy::FirstWins), [1.0, 2.0, 4.0]);
        assert_eq!(scores(DuplicatePolicy::LastWins), [3.0, 4.0, 5.0]);
        assert_eq!(scores(DuplicatePolicy::Reject), [4.0]);

        let keys = KeyIndex::resolve(&refs, DuplicatePolicy::Reject);
        assert_eq!(keys.duplicates, ["A", "B"]);
        assert!(keys.is_duplicate("B") && !keys.is_duplicate("C"));
    }

    #[test]
    fn bad_geometry_is_skipped_not_fatal() {
        let mut recs = records(&[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        recs[1].geometry = Some(RawGeometry::Wkt("POLYGON ((broken".into()));
        recs[2].geometry = Some(RawGeometry::Wkt("POINT (0 0)".into()));
        let geoms = [square("A", 0.0), square("B", 1.0), square("C", 2.0)];
        let out = merge(&recs, &geoms, &RenderConfig::default()).unwrap();

        assert_eq!(keys(&out), ["A"]);
        assert_eq!(out.report.errors.len(), 2);
        assert!(matches!(out.report.errors[0].error, Error::Parse(_)));
        assert!(matches!(out.report.errors[1].error, Error::InvalidGeometry(_)));
        assert!(out.report.unmatched_records.is_empty());
    }

    #[test]
    fn record_geometry_wins_and_policy_applies() {
        let mut recs = records(&[("A", 1.0)]);
        recs[0].geometry = Some(RawGeometry::Wkt("MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((3 3, 4 3, 4 4, 3 3)))".into()));
        let geoms = [square("A", 9.0)];

        let preserved = merge(&recs, &geoms, &RenderConfig::default()).unwrap();
        assert!(matches!(preserved.features[0].geometry, Geometry::MultiPolygon(ref p) if p.len() == 2));

        let config = RenderConfig::default().with_multipolygon(MultiPolygonPolicy::FlattenOuterRings);
        let flattened = merge(&recs, &geoms, &config).unwrap();
        assert!(matches!(flattened.features[0].geometry, Geometry::Polygon(ref p) if p.num_rings() == 2));
    }

    #[test]
    fn keys_are_case_sensitive_and_geometry_used_once() {
        let recs = records(&[("Abbottsfield", 1.0), ("Other", 2.0)]);
        let geoms = [square("abbottsfield", 0.0), square("Other", 1.0), square("Other", 2.0)];
        let out = merge(&recs, &geoms, &RenderConfig::default()).unwrap();
        assert_eq!(keys(&out), ["Other"]);
        assert_eq!(out.report.unmatched_features, ["abbottsfield"]);
        assert_eq!(out.report.duplicate_geometry, ["Other"]);
    }

    #[test]
    fn emphasized_palette_flows_through() {
        let recs = records(&[("A", 0.0), ("B", 1.0)]);
        let geoms = [square("A", 0.0), square("B", 1.0)];
        let config = RenderConfig::default().with_mode(ColorMode::Emphasized).with_palette(Palette::Viridis);
        let out = merge(&recs, &geoms, &config).unwrap();
        assert_eq!(out.features[0].color, Palette::Viridis.sample(0.0));
        assert_eq!(out.features[1].color, Palette::Viridis.sample(1.0));
    }

    #[test]
    fn single_score_degenerates_to_midpoint() {
        let recs = records(&[("A", 4.2)]);
        let out = merge(&recs, &[square("A", 0.0)], &RenderConfig::default()).unwrap();
        assert!(out.report.degenerate_range);
        assert_eq!(out.features[0].color, Rgba::opaque(127, 128, 0));
    }

    #[test]
    fn empty_inputs() {
        let out = merge(&[], &[square("A", 0.0)], &RenderConfig::default()).unwrap();
        assert!(out.features.is_empty());
        assert_eq!(out.report.unmatched_features, ["A"]);
    }

    #[test]
    fn records_become_geometry_source() {
        let mut recs = records(&[("A", 1.0), ("B", 2.0)]);
        recs[0].geometry = Some(RawGeometry::Wkt("POLYGON ((0 0, 1 0, 1 1, 0 0))".into()));
        let geoms = features_from_records(&recs);
        assert_eq!(geoms.len(), 1);
        let out = merge(&recs, &geoms, &RenderConfig::default()).unwrap();
        assert_eq!(keys(&out), ["A"]);
        assert_eq!(out.report.unmatched_records, ["B"]);
    }
}
