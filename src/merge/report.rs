use crate::{RecordError, color::ScoreRange};

/// Diagnostics from one merge.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Records excluded because their geometry could not be used, plus keys
    /// rejected under `DuplicatePolicy::Reject`.
    pub errors: Vec<RecordError>,
    /// Geometry feature keys with no in-range record, in feature order.
    pub unmatched_features: Vec<String>,
    /// In-range record keys with no geometry feature, sorted.
    pub unmatched_records: Vec<String>,
    /// Keys held by more than one in-range record.
    pub duplicate_keys: Vec<String>,
    /// Geometry features skipped because an earlier feature already used the record.
    pub duplicate_geometry: Vec<String>,
    /// Records outside the configured score range.
    pub filtered_out: usize,
    /// Range colors were computed over; `None` when nothing was in range.
    pub color_range: Option<ScoreRange>,
    pub degenerate_range: bool,
}

impl MergeReport {
    pub fn key_mismatches(&self) -> usize {
        self.unmatched_features.len() + self.unmatched_records.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.key_mismatches() == 0 && self.duplicate_keys.is_empty()
    }
}
