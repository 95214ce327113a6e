//! Render configuration: one snapshot per recomputation.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    color::{ColorMode, Palette, ScoreRange},
    geom::MultiPolygonPolicy,
    merge::DuplicatePolicy,
};

/// Which map layers a renderer should draw. Hidden layers are not computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerVisibility {
    /// Colored neighbourhood polygons.
    pub polygons: bool,
    /// One colored point per neighbourhood.
    pub scatter: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self { polygons: true, scatter: true }
    }
}

/// Everything the pipeline reads besides its input data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Score filter, also used as the color range. `None` keeps every record
    /// and colors over the data extent.
    pub range: Option<ScoreRange>,
    pub mode: ColorMode,
    pub palette: Palette,
    pub multipolygon: MultiPolygonPolicy,
    pub duplicates: DuplicatePolicy,
    pub layers: LayerVisibility,
}

impl RenderConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::from_open(e, path))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject ranges that bypassed `ScoreRange::new` (e.g. via deserialization).
    pub fn validate(&self) -> Result<()> {
        if let Some(r) = self.range { ScoreRange::new(r.min, r.max)?; }
        Ok(())
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Result<Self> {
        self.range = Some(ScoreRange::new(min, max)?);
        Ok(self)
    }

    pub fn with_mode(mut self, mode: ColorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_multipolygon(mut self, policy: MultiPolygonPolicy) -> Self {
        self.multipolygon = policy;
        self
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let c = RenderConfig::from_json_str(r#"{ "palette": "viridis", "range": { "min": 8, "max": 12 } }"#).unwrap();
        assert_eq!(c.palette, Palette::Viridis);
        assert_eq!(c.mode, ColorMode::Standard);
        assert_eq!(c.multipolygon, MultiPolygonPolicy::Preserve);
        assert_eq!(c.range, Some(ScoreRange { min: 8.0, max: 12.0 }));
        assert!(c.layers.polygons);
    }

    #[test]
    fn inverted_range_rejected() {
        let err = RenderConfig::from_json_str(r#"{ "range": { "min": 12, "max": 8 } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
        assert!(RenderConfig::default().with_range(3.0, 1.0).is_err());
    }

    #[test]
    fn json_round_trip() {
        let c = RenderConfig::default()
            .with_range(5.0, 15.0).unwrap()
            .with_mode(ColorMode::Emphasized)
            .with_palette(Palette::Magma)
            .with_duplicates(DuplicatePolicy::Reject);
        let text = serde_json::to_string(&c).unwrap();
        assert_eq!(RenderConfig::from_json_str(&text).unwrap(), c);
    }
}
