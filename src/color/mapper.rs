use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, color::{Palette, Rgba, ScoreRange}};

/// Exponent applied to the normalized score in `ColorMode::Emphasized`.
pub const EMPHASIS_EXPONENT: f64 = 1.2;

/// Normalized value used when the range is degenerate.
const DEGENERATE_T: f64 = 0.5;

/// How a normalized score is shaped before palette lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    /// Linear in the normalized score.
    #[default]
    Standard,
    /// `t^1.2`: pushes high scores toward the palette's far end.
    Emphasized,
}

impl ColorMode {
    fn shape(self, t: f64) -> f64 {
        match self {
            ColorMode::Standard => t,
            ColorMode::Emphasized => t.powf(EMPHASIS_EXPONENT),
        }
    }
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ColorMode::Standard),
            "emphasized" | "emphasised" => Ok(ColorMode::Emphasized),
            other => Err(format!("unknown color mode {other:?}")),
        }
    }
}

/// Maps scores within a fixed range to colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMapper {
    pub range: ScoreRange,
    pub mode: ColorMode,
    pub palette: Palette,
}

impl ColorMapper {
    pub fn new(range: ScoreRange, mode: ColorMode, palette: Palette) -> Self {
        if range.is_degenerate() {
            debug!(min = range.min, "degenerate color range, every score maps to the palette midpoint");
        }
        Self { range, mode, palette }
    }

    /// Normalized, clamped and shaped palette position for `score`.
    /// Returns `None` for non-finite scores.
    pub fn position(&self, score: f64) -> Option<f64> {
        if !score.is_finite() { return None }
        let t = match self.range.normalize(score) {
            Ok(t) => t.clamp(0.0, 1.0),
            Err(Error::DegenerateRange(_)) => DEGENERATE_T,
            Err(_) => return None,
        };
        Some(self.mode.shape(t))
    }

    /// Color for one score. Non-finite scores get `Rgba::NEUTRAL`.
    pub fn map(&self, score: f64) -> Rgba {
        self.position(score)
            .map(|t| self.palette.sample(t))
            .unwrap_or(Rgba::NEUTRAL)
    }

    /// Elementwise `map` over a column of scores.
    pub fn map_all(&self, scores: &[f64]) -> Vec<Rgba> {
        scores.iter().map(|&s| self.map(s)).collect()
    }
}

/// One-shot color lookup: `score` placed in `[min, max]`, shaped by `mode`, sampled from `palette`.
///
/// `min > max` is treated like a degenerate range rather than an error.
pub fn map_score(score: f64, min: f64, max: f64, mode: ColorMode, palette: Palette) -> Rgba {
    let range = ScoreRange::new(min, max).unwrap_or(ScoreRange { min, max: min });
    ColorMapper::new(range, mode, palette).map(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: f64, max: f64) -> ScoreRange {
        ScoreRange::new(min, max).unwrap()
    }

    #[test]
    fn midpoint_on_red_green() {
        let c = map_score(10.0, 5.0, 15.0, ColorMode::Standard, Palette::LinearRedGreen);
        assert_eq!(c.to_array(), [127, 128, 0, 255]);
    }

    #[test]
    fn endpoints_match_palette_ends() {
        for palette in Palette::ALL {
            let m = ColorMapper::new(range(5.0, 15.0), ColorMode::Standard, palette);
            assert_eq!(m.map(5.0), palette.sample(0.0), "{palette}");
            assert_eq!(m.map(15.0), palette.sample(1.0), "{palette}");
        }
    }

    #[test]
    fn alpha_is_opaque_across_range() {
        for palette in Palette::ALL {
            for mode in [ColorMode::Standard, ColorMode::Emphasized] {
                let m = ColorMapper::new(range(-2.0, 3.0), mode, palette);
                for i in 0..=100 {
                    let s = -2.0 + 5.0 * i as f64 / 100.0;
                    assert_eq!(m.map(s).a, 255);
                }
            }
        }
    }

    #[test]
    fn emphasized_pushes_midpoint_down_the_ramp() {
        let linear = ColorMapper::new(range(0.0, 1.0), ColorMode::Standard, Palette::LinearRedGreen);
        let emp = ColorMapper::new(range(0.0, 1.0), ColorMode::Emphasized, Palette::LinearRedGreen);
        let t = emp.position(0.5).unwrap();
        assert!((t - 0.5f64.powf(1.2)).abs() < 1e-12);
        assert!(emp.map(0.5).r < linear.map(0.5).r);
        // Ends are fixed points of the power law.
        assert_eq!(emp.map(0.0), linear.map(0.0));
        assert_eq!(emp.map(1.0), linear.map(1.0));
    }

    #[test]
    fn degenerate_range_uses_midpoint() {
        let m = ColorMapper::new(range(7.0, 7.0), ColorMode::Standard, Palette::Viridis);
        assert_eq!(m.map(7.0), Palette::Viridis.sample(0.5));
        assert_eq!(map_score(3.0, 9.0, 1.0, ColorMode::Standard, Palette::LinearRedGreen), Rgba::opaque(127, 128, 0));
    }

    #[test]
    fn out_of_range_scores_clamp() {
        let m = ColorMapper::new(range(8.0, 12.0), ColorMode::Standard, Palette::LinearRedGreen);
        assert_eq!(m.map(2.0), Rgba::opaque(0, 255, 0));
        assert_eq!(m.map(40.0), Rgba::opaque(255, 0, 0));
    }

    #[test]
    fn non_finite_is_neutral() {
        let m = ColorMapper::new(range(0.0, 1.0), ColorMode::Standard, Palette::Plasma);
        assert_eq!(m.map(f64::NAN), Rgba::NEUTRAL);
        assert_eq!(m.map_all(&[0.0, f64::INFINITY]), vec![Palette::Plasma.sample(0.0), Rgba::NEUTRAL]);
    }

    #[test]
    fn parse_mode() {
        assert_eq!("Emphasized".parse::<ColorMode>().unwrap(), ColorMode::Emphasized);
        assert!("loud".parse::<ColorMode>().is_err());
    }
}
