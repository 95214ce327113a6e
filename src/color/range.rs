use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Closed score interval `[min, max]` used both for filtering and for color normalization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    /// Build a range, rejecting non-finite bounds and `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(Error::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Smallest range covering every finite value, or `None` if there are none.
    pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Self>, v| match acc {
                None => Some(Self { min: v, max: v }),
                Some(r) => Some(Self { min: r.min.min(v), max: r.max.max(v) }),
            })
    }

    /// Widen to whole numbers: `[floor(min), ceil(max)]`.
    pub fn widened(self) -> Self {
        Self { min: self.min.floor(), max: self.max.ceil() }
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    /// Position of `score` within the range, `(score - min) / (max - min)`, unclamped.
    pub fn normalize(&self, score: f64) -> Result<f64> {
        if self.is_degenerate() { return Err(Error::DegenerateRange(self.min)) }
        Ok((score - self.min) / (self.max - self.min))
    }
}
