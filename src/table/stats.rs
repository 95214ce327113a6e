use serde::Serialize;

/// Summary statistics of a score column.
///
/// `std` is the sample standard deviation (n - 1 denominator, zero for a single
/// value). Quartiles use linear interpolation between closest ranks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoreStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl ScoreStats {
    /// Statistics over the finite values in `scores`, or `None` if there are none.
    pub fn from_scores(scores: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = scores.into_iter().filter(|s| s.is_finite()).collect();
        if sorted.is_empty() { return None }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            (sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            count: n,
            mean,
            std,
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[n - 1],
        })
    }

    /// Quartile bucket of `score`: 0 for the lowest quarter through 3 for the highest.
    pub fn quartile(&self, score: f64) -> u8 {
        if score <= self.q1 { 0 }
        else if score <= self.median { 1 }
        else if score <= self.q3 { 2 }
        else { 3 }
    }
}

/// Quantile `q` of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
