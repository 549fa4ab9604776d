//! Summary statistics over numeric samples: mean, median, interpolated
//! 90th percentile, and zero-safe ratios. Empty input always yields zeros —
//! no KPI aggregation ever divides by zero or panics.

use serde::{Deserialize, Serialize};

/// Mean / median / p90 of a sample, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    pub median: f64,
    pub p90: f64,
}

impl Summary {
    pub const ZERO: Summary = Summary { mean: 0.0, median: 0.0, p90: 0.0 };
}

/// Aggregates a sample into `(mean, median, p90)`, each rounded to
/// 2 decimals. Returns all zeros for an empty sample.
pub fn summarize(samples: &[f64]) -> Summary {
    if samples.is_empty() {
        return Summary::ZERO;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

    Summary {
        mean: round_to(mean, 2),
        median: round_to(median_of_sorted(&sorted), 2),
        p90: round_to(p90_of_sorted(&sorted), 2),
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Linear-interpolated-rank percentile: rank k = 0.9 * (n - 1); integral k
/// selects directly, fractional k interpolates between the floor and ceil
/// neighbours proportionally to the fractional part.
fn p90_of_sorted(sorted: &[f64]) -> f64 {
    let k = 0.9 * (sorted.len() - 1) as f64;
    let floor = k.floor() as usize;
    let ceil = k.ceil() as usize;
    if floor == ceil {
        return sorted[floor];
    }
    sorted[floor] + (k - floor as f64) * (sorted[ceil] - sorted[floor])
}

/// Returns 0.0 when the denominator is 0, else the ratio rounded to
/// `precision` decimals.
pub fn safe_ratio(numerator: f64, denominator: f64, precision: u32) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    round_to(numerator / denominator, precision)
}

pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}
