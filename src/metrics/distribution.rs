use std::time::Duration;

use super::types::{MeanMode, TimerDistribution, per_second};

const PERCENT_DIVISOR: usize = 100;
const PERCENTILE_P50: usize = 50;
const PERCENTILE_P75: usize = 75;
const PERCENTILE_P90: usize = 90;
const PERCENTILE_P95: usize = 95;

/// Reduce one window of timer samples to a [`TimerDistribution`].
///
/// Percentiles use nearest-rank-below selection, `samples[floor(n * p / 100)]`,
/// without interpolation. An empty window yields the all-zero distribution.
#[must_use]
pub fn summarize(
    mut samples: Vec<f64>,
    window: Duration,
    mean_mode: MeanMode,
) -> TimerDistribution {
    if samples.is_empty() {
        return TimerDistribution::default();
    }
    samples.sort_unstable_by(f64::total_cmp);

    let count = samples.len();
    let count_f64 = count as f64;

    TimerDistribution {
        count: u64::try_from(count).unwrap_or(u64::MAX),
        count_per_second: per_second(count_f64, window),
        mean: mean(&samples, mean_mode),
        min: samples.first().copied().unwrap_or_default(),
        max: samples.last().copied().unwrap_or_default(),
        p50: percentile(&samples, PERCENTILE_P50),
        p75: percentile(&samples, PERCENTILE_P75),
        p90: percentile(&samples, PERCENTILE_P90),
        p95: percentile(&samples, PERCENTILE_P95),
    }
}

/// `sorted` must be ascending and non-empty.
fn percentile(sorted: &[f64], percentile: usize) -> f64 {
    let last = sorted.len().saturating_sub(1);
    let index = sorted
        .len()
        .saturating_mul(percentile)
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0)
        .min(last);
    sorted.get(index).copied().unwrap_or_default()
}

fn mean(sorted: &[f64], mean_mode: MeanMode) -> f64 {
    let considered = match mean_mode {
        MeanMode::Arithmetic => sorted.len(),
        MeanMode::Trimmed { percent_threshold } => {
            trimmed_len(sorted.len(), usize::from(percent_threshold))
        }
    };
    let window = sorted.get(..considered).unwrap_or(sorted);
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

/// Number of lowest samples kept for the trimmed mean:
/// `n - floor((100 - threshold) * n / 100)`.
fn trimmed_len(len: usize, percent_threshold: usize) -> usize {
    let excluded_percent = PERCENT_DIVISOR.saturating_sub(percent_threshold.min(PERCENT_DIVISOR));
    let excluded = excluded_percent
        .saturating_mul(len)
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0);
    len.saturating_sub(excluded)
}
