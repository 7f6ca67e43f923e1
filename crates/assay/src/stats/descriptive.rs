//! Moments, quantiles and related summary statistics.

use std::cmp::Ordering;

/// Ascending copy of the values.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Arithmetic mean; NaN for no values.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Quantile of already sorted values with linear interpolation at `(n - 1) q`.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = (n - 1) as f64 * q.clamp(0.0, 1.0);
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Median of unsorted values.
pub fn median(values: &[f64]) -> f64 {
    quantile(&sorted(values), 0.5)
}

/// Most frequent value; the smallest one when several tie.
pub fn mode(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == value {
            j += 1;
        }
        let run = j - i;
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        i = j;
    }
    best.map(|(value, _)| value)
}

/// Variance with `ddof` delta degrees of freedom; NaN when `n <= ddof`.
pub fn variance(values: &[f64], ddof: usize) -> f64 {
    let n = values.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - ddof) as f64
}

/// Standard deviation with `ddof` delta degrees of freedom.
pub fn std_dev(values: &[f64], ddof: usize) -> f64 {
    variance(values, ddof).sqrt()
}

/// `k`-th central moment (population normalization).
pub fn central_moment(values: &[f64], k: i32) -> f64 {
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(k)).sum::<f64>() / values.len() as f64
}

/// Adjusted Fisher-Pearson sample skewness.
///
/// NaN below three values, zero for constant data.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 3 {
        return f64::NAN;
    }
    let m2 = central_moment(values, 2);
    if m2 == 0.0 {
        return 0.0;
    }
    let m3 = central_moment(values, 3);
    (n * (n - 1.0)).sqrt() / (n - 2.0) * m3 / m2.powf(1.5)
}

/// Unbiased excess kurtosis.
///
/// NaN below four values, zero for constant data.
pub fn kurtosis(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 4 {
        return f64::NAN;
    }
    let m = mean(values);
    let a: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    if a == 0.0 {
        return 0.0;
    }
    let b: f64 = values.iter().map(|x| (x - m).powi(4)).sum();
    let denom = (n - 2.0) * (n - 3.0);
    n * (n + 1.0) * (n - 1.0) * b / (denom * a * a) - 3.0 * (n - 1.0).powi(2) / denom
}

/// Median of absolute deviations from `center`.
pub fn median_absolute_deviation(values: &[f64], center: f64) -> f64 {
    let deviations: Vec<f64> = values.iter().map(|x| (x - center).abs()).collect();
    median(&deviations)
}

/// Pearson correlation of paired values; NaN if either side is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mx = mean(xs);
    let my = mean(ys);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// Order by absolute value, descending, NaN last.
pub(crate) fn cmp_abs_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.abs().total_cmp(&a.abs()),
    }
}
