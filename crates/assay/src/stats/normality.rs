//! Normality tests: Shapiro-Wilk (Royston) and D'Agostino-Pearson K².

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use super::descriptive::{central_moment, sorted};
use super::StatsError;

/// Statistic and p-value of a normality test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalityTest {
    #[serde(with = "crate::serde_ext::nan_sentinel")]
    pub statistic: f64,
    #[serde(with = "crate::serde_ext::nan_sentinel")]
    pub p_value: f64,
}

// =============================================================================
// SHAPIRO-WILK
// =============================================================================
// Royston's (1995) approximation for the coefficients and the p-value.

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Polynomial with ascending coefficients.
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn standard_normal() -> Result<Normal, StatsError> {
    Normal::new(0.0, 1.0).map_err(|e| StatsError::Distribution(e.to_string()))
}

/// Shapiro-Wilk W test for normality.
///
/// Requires at least three observations that are not all equal. Constant
/// input is rejected with [`StatsError::ZeroRange`]; scipy instead warns and
/// returns W = 1, p = 1. Callers record the error, and a constant column
/// gets no skew or normality recommendation either way.
pub fn shapiro_wilk(values: &[f64]) -> Result<NormalityTest, StatsError> {
    let n = values.len();
    if n < 3 {
        return Err(StatsError::TooFewObservations { needed: 3, got: n });
    }

    let x = sorted(values);
    let range = x[n - 1] - x[0];
    if range == 0.0 {
        return Err(StatsError::ZeroRange);
    }

    let half = upper_half_coefficients(n)?;

    // Antisymmetric weights over the sorted sample.
    let mut weights = vec![0.0; n];
    for (i, a) in half.iter().enumerate() {
        weights[i] = -a;
        weights[n - 1 - i] = *a;
    }

    let scaled: Vec<f64> = x.iter().map(|v| v / range).collect();
    let mean_w = weights.iter().sum::<f64>() / n as f64;
    let mean_x = scaled.iter().sum::<f64>() / n as f64;
    let (mut ssa, mut ssx, mut sax) = (0.0, 0.0, 0.0);
    for (w, v) in weights.iter().zip(&scaled) {
        let dw = w - mean_w;
        let dx = v - mean_x;
        ssa += dw * dw;
        ssx += dx * dx;
        sax += dw * dx;
    }
    let root = (ssa * ssx).sqrt();
    let w1 = ((root - sax) * (root + sax) / (ssa * ssx)).max(0.0);
    let w = 1.0 - w1;

    let p_value = shapiro_p_value(n, w, w1)?;
    Ok(NormalityTest {
        statistic: w,
        p_value,
    })
}

/// Coefficients `a_1..a_{n/2}` for the largest order statistics.
fn upper_half_coefficients(n: usize) -> Result<Vec<f64>, StatsError> {
    if n == 3 {
        return Ok(vec![std::f64::consts::FRAC_1_SQRT_2]);
    }

    let normal = standard_normal()?;
    let an = n as f64;
    let half = n / 2;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();

    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    let mut a = vec![0.0; half];
    a[0] = a1;

    let (first_tail, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
        .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
        (1, fac)
    };

    for i in first_tail..half {
        a[i] = -m[i] / fac;
    }
    Ok(a)
}

fn shapiro_p_value(n: usize, w: f64, w1: f64) -> Result<f64, StatsError> {
    if n == 3 {
        let pi6 = 6.0 / std::f64::consts::PI;
        let stqr = std::f64::consts::FRAC_PI_3;
        let p = pi6 * (w.min(1.0).sqrt().asin() - stqr);
        return Ok(p.clamp(0.0, 1.0));
    }

    let an = n as f64;
    let mut y = w1.ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return Ok(1e-99);
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };

    Ok(standard_normal()?.sf((y - m) / s))
}

// =============================================================================
// D'AGOSTINO-PEARSON
// =============================================================================

fn skew_z(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let b2 = central_moment(values, 3) / central_moment(values, 2).powf(1.5);
    let mut y = b2 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    if y == 0.0 {
        y = 1.0;
    }
    let ya = y / alpha;
    delta * (ya + (ya * ya + 1.0).sqrt()).ln()
}

fn kurtosis_z(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let b2 = central_moment(values, 4) / central_moment(values, 2).powi(2);
    let expected = 3.0 * (n - 1.0) / (n + 1.0);
    let var = 24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0).powi(2) * (n + 3.0) * (n + 5.0));
    let x = (b2 - expected) / var.sqrt();
    let sqrtbeta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrtbeta1 * (2.0 / sqrtbeta1 + (1.0 + 4.0 / (sqrtbeta1 * sqrtbeta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    let term2 = if denom == 0.0 {
        f64::NAN
    } else {
        denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt()
    };
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

/// D'Agostino-Pearson omnibus K² test combining skewness and kurtosis.
///
/// Requires at least eight observations.
pub fn dagostino_pearson(values: &[f64]) -> Result<NormalityTest, StatsError> {
    let n = values.len();
    if n < 8 {
        return Err(StatsError::TooFewObservations { needed: 8, got: n });
    }
    if central_moment(values, 2) == 0.0 {
        return Err(StatsError::ZeroRange);
    }

    let zs = skew_z(values);
    let zk = kurtosis_z(values);
    let k2 = zs * zs + zk * zk;

    let chi2 = ChiSquared::new(2.0).map_err(|e| StatsError::Distribution(e.to_string()))?;
    Ok(NormalityTest {
        statistic: k2,
        p_value: chi2.sf(k2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expected normal order statistics, a textbook normal sample.
    fn normal_scores(n: usize) -> Vec<f64> {
        let normal = Normal::new(0.0, 1.0).unwrap();
        (1..=n)
            .map(|i| normal.inverse_cdf((i as f64 - 0.5) / n as f64))
            .collect()
    }

    fn exponential_like(n: usize) -> Vec<f64> {
        (1..=n).map(|i| (1.25f64).powi(i as i32)).collect()
    }

    #[test]
    fn test_poly_ascending() {
        assert_eq!(poly(&[1.0, 2.0, 3.0], 2.0), 17.0);
    }

    #[test]
    fn test_shapiro_three_equally_spaced() {
        let result = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-9);
        assert!((result.p_value - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shapiro_normal_sample_not_rejected() {
        for n in [5, 10, 30, 200] {
            let result = shapiro_wilk(&normal_scores(n)).unwrap();
            assert!(result.statistic > 0.9 && result.statistic <= 1.0, "n={n}");
            assert!(result.p_value > 0.05, "n={n} p={}", result.p_value);
        }
    }

    #[test]
    fn test_shapiro_skewed_sample_rejected() {
        let result = shapiro_wilk(&exponential_like(40)).unwrap();
        assert!(result.statistic < 0.9);
        assert!(result.p_value < 0.05);
    }

    #[test]
    fn test_shapiro_errors() {
        assert_eq!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(StatsError::TooFewObservations { needed: 3, got: 2 })
        );
        assert_eq!(shapiro_wilk(&[3.0; 10]), Err(StatsError::ZeroRange));
        assert_eq!(shapiro_wilk(&[-2.5; 3]), Err(StatsError::ZeroRange));
    }

    #[test]
    fn test_shapiro_is_order_independent() {
        let mut v = normal_scores(25);
        let forward = shapiro_wilk(&v).unwrap();
        v.reverse();
        let backward = shapiro_wilk(&v).unwrap();
        assert!((forward.statistic - backward.statistic).abs() < 1e-12);
    }

    #[test]
    fn test_dagostino_normal_vs_skewed() {
        let normal = dagostino_pearson(&normal_scores(100)).unwrap();
        assert!(normal.statistic >= 0.0);
        assert!(normal.p_value > 0.05);

        let skewed = dagostino_pearson(&exponential_like(60)).unwrap();
        assert!(skewed.p_value < 0.05);
    }

    #[test]
    fn test_dagostino_requires_eight() {
        assert!(matches!(
            dagostino_pearson(&[1.0, 2.0, 3.0]),
            Err(StatsError::TooFewObservations { needed: 8, .. })
        ));
    }
}
