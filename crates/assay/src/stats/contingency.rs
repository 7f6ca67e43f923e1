//! Chi-square test of independence on a contingency table.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use super::StatsError;

/// Result of a chi-square independence test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareTest {
    #[serde(with = "crate::serde_ext::nan_sentinel")]
    pub chi2_statistic: f64,
    #[serde(with = "crate::serde_ext::nan_sentinel")]
    pub p_value: f64,
    pub degrees_of_freedom: usize,
}

/// Chi-square test on an `r x c` table of observed counts.
///
/// Applies Yates' continuity correction when there is exactly one degree of
/// freedom. A table with zero degrees of freedom yields a statistic of 0 and
/// a p-value of 1.
pub fn chi2_contingency(observed: &[Vec<f64>]) -> Result<ChiSquareTest, StatsError> {
    let rows = observed.len();
    let cols = observed.first().map(Vec::len).unwrap_or(0);
    if rows == 0 || cols == 0 {
        return Err(StatsError::EmptyTable);
    }

    let row_totals: Vec<f64> = observed.iter().map(|r| r.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..cols)
        .map(|j| observed.iter().map(|r| r.get(j).copied().unwrap_or(0.0)).sum())
        .collect();
    let total: f64 = row_totals.iter().sum();

    let mut expected = vec![vec![0.0; cols]; rows];
    for (i, row) in expected.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = row_totals[i] * col_totals[j] / total;
            if *cell == 0.0 || cell.is_nan() {
                return Err(StatsError::ZeroExpected { row: i, column: j });
            }
        }
    }

    let dof = (rows - 1) * (cols - 1);
    if dof == 0 {
        return Ok(ChiSquareTest {
            chi2_statistic: 0.0,
            p_value: 1.0,
            degrees_of_freedom: 0,
        });
    }

    let mut statistic = 0.0;
    for (obs_row, exp_row) in observed.iter().zip(&expected) {
        for (j, &e) in exp_row.iter().enumerate() {
            let mut o = obs_row.get(j).copied().unwrap_or(0.0);
            if dof == 1 {
                let diff = e - o;
                o += diff.signum() * diff.abs().min(0.5);
            }
            statistic += (o - e).powi(2) / e;
        }
    }

    let chi2 =
        ChiSquared::new(dof as f64).map_err(|e| StatsError::Distribution(e.to_string()))?;
    Ok(ChiSquareTest {
        chi2_statistic: statistic,
        p_value: chi2.sf(statistic),
        degrees_of_freedom: dof,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_table_is_independent() {
        let result = chi2_contingency(&[vec![10.0, 10.0], vec![10.0, 10.0]]).unwrap();
        assert_eq!(result.degrees_of_freedom, 1);
        assert_eq!(result.chi2_statistic, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic_table_with_yates() {
        let result = chi2_contingency(&[vec![10.0, 0.0], vec![0.0, 10.0]]).unwrap();
        // Observed cells move 0.5 toward expected (5.0) before summing
        assert!((result.chi2_statistic - 16.2).abs() < 1e-9);
        assert!(result.p_value < 0.001);
    }

    #[test]
    fn test_larger_table_without_correction() {
        let observed = vec![
            vec![10.0, 0.0, 0.0],
            vec![0.0, 10.0, 0.0],
            vec![0.0, 0.0, 10.0],
        ];
        let result = chi2_contingency(&observed).unwrap();
        assert_eq!(result.degrees_of_freedom, 4);
        assert!((result.chi2_statistic - 60.0).abs() < 1e-9);
        assert!(result.p_value < 1e-10);
    }

    #[test]
    fn test_single_column_has_zero_dof() {
        let result = chi2_contingency(&[vec![3.0], vec![5.0]]).unwrap();
        assert_eq!(result.degrees_of_freedom, 0);
        assert_eq!(result.chi2_statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_zero_expected_is_error() {
        let result = chi2_contingency(&[vec![0.0, 0.0], vec![3.0, 4.0]]);
        assert_eq!(result, Err(StatsError::ZeroExpected { row: 0, column: 0 }));
        assert_eq!(chi2_contingency(&[]), Err(StatsError::EmptyTable));
    }
}
