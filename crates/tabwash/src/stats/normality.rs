//! Jarque-Bera normality test.

use super::descriptive::{moment_kurtosis, moment_skewness, numeric_values};
use crate::table::Cell;
use crate::types::NormalityTest;

/// Smallest sample the test is run on.
pub const MIN_JARQUE_BERA_SAMPLE: usize = 8;

/// Significance level below which normality is rejected.
pub const NORMALITY_ALPHA: f64 = 0.05;

/// Jarque-Bera test over the numeric projection.
///
/// The statistic is `n/6 · (S² + K²/4)` with moment skewness `S` and excess
/// kurtosis `K`. The p-value is the upper tail of a chi-square distribution
/// with two degrees of freedom, `e^(-x/2)`. Returns `None` below eight
/// values or for a constant sample.
pub fn jarque_bera(cells: &[Cell]) -> Option<NormalityTest> {
    let values = numeric_values(cells);
    if values.len() < MIN_JARQUE_BERA_SAMPLE {
        return None;
    }
    let skew = moment_skewness(&values)?;
    let kurt = moment_kurtosis(&values)?;
    let n = values.len() as f64;

    let statistic = n / 6.0 * (skew * skew + kurt * kurt / 4.0);
    let p_value = chi_square_df2_survival(statistic);

    Some(NormalityTest {
        statistic,
        p_value,
        is_normal: p_value >= NORMALITY_ALPHA,
    })
}

/// `1 - CDF` of chi-square(2), whose CDF is `1 - e^(-x/2)`.
fn chi_square_df2_survival(x: f64) -> f64 {
    (-x / 2.0).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[f64]) -> Vec<Cell> {
        values.iter().map(|v| Cell::Number(*v)).collect()
    }

    #[test]
    fn test_jarque_bera_pinned_values() {
        let result = jarque_bera(&cells(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])).unwrap();
        let expected_stat = 8.0 / 6.0 * (0.65625f64.powi(2) + 0.21875f64.powi(2) / 4.0);
        assert!((result.statistic - expected_stat).abs() < 1e-12);
        assert!((result.p_value - (-expected_stat / 2.0).exp()).abs() < 1e-12);
        assert!(result.is_normal);
    }

    #[test]
    fn test_jarque_bera_rejects_heavy_skew() {
        let mut values = vec![1.0; 30];
        values.extend([50.0, 60.0]);
        let result = jarque_bera(&cells(&values)).unwrap();
        assert!(result.p_value < NORMALITY_ALPHA);
        assert!(!result.is_normal);
    }

    #[test]
    fn test_jarque_bera_needs_eight_values() {
        assert!(jarque_bera(&cells(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])).is_none());
        assert!(jarque_bera(&cells(&[2.0; 10])).is_none());
    }

    #[test]
    fn test_survival_function_edges() {
        assert_eq!(chi_square_df2_survival(0.0), 1.0);
        assert!(chi_square_df2_survival(100.0) < 1e-20);
    }
}
