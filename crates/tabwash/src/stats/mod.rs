//! Statistics library.
//!
//! Central tendency, dispersion and distribution-shape measures over one
//! column's cells, plus the Jarque-Bera normality test. Functions take raw
//! cells and work on their numeric projection; see [`descriptive`] for the
//! per-function sample requirements.

pub mod descriptive;
pub mod normality;
pub mod sample;

pub use descriptive::*;
pub use normality::jarque_bera;

use crate::table::Cell;
use crate::types::{StatisticCategory, StatisticResult, StatisticValue};

/// Compute every statistic for one column, in report order.
///
/// Basic counts come first, then central tendency, dispersion and
/// distribution shape. Undefined values are reported as
/// [`StatisticValue::Null`].
pub fn calculate_descriptive_statistics(cells: &[Cell]) -> Vec<StatisticResult> {
    use StatisticCategory::{Basic, CentralTendency, Dispersion, DistributionShape};

    let number = StatisticValue::from_option;
    let normality = jarque_bera(cells);

    let mut results = vec![
        StatisticResult::new("Count", StatisticValue::Number(count(cells) as f64), Basic),
        StatisticResult::new("Minimum", number(min(cells)), Basic),
        StatisticResult::new("Maximum", number(max(cells)), Basic),
        StatisticResult::new("Sum", number(sum(cells)), Basic),
        StatisticResult::new("Mean", number(mean(cells)), CentralTendency),
        StatisticResult::new("Geometric Mean", number(geometric_mean(cells)), CentralTendency),
        StatisticResult::new("Harmonic Mean", number(harmonic_mean(cells)), CentralTendency),
        StatisticResult::new("Median", number(median(cells)), CentralTendency),
        StatisticResult::new("Mode", StatisticValue::List(mode(cells)), CentralTendency),
        StatisticResult::new("Variance", number(variance(cells)), Dispersion),
        StatisticResult::new("Standard Deviation", number(standard_deviation(cells)), Dispersion),
        StatisticResult::new("Range", number(range(cells)), Dispersion),
        StatisticResult::new("Interquartile Range", number(interquartile_range(cells)), Dispersion),
        StatisticResult::new(
            "Mean Absolute Deviation",
            number(mean_absolute_deviation(cells)),
            Dispersion,
        ),
        StatisticResult::new(
            "Coefficient of Variation",
            number(coefficient_of_variation(cells)),
            Dispersion,
        ),
        StatisticResult::new(
            "Coefficient of Dispersion",
            number(coefficient_of_dispersion(cells)),
            Dispersion,
        ),
        StatisticResult::new("Gini Coefficient", number(gini_coefficient(cells)), Dispersion),
        StatisticResult::new("Fisher Skewness", number(fisher_skewness(cells)), DistributionShape),
        StatisticResult::new("Pearson Skewness", number(pearson_skewness(cells)), DistributionShape),
        StatisticResult::new(
            "Quartile Skewness",
            number(quartile_skewness(cells)),
            DistributionShape,
        ),
        StatisticResult::new("Fisher Kurtosis", number(fisher_kurtosis(cells)), DistributionShape),
        StatisticResult::new("Pearson Kurtosis", number(pearson_kurtosis(cells)), DistributionShape),
    ];

    results.push(StatisticResult::new(
        "Jarque-Bera Statistic",
        number(normality.map(|t| t.statistic)),
        DistributionShape,
    ));
    results.push(StatisticResult::new(
        "Jarque-Bera p-value",
        number(normality.map(|t| t.p_value)),
        DistributionShape,
    ));
    results.push(StatisticResult::new(
        "Normality",
        normality.map_or(StatisticValue::Null, |t| {
            let verdict = if t.is_normal { "normal" } else { "not normal" };
            StatisticValue::Text(verdict.to_string())
        }),
        DistributionShape,
    ));

    results
}
