//! Multi-station aggregation

use crate::AggregatedMetric;
use chrono::{DateTime, Utc};
use normalizer::StationReading;
use thresholds::Category;
use tracing::debug;

/// Round to one decimal place, half away from zero
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Average the valid readings of one category across a station group
///
/// Returns `None` when no station reported a valid value: zero rainfall is
/// a real measurement, so absence is never reported as 0.
pub fn aggregate(
    category: Category,
    readings: &[StationReading],
    fetched_at: DateTime<Utc>,
) -> Option<AggregatedMetric> {
    let (sum, count) = readings
        .iter()
        .filter(|r| r.category == category)
        .filter_map(StationReading::valid_value)
        .filter(|v| *v >= 0.0)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        debug!("{}: no valid readings among {} stations", category, readings.len());
        return None;
    }

    let average = round_one_decimal(sum / count as f64);
    debug!("{}: average {} over {} stations", category, average, count);

    Some(AggregatedMetric {
        category,
        average,
        source_count: count,
        fetched_at,
    })
}

/// Value for a single-station category: the first valid reading
pub fn single_station_value(readings: &[StationReading], category: Category) -> Option<f64> {
    readings
        .iter()
        .filter(|r| r.category == category)
        .find_map(StationReading::valid_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalizer::{Measurement, ValidationError};
    use proptest::prelude::*;

    fn reading(id: &str, category: Category, value: Measurement) -> StationReading {
        StationReading {
            station_id: id.to_string(),
            station_name: id.to_string(),
            category,
            value,
            observed_at: None,
        }
    }

    fn rain(values: &[f64]) -> Vec<StationReading> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let m = if *v < 0.0 {
                    Measurement::Invalid(ValidationError::Sentinel(*v))
                } else {
                    Measurement::Valid(*v)
                };
                reading(&format!("S{}", i), Category::Rain1Hr, m)
            })
            .collect()
    }

    #[test]
    fn test_sentinel_excluded_from_sum_and_count() {
        let metric =
            aggregate(Category::Rain1Hr, &rain(&[10.0, 20.0, -998.0]), Utc::now()).unwrap();
        assert_eq!(metric.average, 15.0);
        assert_eq!(metric.source_count, 2);
    }

    #[test]
    fn test_no_valid_readings_is_no_data() {
        assert!(aggregate(Category::Rain1Hr, &rain(&[-998.0, -998.0]), Utc::now()).is_none());
        assert!(aggregate(Category::Rain1Hr, &[], Utc::now()).is_none());
    }

    #[test]
    fn test_all_zero_is_zero_not_no_data() {
        let metric = aggregate(Category::Rain1Hr, &rain(&[0.0, 0.0, 0.0]), Utc::now()).unwrap();
        assert_eq!(metric.average, 0.0);
        assert_eq!(metric.source_count, 3);
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        let metric = aggregate(Category::Rain1Hr, &rain(&[1.0, 2.0, 2.0]), Utc::now()).unwrap();
        assert_eq!(metric.average, 1.7);
        assert_eq!(round_one_decimal(0.25), 0.3);
        assert_eq!(round_one_decimal(-0.25), -0.3);
    }

    #[test]
    fn test_other_categories_ignored() {
        let mut readings = rain(&[10.0]);
        readings.push(reading("S9", Category::Rain24Hr, Measurement::Valid(200.0)));
        let metric = aggregate(Category::Rain1Hr, &readings, Utc::now()).unwrap();
        assert_eq!(metric.average, 10.0);
        assert_eq!(metric.source_count, 1);
    }

    #[test]
    fn test_single_station_value_skips_invalid() {
        let readings = vec![
            reading("A", Category::WindGust, Measurement::Invalid(ValidationError::Missing)),
            reading("B", Category::WindGust, Measurement::Valid(12.0)),
        ];
        assert_eq!(single_station_value(&readings, Category::WindGust), Some(12.0));
        assert_eq!(single_station_value(&readings, Category::WaterLevel), None);
    }

    proptest! {
        #[test]
        fn prop_average_matches_rounded_mean(
            valid in proptest::collection::vec(0.0f64..500.0, 1..8),
            sentinels in 0usize..4,
        ) {
            let mut values = valid.clone();
            values.extend(std::iter::repeat(-998.0).take(sentinels));
            let metric = aggregate(Category::Rain1Hr, &rain(&values), Utc::now()).unwrap();

            let expected = round_one_decimal(valid.iter().sum::<f64>() / valid.len() as f64);
            prop_assert_eq!(metric.source_count, valid.len());
            prop_assert_eq!(metric.average, expected);
        }
    }
}
