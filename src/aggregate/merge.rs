//! The grouped weighted-average reducer.
//!
//! Collapses a sequence of pre-aggregated buckets into one merged metric set
//! per group key, in a single left-to-right pass. Each bucket's averages are
//! folded in weighted by its trip count, so the result for a group equals
//! the trip-count-weighted mean over every bucket merged into it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use crate::filter::TripFilter;
use crate::record::{TripBucket, TripMetrics};

/// Groups `rows` by `key` and merges each group with the incremental
/// weighted mean of [`TripMetrics::merge`].
///
/// Rows rejected by `filter` are discarded before grouping. The first row
/// seen for a key seeds the group verbatim; every later row is folded in.
/// Empty input yields an empty map.
pub fn group_weighted<B, K, F>(rows: &[B], filter: &TripFilter, key: F) -> HashMap<K, TripMetrics>
where
    B: TripBucket,
    K: Eq + Hash,
    F: Fn(&B) -> K,
{
    let mut groups: HashMap<K, TripMetrics> = HashMap::new();

    for row in rows {
        if !filter.matches(row.attrs()) {
            continue;
        }

        match groups.entry(key(row)) {
            Entry::Occupied(mut entry) => entry.get_mut().merge(row.metrics()),
            Entry::Vacant(entry) => {
                entry.insert(*row.metrics());
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DayRow, TripAttrs};

    const EPS: f64 = 1e-9;

    fn row(day: &str, weather: &str, trips: u64, distance: f64, fare: f64) -> DayRow {
        DayRow {
            day: day.to_string(),
            attrs: TripAttrs {
                weather: weather.to_string(),
                season: "winter".to_string(),
                time: "day".to_string(),
                area: "manhattan".to_string(),
            },
            metrics: TripMetrics {
                avg_distance: distance,
                avg_fare_amount: fare,
                number_of_trips: trips,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let groups = group_weighted(&[] as &[DayRow], &TripFilter::any(), |r| r.day.clone());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_singleton_group_is_identity() {
        let rows = vec![row("Mon", "sunny", 7, 1.25, 9.5)];
        let groups = group_weighted(&rows, &TripFilter::any(), |r| r.day.clone());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups["Mon"], rows[0].metrics);
    }

    #[test]
    fn test_weighted_mean_example() {
        let rows = vec![row("Mon", "sunny", 10, 2.0, 0.0), row("Mon", "sunny", 30, 4.0, 0.0)];
        let groups = group_weighted(&rows, &TripFilter::any(), |r| r.day.clone());

        let mon = &groups["Mon"];
        assert_eq!(mon.number_of_trips, 40);
        assert!((mon.avg_distance - 3.5).abs() < EPS);
    }

    #[test]
    fn test_rows_with_equal_keys_merge_despite_differing_attrs() {
        let rows = vec![row("Mon", "sunny", 10, 2.0, 0.0), row("Mon", "rainy", 10, 4.0, 0.0)];
        let groups = group_weighted(&rows, &TripFilter::any(), |r| r.day.clone());

        assert_eq!(groups.len(), 1);
        assert!((groups["Mon"].avg_distance - 3.0).abs() < EPS);
    }

    #[test]
    fn test_filter_applies_before_grouping() {
        let rows = vec![row("Mon", "sunny", 10, 2.0, 0.0), row("Mon", "rainy", 30, 4.0, 0.0)];
        let filter = TripFilter {
            weather: "sunny".to_string(),
            ..TripFilter::any()
        };
        let groups = group_weighted(&rows, &filter, |r| r.day.clone());

        assert_eq!(groups["Mon"].number_of_trips, 10);
        assert!((groups["Mon"].avg_distance - 2.0).abs() < EPS);
    }

    #[test]
    fn test_all_zero_weight_keeps_first_rows_metrics() {
        let rows = vec![row("Mon", "sunny", 0, 5.0, 1.0), row("Mon", "sunny", 0, 99.0, 42.0)];
        let groups = group_weighted(&rows, &TripFilter::any(), |r| r.day.clone());

        let mon = &groups["Mon"];
        assert_eq!(mon.number_of_trips, 0);
        assert_eq!(mon.avg_distance, 5.0);
        assert_eq!(mon.avg_fare_amount, 1.0);
    }

    #[test]
    fn test_partition_then_pairwise_merge_matches_one_pass() {
        let rows = vec![
            row("Mon", "sunny", 10, 2.0, 8.0),
            row("Mon", "rainy", 30, 4.0, 12.0),
            row("Mon", "sunny", 5, 1.0, 6.0),
            row("Mon", "rainy", 15, 3.0, 10.0),
        ];

        let full = group_weighted(&rows, &TripFilter::any(), |r| r.day.clone());

        let left = group_weighted(&rows[..2], &TripFilter::any(), |r| r.day.clone());
        let right = group_weighted(&rows[2..], &TripFilter::any(), |r| r.day.clone());
        let mut merged = left["Mon"];
        merged.merge(&right["Mon"]);

        assert_eq!(merged.number_of_trips, full["Mon"].number_of_trips);
        assert!((merged.avg_distance - full["Mon"].avg_distance).abs() < EPS);
        assert!((merged.avg_fare_amount - full["Mon"].avg_fare_amount).abs() < EPS);
    }

    #[test]
    fn test_permuting_input_only_moves_result_by_rounding() {
        let rows = vec![
            row("Mon", "sunny", 10, 2.0, 8.0),
            row("Tue", "rainy", 3, 7.5, 20.0),
            row("Mon", "rainy", 30, 4.0, 12.0),
            row("Mon", "sunny", 5, 1.0, 6.0),
            row("Tue", "sunny", 8, 0.5, 5.0),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let forward = group_weighted(&rows, &TripFilter::any(), |r| r.day.clone());
        let backward = group_weighted(&reversed, &TripFilter::any(), |r| r.day.clone());

        let mut keys: Vec<_> = forward.keys().collect();
        keys.sort();
        let mut backward_keys: Vec<_> = backward.keys().collect();
        backward_keys.sort();
        assert_eq!(keys, backward_keys);

        for (key, metrics) in &forward {
            let other = &backward[key];
            assert_eq!(metrics.number_of_trips, other.number_of_trips);
            assert!((metrics.avg_distance - other.avg_distance).abs() < EPS);
            assert!((metrics.avg_fare_amount - other.avg_fare_amount).abs() < EPS);
        }
    }
}
