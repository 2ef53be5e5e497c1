//! Data model for pre-aggregated taxi-trip buckets.
//!
//! Each input row is a bucket: averaged statistics over some number of real
//! trips sharing the same categorical attributes and group key. The trip
//! count is the bucket's weight when buckets are merged.

use serde::{Deserialize, Serialize};

/// Categorical attributes of a bucket, used by the filter predicate.
///
/// Stored as plain strings: the dataset may carry categories outside the
/// documented option lists, and filters still have to match against them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripAttrs {
    pub weather: String,
    pub season: String,
    pub time: String,
    pub area: String,
}

/// The numeric metrics of a bucket: five trip-count-weighted averages plus
/// the trip count itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripMetrics {
    pub avg_duration: f64,
    pub avg_distance: f64,
    pub avg_fare_amount: f64,
    pub avg_tip_amount: f64,
    pub avg_total_amount: f64,
    pub number_of_trips: u64,
}

impl TripMetrics {
    /// Folds `other` into `self` as an incremental weighted mean.
    ///
    /// Every averaged field becomes
    /// `(self.k * self.trips + other.k * other.trips) / (self.trips + other.trips)`
    /// and the trip counts are summed. When the combined trip count is zero
    /// the averaged fields are left untouched (division-by-zero guard); the
    /// trip count is still accumulated.
    pub fn merge(&mut self, other: &TripMetrics) {
        let prior = self.number_of_trips as f64;
        let added = other.number_of_trips as f64;
        let total = prior + added;

        if total != 0.0 {
            self.avg_duration = (self.avg_duration * prior + other.avg_duration * added) / total;
            self.avg_distance = (self.avg_distance * prior + other.avg_distance * added) / total;
            self.avg_fare_amount =
                (self.avg_fare_amount * prior + other.avg_fare_amount * added) / total;
            self.avg_tip_amount =
                (self.avg_tip_amount * prior + other.avg_tip_amount * added) / total;
            self.avg_total_amount =
                (self.avg_total_amount * prior + other.avg_total_amount * added) / total;
        }

        self.number_of_trips += other.number_of_trips;
    }
}

/// Uniform access to the filterable attributes and mergeable metrics of a
/// row, so the grouping reducer works over all three datasets.
pub trait TripBucket {
    fn attrs(&self) -> &TripAttrs;
    fn metrics(&self) -> &TripMetrics;
}

/// One row of the by-day dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRow {
    pub day: String,
    #[serde(flatten)]
    pub attrs: TripAttrs,
    #[serde(flatten)]
    pub metrics: TripMetrics,
}

/// One row of the by-month dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRow {
    pub month: String,
    #[serde(flatten)]
    pub attrs: TripAttrs,
    #[serde(flatten)]
    pub metrics: TripMetrics,
}

/// One row of the by-zones dataset: a trip-flow bucket from one taxi zone
/// to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRow {
    pub start_zone: String,
    pub end_zone: String,
    #[serde(flatten)]
    pub attrs: TripAttrs,
    #[serde(flatten)]
    pub metrics: TripMetrics,
}

impl TripBucket for DayRow {
    fn attrs(&self) -> &TripAttrs {
        &self.attrs
    }
    fn metrics(&self) -> &TripMetrics {
        &self.metrics
    }
}

impl TripBucket for MonthRow {
    fn attrs(&self) -> &TripAttrs {
        &self.attrs
    }
    fn metrics(&self) -> &TripMetrics {
        &self.metrics
    }
}

impl TripBucket for ZoneRow {
    fn attrs(&self) -> &TripAttrs {
        &self.attrs
    }
    fn metrics(&self) -> &TripMetrics {
        &self.metrics
    }
}
