//! Categorical filter predicate over trip buckets.

use serde::Serialize;

use crate::record::TripAttrs;

/// Wildcard value accepted by every filter field.
pub const ANY: &str = "any";

/// The four toggle selections from the dashboard: weather, season,
/// time-of-day, and New York area. Each is either [`ANY`] or a specific
/// category string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripFilter {
    pub weather: String,
    pub season: String,
    pub time: String,
    pub area: String,
}

impl TripFilter {
    /// The all-wildcard filter, matching every bucket.
    pub fn any() -> Self {
        TripFilter {
            weather: ANY.to_string(),
            season: ANY.to_string(),
            time: ANY.to_string(),
            area: ANY.to_string(),
        }
    }

    /// True iff every non-wildcard selection equals the bucket's
    /// corresponding attribute.
    pub fn matches(&self, attrs: &TripAttrs) -> bool {
        if self.weather != ANY && attrs.weather != self.weather {
            return false;
        }
        if self.season != ANY && attrs.season != self.season {
            return false;
        }
        if self.time != ANY && attrs.time != self.time {
            return false;
        }
        if self.area != ANY && attrs.area != self.area {
            return false;
        }

        true
    }
}

impl Default for TripFilter {
    fn default() -> Self {
        TripFilter::any()
    }
}
