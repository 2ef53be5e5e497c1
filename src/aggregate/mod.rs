//! Grouped aggregation of pre-aggregated trip buckets.
//!
//! This module collapses filtered bucket rows into one merged metric set
//! per group key with a single-pass, trip-count-weighted running average:
//! flat grouping (by day, by month) in [`merge`], two-level zone-to-zone
//! grouping plus geographic flattening in [`flows`].

pub mod flows;
pub mod merge;
