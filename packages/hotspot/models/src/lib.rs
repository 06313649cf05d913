#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot query parameters and result types.
//!
//! Defines what a caller sends into one hotspot computation
//! ([`HotspotQuery`]) and the structured result it gets back
//! ([`HotspotReport`] and friends).

use hotspot_map_accident_models::TimeWindow;
use serde::{Deserialize, Serialize};

/// Smallest search radius the dashboard offers, in meters.
pub const MIN_RADIUS_METERS: f64 = 20.0;
/// Largest search radius the dashboard offers, in meters.
pub const MAX_RADIUS_METERS: f64 = 500.0;
/// Slider step for the search radius, in meters.
pub const RADIUS_STEP_METERS: f64 = 5.0;
/// Default search radius, in meters.
pub const DEFAULT_RADIUS_METERS: f64 = 65.0;

/// Smallest minimum-cluster-size the dashboard offers.
pub const MIN_MIN_SAMPLES: usize = 5;
/// Largest minimum-cluster-size the dashboard offers.
pub const MAX_MIN_SAMPLES: usize = 100;
/// Default minimum cluster size.
pub const DEFAULT_MIN_SAMPLES: usize = 15;

/// Default number of leaderboard entries.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;

/// Street label used when a hotspot has no street values.
pub const UNKNOWN_STREET: &str = "Unknown";

/// Rank markers for the first five leaderboard rows.
pub const RANK_MEDALS: &[&str] = &["🥇", "🥈", "🥉", "4️⃣", "5️⃣"];

/// Error returned when clustering parameters fall outside the allowed
/// range.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ClusterParamsError {
    /// Radius outside `[20, 500]` meters or not finite.
    #[error("invalid search radius {value} m: expected 20-500 m")]
    Radius {
        /// The rejected radius.
        value: f64,
    },

    /// Minimum samples outside `[5, 100]`.
    #[error("invalid minimum samples {value}: expected 5-100")]
    MinSamples {
        /// The rejected value.
        value: usize,
    },
}

/// The two clustering knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterParams {
    /// Neighbourhood radius in meters.
    pub radius_meters: f64,
    /// Minimum accidents (the point itself included) for a core point.
    pub min_samples: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl ClusterParams {
    /// Checks both knobs against the dashboard's ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterParamsError`] for the first knob out of range.
    pub fn validate(&self) -> Result<(), ClusterParamsError> {
        if !self.radius_meters.is_finite()
            || !(MIN_RADIUS_METERS..=MAX_RADIUS_METERS).contains(&self.radius_meters)
        {
            return Err(ClusterParamsError::Radius {
                value: self.radius_meters,
            });
        }
        if !(MIN_MIN_SAMPLES..=MAX_MIN_SAMPLES).contains(&self.min_samples) {
            return Err(ClusterParamsError::MinSamples {
                value: self.min_samples,
            });
        }
        Ok(())
    }
}

/// Everything a single hotspot computation depends on besides the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotQuery {
    /// Time-of-day bucket.
    pub time_window: TimeWindow,
    /// Clustering knobs.
    pub params: ClusterParams,
}

/// A latitude/longitude position for map display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// One detected hotspot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotSummary {
    /// Cluster id from the clustering run.
    pub cluster_id: usize,
    /// Mean latitude of member accidents.
    pub centroid_latitude: f64,
    /// Mean longitude of member accidents.
    pub centroid_longitude: f64,
    /// Number of member accidents.
    pub total_accidents: u64,
    /// Number of members with severity 3 or higher.
    pub severe_accidents: u64,
    /// Most common street among members, or `"Unknown"`.
    pub representative_street: String,
}

impl HotspotSummary {
    /// Centroid as a [`MapPoint`].
    #[must_use]
    pub const fn centroid(&self) -> MapPoint {
        MapPoint {
            latitude: self.centroid_latitude,
            longitude: self.centroid_longitude,
        }
    }
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based rank.
    pub rank: usize,
    /// Rank marker (medal emoji for the top three).
    pub medal: String,
    /// The ranked hotspot.
    pub hotspot: HotspotSummary,
}

/// Hotspots ordered by severe accident count, most severe first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedLeaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl RankedLeaderboard {
    /// Wraps already-ranked summaries, numbering them from 1.
    #[must_use]
    pub fn from_ranked(ranked: Vec<HotspotSummary>) -> Self {
        let entries = ranked
            .into_iter()
            .enumerate()
            .map(|(i, hotspot)| LeaderboardEntry {
                rank: i + 1,
                medal: RANK_MEDALS
                    .get(i)
                    .map_or_else(|| format!("#{}", i + 1), |m| (*m).to_string()),
                hotspot,
            })
            .collect();
        Self { entries }
    }

    /// Ranked rows.
    #[must_use]
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// The top-ranked hotspot, if any.
    #[must_use]
    pub fn top(&self) -> Option<&HotspotSummary> {
        self.entries.first().map(|e| &e.hotspot)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Aggregate metrics over every hotspot of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotMetrics {
    /// Number of hotspots.
    pub hotspot_count: usize,
    /// Accidents inside any hotspot.
    pub accidents_analyzed: u64,
    /// Severe accidents inside any hotspot.
    pub severe_incidents: u64,
    /// `severe_incidents / accidents_analyzed * 100`, or `0.0` when no
    /// accident was clustered.
    pub severity_rate: f64,
}

/// Full result of a run that found at least one hotspot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotReport {
    /// Every hotspot in cluster-id order.
    pub hotspots: Vec<HotspotSummary>,
    /// Top hotspots by severe accident count.
    pub leaderboard: RankedLeaderboard,
    /// Aggregate metrics.
    pub metrics: HotspotMetrics,
    /// One-line description of the top-ranked hotspot.
    pub insight: String,
    /// Suggested map center: the mean of hotspot centroids.
    pub map_center: MapPoint,
}
