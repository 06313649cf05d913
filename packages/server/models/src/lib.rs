#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the hotspot map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the pipeline types so the API contract can evolve independently.

use hotspot_map_accident_models::{AccidentRecord, TimeWindow};
use hotspot_map_hotspot::{HotspotOutcome, HotspotRun};
use hotspot_map_hotspot_models::{
    HotspotQuery, HotspotReport, MAX_MIN_SAMPLES, MAX_RADIUS_METERS, MIN_MIN_SAMPLES,
    MIN_RADIUS_METERS, MapPoint, RADIUS_STEP_METERS,
};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Query parameters for the hotspots endpoint.
///
/// Missing values fall back to the configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotQueryParams {
    /// Time window name, e.g. `EveningRush` (case-insensitive).
    pub time_window: Option<String>,
    /// Search radius in meters.
    pub radius_meters: Option<f64>,
    /// Minimum accidents per cluster.
    pub min_samples: Option<usize>,
}

/// Query parameters for the records endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQueryParams {
    /// Time window name, e.g. `NightOwl` (case-insensitive).
    pub time_window: Option<String>,
}

/// A single accident as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAccident {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Hour of day (0-23), when the start time was parseable.
    pub hour_of_day: Option<u8>,
    /// Severity code.
    pub severity: i32,
    /// Whether the accident counts as severe.
    pub is_major: bool,
    /// Street name.
    pub street: Option<String>,
}

impl From<&AccidentRecord> for ApiAccident {
    fn from(record: &AccidentRecord) -> Self {
        Self {
            latitude: record.latitude,
            longitude: record.longitude,
            hour_of_day: record.hour_of_day,
            severity: record.severity,
            is_major: record.is_major,
            street: record.street_name.clone(),
        }
    }
}

/// Response from the hotspots endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ApiHotspotResponse {
    /// Clustering found at least one hotspot.
    Hotspots {
        /// The query that was run.
        query: HotspotQuery,
        /// Accidents in the requested window.
        filtered_count: usize,
        /// Hotspots, leaderboard, metrics and insight.
        report: HotspotReport,
    },
    /// Every accident in the window was noise.
    NoClusters {
        /// The query that was run.
        query: HotspotQuery,
        /// Accidents in the requested window.
        filtered_count: usize,
        /// Advice for adjusting the parameters.
        warning: String,
        /// Raw positions of the filtered accidents.
        points: Vec<MapPoint>,
    },
}

impl From<HotspotRun> for ApiHotspotResponse {
    fn from(run: HotspotRun) -> Self {
        let filtered_count = run.filtered.len();
        match run.outcome {
            HotspotOutcome::Hotspots(report) => Self::Hotspots {
                query: run.query,
                filtered_count,
                report,
            },
            HotspotOutcome::NoClusters { points, warning } => Self::NoClusters {
                query: run.query,
                filtered_count,
                warning,
                points,
            },
        }
    }
}

/// Response from the records endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecordsResponse {
    /// The window the records were filtered by.
    pub time_window: TimeWindow,
    /// Number of records.
    pub count: usize,
    /// Matching accidents in table order.
    pub records: Vec<ApiAccident>,
}

/// Load diagnostics for the configured dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataset {
    /// Path the dataset was loaded from.
    pub source: String,
    /// Data rows read.
    pub rows_read: u64,
    /// Rows dropped for unusable coordinates.
    pub rows_dropped: u64,
    /// Rows kept.
    pub rows_kept: u64,
    /// Kept rows without a parseable start time.
    pub timestamps_unparsed: u64,
}

/// A selectable time window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTimeWindow {
    /// Value to pass as `timeWindow`.
    pub name: TimeWindow,
    /// Display label.
    pub label: String,
}

/// Range and default of a numeric control.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRange<T> {
    /// Smallest accepted value.
    pub min: T,
    /// Largest accepted value.
    pub max: T,
    /// Slider step.
    pub step: T,
    /// Initial value.
    pub default: T,
}

/// Everything a client needs to render the dashboard controls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiControls {
    /// Selectable time windows.
    pub time_windows: Vec<ApiTimeWindow>,
    /// Initially selected time window.
    pub default_time_window: TimeWindow,
    /// Search radius in meters.
    pub radius_meters: ApiRange<f64>,
    /// Minimum accidents per cluster.
    pub min_samples: ApiRange<usize>,
}

impl ApiControls {
    /// Controls with the given initial query.
    #[must_use]
    pub fn with_defaults(defaults: &HotspotQuery) -> Self {
        Self {
            time_windows: TimeWindow::all()
                .iter()
                .map(|w| ApiTimeWindow {
                    name: *w,
                    label: w.label().to_string(),
                })
                .collect(),
            default_time_window: defaults.time_window,
            radius_meters: ApiRange {
                min: MIN_RADIUS_METERS,
                max: MAX_RADIUS_METERS,
                step: RADIUS_STEP_METERS,
                default: defaults.params.radius_meters,
            },
            min_samples: ApiRange {
                min: MIN_MIN_SAMPLES,
                max: MAX_MIN_SAMPLES,
                step: 1,
                default: defaults.params.min_samples,
            },
        }
    }
}

impl Default for ApiControls {
    fn default() -> Self {
        Self::with_defaults(&HotspotQuery::default())
    }
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error kind, e.g. `invalidParams`.
    pub code: String,
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Builds an error body.
    #[must_use]
    pub fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_clusters_response_is_tagged_camel_case() {
        let response = ApiHotspotResponse::NoClusters {
            query: HotspotQuery::default(),
            filtered_count: 2,
            warning: "none".to_string(),
            points: vec![MapPoint {
                latitude: 25.0,
                longitude: -80.0,
            }],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "noClusters");
        assert_eq!(json["filteredCount"], 2);
        assert_eq!(json["query"]["timeWindow"], "AllDay");
        assert_eq!(json["points"][0]["latitude"], 25.0);
    }

    #[test]
    fn accident_conversion_keeps_street() {
        let record = AccidentRecord::new(25.0, -80.0, None, 3, Some("I-95 N"));
        let api = ApiAccident::from(&record);
        assert!(api.is_major);
        assert_eq!(api.street.as_deref(), Some("I-95 N"));
        assert_eq!(api.hour_of_day, None);
    }

    #[test]
    fn controls_list_every_window_and_range() {
        let controls = ApiControls::default();
        assert_eq!(controls.time_windows.len(), 4);
        assert!((controls.radius_meters.min - 20.0).abs() < f64::EPSILON);
        assert!((controls.radius_meters.max - 500.0).abs() < f64::EPSILON);
        assert_eq!(controls.min_samples.default, 15);

        let json = serde_json::to_value(&controls).unwrap();
        assert_eq!(json["timeWindows"][3]["name"], "NightOwl");
        assert_eq!(json["minSamples"]["max"], 100);
    }
}
