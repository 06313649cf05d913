#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident hotspot pipeline.
//!
//! One run takes the cleaned accident table and a [`HotspotQuery`], keeps
//! the accidents in the requested time-of-day window, clusters them by
//! great-circle distance, reduces each cluster to a summary and ranks the
//! summaries into a leaderboard with headline metrics.
//!
//! [`run_hotspots`] is the pure pipeline. [`Dashboard`] wraps it with the
//! configured dataset, loaded once through [`cache::DatasetCache`].

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod filter;
pub mod ranking;

use std::sync::Arc;

use hotspot_map_accident_models::{AccidentRecord, TimeWindow};
use hotspot_map_hotspot_models::{ClusterParamsError, HotspotQuery, HotspotReport, MapPoint};
use hotspot_map_source::progress::ProgressCallback;
use hotspot_map_source::{LoadedDataset, SourceError};
use hotspot_map_spatial::{Dbscan, DbscanError};

use crate::cache::DatasetCache;
use crate::config::DashboardConfig;

/// Warning shown when clustering finds no hotspot.
pub const NO_CLUSTERS_WARNING: &str = "No clusters detected with current parameters. \
     Try increasing the search radius or decreasing minimum samples.";

/// Errors from a hotspot run.
#[derive(Debug, thiserror::Error)]
pub enum HotspotError {
    /// The accident table is missing, unreadable or empty after cleaning.
    #[error("Dataset not found or empty: {0}")]
    DataUnavailable(#[from] SourceError),

    /// No accident falls in the requested time window.
    #[error(
        "No data available for the {} time range. Please choose a different time period.",
        window.label()
    )]
    EmptyTimeWindow {
        /// The window that matched nothing.
        window: TimeWindow,
    },

    /// Clustering parameters are out of range.
    #[error("Invalid parameters: {0}")]
    InvalidParams(#[from] ClusterParamsError),

    /// The clusterer rejected its parameters.
    #[error("Clustering failed: {0}")]
    Clustering(#[from] DbscanError),
}

/// What clustering produced for a non-empty window.
#[derive(Debug, Clone, PartialEq)]
pub enum HotspotOutcome {
    /// At least one hotspot was found.
    Hotspots(HotspotReport),

    /// Every accident was noise. Carries the raw filtered points so they
    /// can still be shown.
    NoClusters {
        /// Positions of every filtered accident.
        points: Vec<MapPoint>,
        /// Advice for adjusting the parameters.
        warning: String,
    },
}

impl HotspotOutcome {
    /// The report, if hotspots were found.
    #[must_use]
    pub const fn report(&self) -> Option<&HotspotReport> {
        match self {
            Self::Hotspots(report) => Some(report),
            Self::NoClusters { .. } => None,
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotRun {
    /// The query that produced this run.
    pub query: HotspotQuery,
    /// Accidents in the requested window, in table order.
    pub filtered: Vec<AccidentRecord>,
    /// Hotspots or the no-cluster fallback.
    pub outcome: HotspotOutcome,
}

/// Runs the full pipeline over an already-loaded dataset.
///
/// # Errors
///
/// * [`HotspotError::InvalidParams`] if the query's parameters are out of
///   range. Nothing is filtered or clustered.
/// * [`HotspotError::EmptyTimeWindow`] if no accident falls in the window.
///   Clustering is not attempted.
pub fn run_hotspots(
    dataset: &LoadedDataset,
    query: &HotspotQuery,
) -> Result<HotspotRun, HotspotError> {
    query.params.validate()?;

    let filtered = filter::filter_by_window(&dataset.records, query.time_window);
    if filtered.is_empty() {
        log::info!("No accidents in the {} window", query.time_window);
        return Err(HotspotError::EmptyTimeWindow {
            window: query.time_window,
        });
    }

    let coordinates: Vec<(f64, f64)> = filtered.iter().map(AccidentRecord::coordinates).collect();
    let dbscan = Dbscan::new(query.params.radius_meters, query.params.min_samples)?;
    let labels = dbscan.fit(&coordinates);

    let summaries = aggregate::summarize_clusters(&filtered, &labels);

    let outcome = match ranking::build_report(summaries) {
        Some(report) => {
            log::info!(
                "{}: {} hotspots from {} accidents (radius={} m, min_samples={})",
                query.time_window,
                report.metrics.hotspot_count,
                filtered.len(),
                query.params.radius_meters,
                query.params.min_samples
            );
            HotspotOutcome::Hotspots(report)
        }
        None => {
            log::info!(
                "{}: no hotspots among {} accidents (radius={} m, min_samples={})",
                query.time_window,
                filtered.len(),
                query.params.radius_meters,
                query.params.min_samples
            );
            HotspotOutcome::NoClusters {
                points: filtered
                    .iter()
                    .map(|r| MapPoint {
                        latitude: r.latitude,
                        longitude: r.longitude,
                    })
                    .collect(),
                warning: NO_CLUSTERS_WARNING.to_string(),
            }
        }
    };

    Ok(HotspotRun {
        query: *query,
        filtered,
        outcome,
    })
}

/// The configured dataset plus the pipeline.
///
/// Cheap to clone; every clone shares the process-wide dataset cache.
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: Arc<DashboardConfig>,
    cache: &'static DatasetCache,
}

impl Dashboard {
    /// Creates a dashboard backed by the process-wide dataset cache.
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config: Arc::new(config),
            cache: DatasetCache::global(),
        }
    }

    /// The configuration this dashboard was built with.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The query the controls start at.
    #[must_use]
    pub fn default_query(&self) -> HotspotQuery {
        self.config.defaults.query()
    }

    /// Returns the configured dataset, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::DataUnavailable`] if the table cannot be
    /// loaded.
    pub fn dataset(
        &self,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Arc<LoadedDataset>, HotspotError> {
        Ok(self.cache.get_or_load(&self.config.dataset_path, progress)?)
    }

    /// Loads the dataset if needed and runs the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError`] if the dataset is unavailable or the run
    /// fails.
    pub fn run(
        &self,
        query: &HotspotQuery,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<HotspotRun, HotspotError> {
        let dataset = self.dataset(progress)?;
        run_hotspots(&dataset, query)
    }

    /// Accidents in `window`, without clustering.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::DataUnavailable`] if the table cannot be
    /// loaded.
    pub fn records(
        &self,
        window: TimeWindow,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Vec<AccidentRecord>, HotspotError> {
        let dataset = self.dataset(progress)?;
        Ok(filter::filter_by_window(&dataset.records, window))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use hotspot_map_hotspot_models::ClusterParams;
    use hotspot_map_source::LoadReport;
    use hotspot_map_source::progress::null_progress;

    use super::*;

    fn dataset(records: Vec<AccidentRecord>) -> LoadedDataset {
        let rows = records.len() as u64;
        LoadedDataset {
            source: PathBuf::from("memory.csv"),
            records,
            report: LoadReport {
                rows_read: rows,
                rows_dropped: 0,
                timestamps_unparsed: 0,
            },
        }
    }

    fn at(lat: f64, lng: f64, hour: Option<u8>, severity: i32, street: &str) -> AccidentRecord {
        let mut record = AccidentRecord::new(lat, lng, None, severity, Some(street));
        record.hour_of_day = hour;
        record
    }

    /// `count` accidents within a few meters of `(lat, lng)`.
    fn pile(lat: f64, lng: f64, count: u32, hour: u8, severe: u32, street: &str) -> Vec<AccidentRecord> {
        (0..count)
            .map(|i| {
                let jitter = f64::from(i) * 0.000_01;
                let severity = if i < severe { 4 } else { 2 };
                at(lat + jitter, lng - jitter, Some(hour), severity, street)
            })
            .collect()
    }

    fn query(time_window: TimeWindow, radius_meters: f64, min_samples: usize) -> HotspotQuery {
        HotspotQuery {
            time_window,
            params: ClusterParams {
                radius_meters,
                min_samples,
            },
        }
    }

    #[test]
    fn finds_hotspots_and_ranks_them() {
        let mut records = pile(25.77, -80.19, 20, 8, 10, "I-95 N");
        records.extend(pile(25.80, -80.25, 30, 17, 15, "SW 8th St"));
        records.push(at(26.5, -81.0, Some(12), 4, "Lonely Ln"));

        let run = run_hotspots(&dataset(records), &query(TimeWindow::AllDay, 65.0, 15)).unwrap();
        let report = run.outcome.report().unwrap();

        assert_eq!(run.filtered.len(), 51);
        assert_eq!(report.metrics.hotspot_count, 2);
        assert_eq!(report.metrics.accidents_analyzed, 50);
        assert_eq!(report.metrics.severe_incidents, 25);
        assert!((report.metrics.severity_rate - 50.0).abs() < 1e-12);

        assert_eq!(report.hotspots[0].representative_street, "I-95 N");
        assert_eq!(report.hotspots[1].representative_street, "SW 8th St");
        assert_eq!(
            report.leaderboard.top().map(|h| h.representative_street.as_str()),
            Some("SW 8th St")
        );
        assert!(report.insight.contains("SW 8th St with 30 total accidents (15 severe)"));
    }

    #[test]
    fn time_window_narrows_before_clustering() {
        let mut records = pile(25.77, -80.19, 20, 8, 5, "I-95 N");
        records.extend(pile(25.80, -80.25, 20, 17, 5, "SW 8th St"));

        let run =
            run_hotspots(&dataset(records), &query(TimeWindow::EveningRush, 65.0, 15)).unwrap();
        let report = run.outcome.report().unwrap();

        assert_eq!(run.filtered.len(), 20);
        assert_eq!(report.hotspots.len(), 1);
        assert_eq!(report.hotspots[0].representative_street, "SW 8th St");
    }

    #[test]
    fn high_min_samples_falls_back_to_raw_points() {
        let records = pile(25.77, -80.19, 20, 8, 5, "I-95 N");

        let run = run_hotspots(&dataset(records), &query(TimeWindow::AllDay, 65.0, 100)).unwrap();

        match run.outcome {
            HotspotOutcome::NoClusters { points, warning } => {
                assert_eq!(points.len(), 20);
                assert_eq!(warning, NO_CLUSTERS_WARNING);
            }
            HotspotOutcome::Hotspots(_) => panic!("expected no clusters"),
        }
    }

    #[test]
    fn empty_window_is_reported_without_clustering() {
        let records = pile(25.77, -80.19, 20, 12, 5, "I-95 N");

        let err =
            run_hotspots(&dataset(records), &query(TimeWindow::NightOwl, 65.0, 15)).unwrap_err();

        assert!(matches!(
            err,
            HotspotError::EmptyTimeWindow {
                window: TimeWindow::NightOwl
            }
        ));
    }

    #[test]
    fn out_of_range_params_are_rejected_first() {
        let records = pile(25.77, -80.19, 20, 12, 5, "I-95 N");

        let err = run_hotspots(&dataset(records), &query(TimeWindow::NightOwl, 5.0, 15)).unwrap_err();

        assert!(matches!(err, HotspotError::InvalidParams(_)));
    }

    #[test]
    fn clustered_counts_never_exceed_filtered_count() {
        let mut records = pile(25.77, -80.19, 18, 8, 3, "A St");
        records.extend(pile(25.90, -80.30, 7, 8, 7, "B St"));
        records.extend((0..5).map(|i| at(26.0 + f64::from(i), -81.0, Some(8), 1, "C St")));

        let run = run_hotspots(&dataset(records), &query(TimeWindow::AllDay, 100.0, 5)).unwrap();
        let report = run.outcome.report().unwrap();

        let total: u64 = report.hotspots.iter().map(|h| h.total_accidents).sum();
        assert_eq!(total, 25);
        assert!(total as usize <= run.filtered.len());
        for hotspot in &report.hotspots {
            assert!(hotspot.severe_accidents <= hotspot.total_accidents);
            assert!(hotspot.total_accidents >= 5);
        }
        assert!(report.leaderboard.len() <= 5);
    }

    #[test]
    fn dashboard_reports_missing_dataset() {
        let config = DashboardConfig::default().with_dataset_override(Some(
            std::env::temp_dir().join("hotspot_map_dashboard_missing.csv"),
        ));
        let dashboard = Dashboard::new(config);

        let err = dashboard
            .run(&dashboard.default_query(), &null_progress())
            .unwrap_err();

        assert!(matches!(err, HotspotError::DataUnavailable(_)));
    }

    #[test]
    fn dashboard_loads_and_runs() {
        let path = std::env::temp_dir().join(format!(
            "hotspot_map_dashboard_{}.csv",
            std::process::id()
        ));
        let mut csv = String::from("Start_Lat,Start_Lng,Start_Time,Severity,Street\n");
        for i in 0..16 {
            csv.push_str(&format!(
                "{},{},2016-02-08 17:{:02}:00,3,Biscayne Blvd\n",
                25.78 + f64::from(i) * 0.000_01,
                -80.19,
                i
            ));
        }
        std::fs::write(&path, csv).unwrap();

        let dashboard = Dashboard::new(DashboardConfig::default().with_dataset_override(Some(path.clone())));
        let run = dashboard
            .run(&dashboard.default_query(), &null_progress())
            .unwrap();
        let evening = dashboard
            .records(TimeWindow::EveningRush, &null_progress())
            .unwrap();
        std::fs::remove_file(&path).ok();

        let report = run.outcome.report().unwrap();
        assert_eq!(report.metrics.hotspot_count, 1);
        assert!((report.metrics.severity_rate - 100.0).abs() < 1e-12);
        assert_eq!(evening.len(), 16);
    }
}
