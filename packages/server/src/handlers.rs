//! HTTP handler functions for the hotspot map API.

use std::str::FromStr as _;

use actix_web::{HttpResponse, web};
use hotspot_map_accident_models::TimeWindow;
use hotspot_map_hotspot::HotspotError;
use hotspot_map_hotspot_models::{ClusterParams, HotspotQuery};
use hotspot_map_server_models::{
    ApiAccident, ApiControls, ApiDataset, ApiError, ApiHealth, ApiHotspotResponse,
    ApiRecordsResponse, HotspotQueryParams, RecordsQueryParams,
};
use hotspot_map_source::progress::null_progress;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/controls`
///
/// Returns the selectable time windows and the slider ranges, with the
/// configured defaults.
pub async fn controls(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiControls::with_defaults(
        &state.dashboard.default_query(),
    ))
}

/// `GET /api/dataset`
///
/// Returns load diagnostics for the configured accident table.
pub async fn dataset(state: web::Data<AppState>) -> HttpResponse {
    let dashboard = state.dashboard.clone();
    match tokio::task::spawn_blocking(move || dashboard.dataset(&null_progress())).await {
        Ok(Ok(dataset)) => HttpResponse::Ok().json(ApiDataset {
            source: dataset.source.display().to_string(),
            rows_read: dataset.report.rows_read,
            rows_dropped: dataset.report.rows_dropped,
            rows_kept: dataset.report.rows_kept(),
            timestamps_unparsed: dataset.report.timestamps_unparsed,
        }),
        Ok(Err(e)) => pipeline_error(&e),
        Err(e) => task_failed(&e),
    }
}

/// `GET /api/hotspots`
///
/// Runs the pipeline for one time window and parameter pair. Missing
/// parameters fall back to the configured defaults.
pub async fn hotspots(
    state: web::Data<AppState>,
    params: web::Query<HotspotQueryParams>,
) -> HttpResponse {
    let query = match build_query(state.dashboard.default_query(), &params) {
        Ok(query) => query,
        Err(response) => return response,
    };

    let dashboard = state.dashboard.clone();
    match tokio::task::spawn_blocking(move || dashboard.run(&query, &null_progress())).await {
        Ok(Ok(run)) => HttpResponse::Ok().json(ApiHotspotResponse::from(run)),
        Ok(Err(e)) => pipeline_error(&e),
        Err(e) => task_failed(&e),
    }
}

/// `GET /api/records`
///
/// Returns the raw accidents in a time window, without clustering.
pub async fn records(
    state: web::Data<AppState>,
    params: web::Query<RecordsQueryParams>,
) -> HttpResponse {
    let time_window = match parse_time_window(params.time_window.as_deref(), TimeWindow::AllDay) {
        Ok(window) => window,
        Err(response) => return response,
    };

    let dashboard = state.dashboard.clone();
    match tokio::task::spawn_blocking(move || dashboard.records(time_window, &null_progress()))
        .await
    {
        Ok(Ok(records)) => HttpResponse::Ok().json(ApiRecordsResponse {
            time_window,
            count: records.len(),
            records: records.iter().map(ApiAccident::from).collect(),
        }),
        Ok(Err(e)) => pipeline_error(&e),
        Err(e) => task_failed(&e),
    }
}

/// Merges request parameters over `defaults` and validates the result.
fn build_query(
    defaults: HotspotQuery,
    params: &HotspotQueryParams,
) -> Result<HotspotQuery, HttpResponse> {
    let query = HotspotQuery {
        time_window: parse_time_window(params.time_window.as_deref(), defaults.time_window)?,
        params: ClusterParams {
            radius_meters: params.radius_meters.unwrap_or(defaults.params.radius_meters),
            min_samples: params.min_samples.unwrap_or(defaults.params.min_samples),
        },
    };

    query
        .params
        .validate()
        .map_err(|e| HttpResponse::BadRequest().json(ApiError::new("invalidParams", e.to_string())))?;

    Ok(query)
}

fn parse_time_window(value: Option<&str>, default: TimeWindow) -> Result<TimeWindow, HttpResponse> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(name) => TimeWindow::from_str(name).map_err(|_| {
            HttpResponse::BadRequest().json(ApiError::new(
                "invalidTimeWindow",
                format!(
                    "Unknown time window '{name}'; expected one of AllDay, MorningRush, \
                     EveningRush, NightOwl"
                ),
            ))
        }),
    }
}

fn pipeline_error(e: &HotspotError) -> HttpResponse {
    match e {
        HotspotError::DataUnavailable(_) => {
            log::error!("{e}");
            HttpResponse::ServiceUnavailable().json(ApiError::new("dataUnavailable", e.to_string()))
        }
        HotspotError::EmptyTimeWindow { .. } => {
            HttpResponse::NotFound().json(ApiError::new("emptyTimeWindow", e.to_string()))
        }
        HotspotError::InvalidParams(_) | HotspotError::Clustering(_) => {
            HttpResponse::BadRequest().json(ApiError::new("invalidParams", e.to_string()))
        }
    }
}

fn task_failed(e: &tokio::task::JoinError) -> HttpResponse {
    log::error!("Pipeline task failed: {e}");
    HttpResponse::InternalServerError().json(ApiError::new("internal", "Pipeline task failed"))
}
