//! Leaderboard, metrics and insight text for a set of hotspots.

use hotspot_map_hotspot_models::{
    DEFAULT_LEADERBOARD_SIZE, HotspotMetrics, HotspotReport, HotspotSummary, MapPoint,
    RankedLeaderboard,
};
use hotspot_map_spatial::mean_center;

/// Orders hotspots by severe accident count, most severe first, and keeps
/// the top five.
///
/// The sort is stable: equal counts keep their cluster-id order.
#[must_use]
pub fn rank_hotspots(hotspots: &[HotspotSummary]) -> RankedLeaderboard {
    let mut ranked = hotspots.to_vec();
    ranked.sort_by(|a, b| b.severe_accidents.cmp(&a.severe_accidents));
    ranked.truncate(DEFAULT_LEADERBOARD_SIZE);
    RankedLeaderboard::from_ranked(ranked)
}

/// Totals over every hotspot.
#[must_use]
pub fn compute_metrics(hotspots: &[HotspotSummary]) -> HotspotMetrics {
    let accidents_analyzed: u64 = hotspots.iter().map(|h| h.total_accidents).sum();
    let severe_incidents: u64 = hotspots.iter().map(|h| h.severe_accidents).sum();

    #[allow(clippy::cast_precision_loss)]
    let severity_rate = if accidents_analyzed == 0 {
        0.0
    } else {
        severe_incidents as f64 / accidents_analyzed as f64 * 100.0
    };

    HotspotMetrics {
        hotspot_count: hotspots.len(),
        accidents_analyzed,
        severe_incidents,
        severity_rate,
    }
}

/// One-line description of the top-ranked hotspot.
#[must_use]
pub fn insight_text(top: &HotspotSummary) -> String {
    format!(
        "The highest-risk location is {} with {} total accidents ({} severe). \
         Immediate intervention recommended for this area.",
        top.representative_street, top.total_accidents, top.severe_accidents
    )
}

/// Mean of the hotspot centroids.
#[must_use]
pub fn map_center(hotspots: &[HotspotSummary]) -> Option<MapPoint> {
    mean_center(
        hotspots
            .iter()
            .map(|h| (h.centroid_latitude, h.centroid_longitude)),
    )
    .map(|(latitude, longitude)| MapPoint {
        latitude,
        longitude,
    })
}

/// Assembles the full report. Returns `None` when `hotspots` is empty.
#[must_use]
pub fn build_report(hotspots: Vec<HotspotSummary>) -> Option<HotspotReport> {
    let leaderboard = rank_hotspots(&hotspots);
    let insight = insight_text(leaderboard.top()?);
    let map_center = map_center(&hotspots)?;
    let metrics = compute_metrics(&hotspots);

    Some(HotspotReport {
        hotspots,
        leaderboard,
        metrics,
        insight,
        map_center,
    })
}
