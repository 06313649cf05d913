//! Plain-text rendering of a hotspot run for the terminal.

use std::fmt::Write as _;

use hotspot_map_hotspot::{HotspotOutcome, HotspotRun};
use hotspot_map_hotspot_models::{HotspotQuery, HotspotReport};

/// Help text shown next to the search radius in verbose mode.
pub const RADIUS_HELP: &str = "Defines the geographic area to group accidents";
/// Help text shown next to the minimum cluster size in verbose mode.
pub const MIN_SAMPLES_HELP: &str = "Minimum number of accidents to form a hotspot";
/// One-paragraph description shown at the top of a verbose session.
pub const ABOUT: &str = "This dashboard uses DBSCAN clustering to identify accident hotspots, \
                         helping prioritize traffic safety resources.";

/// Raw points listed under a no-cluster warning.
const RAW_POINT_PREVIEW: usize = 10;

/// Widest street name shown in the leaderboard before truncation.
const STREET_WIDTH: usize = 32;

/// One line describing the query.
#[must_use]
pub fn query_line(query: &HotspotQuery, verbose: bool) -> String {
    if verbose {
        format!(
            "{}\n  Search radius: {} m ({RADIUS_HELP})\n  Min accidents per cluster: {} ({MIN_SAMPLES_HELP})",
            query.time_window.label(),
            query.params.radius_meters,
            query.params.min_samples
        )
    } else {
        format!(
            "{} | radius {} m | min {} accidents",
            query.time_window.label(),
            query.params.radius_meters,
            query.params.min_samples
        )
    }
}

/// Renders a whole run.
#[must_use]
pub fn render_run(run: &HotspotRun, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", query_line(&run.query, verbose));
    let _ = writeln!(out, "{} accidents in window", run.filtered.len());
    let _ = writeln!(out);

    match &run.outcome {
        HotspotOutcome::Hotspots(report) => out.push_str(&render_report(report)),
        HotspotOutcome::NoClusters { points, warning } => {
            let _ = writeln!(out, "⚠️  {warning}");
            let _ = writeln!(out);
            let _ = writeln!(out, "Raw accident positions:");
            for point in points.iter().take(RAW_POINT_PREVIEW) {
                let _ = writeln!(out, "  {:.5}, {:.5}", point.latitude, point.longitude);
            }
            if points.len() > RAW_POINT_PREVIEW {
                let _ = writeln!(out, "  ... and {} more", points.len() - RAW_POINT_PREVIEW);
            }
        }
    }

    out
}

/// Renders the metrics, leaderboard and insight of a report.
#[must_use]
pub fn render_report(report: &HotspotReport) -> String {
    let metrics = &report.metrics;
    let mut out = String::new();

    let _ = writeln!(out, "🔥 Hotspots          {}", metrics.hotspot_count);
    let _ = writeln!(out, "🚗 Total Crashes     {}", metrics.accidents_analyzed);
    let _ = writeln!(out, "⚠️  Severe Incidents  {}", metrics.severe_incidents);
    let _ = writeln!(out, "📈 Severity Rate     {:.1}%", metrics.severity_rate);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "🏆 Top {} Most Dangerous Locations",
        report.leaderboard.len()
    );
    let _ = writeln!(
        out,
        "     {:<width$}  {:>6}  {:>6}",
        "Location",
        "Total",
        "Severe",
        width = STREET_WIDTH
    );
    for entry in report.leaderboard.entries() {
        let _ = writeln!(
            out,
            "{:<4} {:<width$}  {:>6}  {:>6}",
            entry.medal,
            truncate(&entry.hotspot.representative_street, STREET_WIDTH),
            entry.hotspot.total_accidents,
            entry.hotspot.severe_accidents,
            width = STREET_WIDTH
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "💡 Key Insight: {}", report.insight);
    let _ = writeln!(
        out,
        "📍 Map center: {:.5}, {:.5}",
        report.map_center.latitude, report.map_center.longitude
    );

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
