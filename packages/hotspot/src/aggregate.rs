//! Reduces each cluster's member accidents into a [`HotspotSummary`].

use std::collections::HashMap;

use hotspot_map_accident_models::AccidentRecord;
use hotspot_map_hotspot_models::{HotspotSummary, UNKNOWN_STREET};
use hotspot_map_spatial::{ClusterLabels, mean_center};

/// Builds one summary per cluster, in ascending cluster-id order.
///
/// `labels` must come from clustering exactly `records`, in the same order.
/// Noise points are ignored.
#[must_use]
pub fn summarize_clusters(records: &[AccidentRecord], labels: &ClusterLabels) -> Vec<HotspotSummary> {
    debug_assert_eq!(records.len(), labels.labels().len());

    let mut members: Vec<Vec<&AccidentRecord>> = vec![Vec::new(); labels.cluster_count()];
    for (record, label) in records.iter().zip(labels.labels()) {
        if let Some(id) = label.cluster_id() {
            members[id].push(record);
        }
    }

    members
        .iter()
        .enumerate()
        .filter_map(|(cluster_id, group)| summarize_group(cluster_id, group))
        .collect()
}

fn summarize_group(cluster_id: usize, group: &[&AccidentRecord]) -> Option<HotspotSummary> {
    let (centroid_latitude, centroid_longitude) =
        mean_center(group.iter().map(|r| r.coordinates()))?;

    Some(HotspotSummary {
        cluster_id,
        centroid_latitude,
        centroid_longitude,
        total_accidents: group.len() as u64,
        severe_accidents: group.iter().filter(|r| r.is_major).count() as u64,
        representative_street: representative_street(group),
    })
}

/// Most frequent street name among `group`.
///
/// Ties go to the street seen first. Falls back to `"Unknown"` when no
/// member has a street.
#[must_use]
pub fn representative_street(group: &[&AccidentRecord]) -> String {
    // (street, count) in first-seen order
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for street in group.iter().filter_map(|r| r.street_name.as_deref()) {
        if let Some(&pos) = positions.get(street) {
            counts[pos].1 += 1;
        } else {
            positions.insert(street, counts.len());
            counts.push((street, 1));
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for &(street, count) in &counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((street, count));
        }
    }

    best.map_or_else(|| UNKNOWN_STREET.to_string(), |(street, _)| street.to_string())
}
