//! Density-based clustering (DBSCAN) over great-circle distance.

use crate::index::NeighborIndex;
use crate::{meters_to_radians, to_radians};

/// Errors from invalid clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DbscanError {
    /// Search radius was zero, negative or not finite.
    #[error("Search radius must be a positive number of meters, got {0}")]
    InvalidRadius(f64),

    /// Minimum cluster size was below 1.
    #[error("Minimum samples must be at least 1, got {0}")]
    InvalidMinSamples(usize),
}

/// Cluster membership of one input point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterLabel {
    /// Not reachable from any core point.
    Noise,
    /// Member of the cluster with this id.
    Cluster(usize),
}

impl ClusterLabel {
    /// Integer form of the label: `-1` for noise, the cluster id otherwise.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Noise => -1,
            Self::Cluster(id) => i64::try_from(id).unwrap_or(i64::MAX),
        }
    }

    /// Returns the cluster id, or `None` for noise.
    #[must_use]
    pub const fn cluster_id(self) -> Option<usize> {
        match self {
            Self::Noise => None,
            Self::Cluster(id) => Some(id),
        }
    }
}

/// Labels produced by one clustering run, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLabels {
    labels: Vec<ClusterLabel>,
    cluster_count: usize,
}

impl ClusterLabels {
    /// One label per input point.
    #[must_use]
    pub fn labels(&self) -> &[ClusterLabel] {
        &self.labels
    }

    /// Number of distinct clusters (noise excluded). Ids run `0..count`.
    #[must_use]
    pub const fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Number of points labelled noise.
    #[must_use]
    pub fn noise_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|l| **l == ClusterLabel::Noise)
            .count()
    }
}

/// DBSCAN configured for haversine distance on the Earth's mean sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dbscan {
    epsilon_radians: f64,
    min_samples: usize,
}

impl Dbscan {
    /// Creates a clusterer for a search radius in meters.
    ///
    /// # Errors
    ///
    /// Returns [`DbscanError`] if `radius_meters` is not a positive finite
    /// number or `min_samples` is zero.
    pub fn new(radius_meters: f64, min_samples: usize) -> Result<Self, DbscanError> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(DbscanError::InvalidRadius(radius_meters));
        }
        if min_samples == 0 {
            return Err(DbscanError::InvalidMinSamples(min_samples));
        }

        Ok(Self {
            epsilon_radians: meters_to_radians(radius_meters),
            min_samples,
        })
    }

    /// Neighbourhood radius as an angle in radians.
    #[must_use]
    pub const fn epsilon_radians(&self) -> f64 {
        self.epsilon_radians
    }

    /// Minimum neighbourhood size (the point itself included) for a core
    /// point.
    #[must_use]
    pub const fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Clusters `(latitude, longitude)` pairs given in degrees.
    ///
    /// A point is core when at least `min_samples` points (itself included)
    /// lie within epsilon. Clusters grow from core points through their
    /// neighbourhoods; border points join the first cluster that reaches
    /// them. Ids are assigned in order of each cluster's first core point.
    #[must_use]
    pub fn fit(&self, coordinates: &[(f64, f64)]) -> ClusterLabels {
        let points: Vec<[f64; 2]> = coordinates
            .iter()
            .map(|&(lat, lng)| to_radians(lat, lng))
            .collect();

        if points.is_empty() {
            return ClusterLabels {
                labels: Vec::new(),
                cluster_count: 0,
            };
        }

        let index = NeighborIndex::new(&points);
        let eps = self.epsilon_radians;

        let is_core: Vec<bool> = (0..index.len())
            .map(|i| index.has_at_least(i, eps, self.min_samples))
            .collect();

        let mut labels: Vec<Option<usize>> = vec![None; points.len()];
        let mut cluster_count = 0;
        let mut frontier = Vec::new();

        for start in 0..points.len() {
            if labels[start].is_some() || !is_core[start] {
                continue;
            }

            let id = cluster_count;
            cluster_count += 1;
            labels[start] = Some(id);
            frontier.push(start);

            while let Some(core) = frontier.pop() {
                for neighbor in index.within(core, eps) {
                    if labels[neighbor].is_none() {
                        labels[neighbor] = Some(id);
                        if is_core[neighbor] {
                            frontier.push(neighbor);
                        }
                    }
                }
            }
        }

        let labels: Vec<ClusterLabel> = labels
            .into_iter()
            .map(|l| l.map_or(ClusterLabel::Noise, ClusterLabel::Cluster))
            .collect();

        let result = ClusterLabels {
            labels,
            cluster_count,
        };

        log::debug!(
            "DBSCAN: {} points, {} clusters, {} noise (eps={:.3e} rad, min_samples={})",
            points.len(),
            result.cluster_count,
            result.noise_count(),
            eps,
            self.min_samples
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haversine_meters;

    /// Offsets a point by roughly `north_m` / `east_m` meters.
    fn offset(lat: f64, lng: f64, north_m: f64, east_m: f64) -> (f64, f64) {
        let dlat = north_m / 111_195.0;
        let dlng = east_m / (111_195.0 * lat.to_radians().cos());
        (lat + dlat, lng + dlng)
    }

    fn tight_cluster(lat: f64, lng: f64, count: u32) -> Vec<(f64, f64)> {
        (0..count)
            .map(|i| {
                let angle = f64::from(i) * 0.7;
                offset(lat, lng, 4.0 * angle.sin(), 4.0 * angle.cos())
            })
            .collect()
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert_eq!(Dbscan::new(0.0, 5), Err(DbscanError::InvalidRadius(0.0)));
        assert!(matches!(
            Dbscan::new(f64::NAN, 5),
            Err(DbscanError::InvalidRadius(_))
        ));
        assert_eq!(Dbscan::new(65.0, 0), Err(DbscanError::InvalidMinSamples(0)));
    }

    #[test]
    fn epsilon_uses_mean_earth_radius() {
        let dbscan = Dbscan::new(65.0, 15).unwrap();
        let expected = (65.0 / 1000.0) / 6371.0088;
        assert!((dbscan.epsilon_radians() - expected).abs() < 1e-15);
    }

    #[test]
    fn empty_input_has_no_clusters() {
        let labels = Dbscan::new(65.0, 5).unwrap().fit(&[]);
        assert_eq!(labels.cluster_count(), 0);
        assert!(labels.labels().is_empty());
    }

    #[test]
    fn tight_group_plus_isolated_point() {
        let mut points = tight_cluster(25.7617, -80.1918, 20);
        points.push(offset(25.7617, -80.1918, 2_000.0, 0.0));

        for p in &points[..20] {
            assert!(haversine_meters(points[0], *p) <= 10.0);
        }

        let labels = Dbscan::new(65.0, 15).unwrap().fit(&points);

        assert_eq!(labels.cluster_count(), 1);
        assert!(
            labels.labels()[..20]
                .iter()
                .all(|l| *l == ClusterLabel::Cluster(0))
        );
        assert_eq!(labels.labels()[20], ClusterLabel::Noise);
        assert_eq!(labels.labels()[20].as_i64(), -1);
    }

    #[test]
    fn min_samples_above_point_count_yields_all_noise() {
        let points = tight_cluster(25.7617, -80.1918, 20);
        let labels = Dbscan::new(65.0, 100).unwrap().fit(&points);
        assert_eq!(labels.cluster_count(), 0);
        assert_eq!(labels.noise_count(), 20);
    }

    #[test]
    fn separate_groups_get_distinct_ids() {
        let mut points = tight_cluster(25.7617, -80.1918, 8);
        points.extend(tight_cluster(25.80, -80.25, 8));

        let labels = Dbscan::new(50.0, 5).unwrap().fit(&points);

        assert_eq!(labels.cluster_count(), 2);
        assert!(labels.labels()[..8].iter().all(|l| *l == ClusterLabel::Cluster(0)));
        assert!(labels.labels()[8..].iter().all(|l| *l == ClusterLabel::Cluster(1)));
    }

    #[test]
    fn chains_of_core_points_merge_transitively() {
        // Points every 40 m along a line: each sees its neighbours at 40 m
        // but the ends are 360 m apart.
        let points: Vec<(f64, f64)> = (0..10)
            .map(|i| offset(25.0, -80.0, 0.0, 40.0 * f64::from(i)))
            .collect();

        let labels = Dbscan::new(45.0, 3).unwrap().fit(&points);

        assert_eq!(labels.cluster_count(), 1);
        assert_eq!(labels.noise_count(), 0);
    }

    #[test]
    fn border_points_join_but_do_not_extend() {
        // Core: 5 points at the origin and 4 points 30 m west. Border: one
        // point 40 m east, reachable from the origin group but with too few
        // neighbours to be core. Outlier: 80 m east, only reachable from the
        // border point.
        let mut points = tight_cluster(25.0, -80.0, 5);
        let (west_lat, west_lng) = offset(25.0, -80.0, 0.0, -30.0);
        points.extend(tight_cluster(west_lat, west_lng, 4));
        points.push(offset(25.0, -80.0, 0.0, 40.0));
        points.push(offset(25.0, -80.0, 0.0, 80.0));

        let labels = Dbscan::new(45.0, 8).unwrap().fit(&points);

        assert_eq!(labels.cluster_count(), 1);
        assert!(labels.labels()[..10].iter().all(|l| *l == ClusterLabel::Cluster(0)));
        assert_eq!(labels.labels()[10], ClusterLabel::Noise);
    }

    #[test]
    fn uses_great_circle_not_euclidean_degrees() {
        // At 60 degrees north one degree of longitude is half as long as one
        // degree of latitude. Two points 0.0008 deg apart in longitude are
        // ~44 m apart, so a 50 m radius groups them even though the same
        // offset in latitude (~89 m) would not.
        let lng_pair = vec![(60.0, 10.0), (60.0, 10.0008)];
        let lat_pair = vec![(60.0, 10.0), (60.0008, 10.0)];

        let dbscan = Dbscan::new(50.0, 2).unwrap();
        assert_eq!(dbscan.fit(&lng_pair).cluster_count(), 1);
        assert_eq!(dbscan.fit(&lat_pair).cluster_count(), 0);
    }

    #[test]
    fn every_cluster_meets_min_samples_when_no_borders_are_shared() {
        let mut points = tight_cluster(25.70, -80.30, 12);
        points.extend(tight_cluster(25.75, -80.35, 6));
        points.extend(tight_cluster(25.80, -80.40, 3));

        let min_samples = 6;
        let labels = Dbscan::new(30.0, min_samples).unwrap().fit(&points);

        assert_eq!(labels.cluster_count(), 2);
        for id in 0..labels.cluster_count() {
            let members = labels
                .labels()
                .iter()
                .filter(|l| l.cluster_id() == Some(id))
                .count();
            assert!(members >= min_samples);
        }
        assert_eq!(labels.noise_count(), 3);
    }
}
