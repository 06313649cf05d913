//! R-tree backed great-circle neighbourhood queries.
//!
//! Points are stored as `[latitude, longitude]` in radians. A query first
//! pulls candidates from a latitude/longitude bounding box that is
//! guaranteed to contain the whole spherical cap, then confirms each
//! candidate with the exact haversine distance.

use std::f64::consts::{FRAC_PI_2, PI};

use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

use crate::haversine_radians;

/// Slack added to bounding boxes so rounding never excludes a point that
/// lies exactly on the cap boundary.
const BOX_SLACK: f64 = 1e-12;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Spatial index over a fixed set of points.
pub struct NeighborIndex<'a> {
    points: &'a [[f64; 2]],
    tree: RTree<IndexedPoint>,
}

impl<'a> NeighborIndex<'a> {
    /// Bulk-loads `points` (`[lat, lng]` in radians) into an R-tree.
    #[must_use]
    pub fn new(points: &'a [[f64; 2]]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new(*p, i))
            .collect();

        Self {
            points,
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over the indexes of every point within `epsilon` radians of
    /// the point at `center`, including `center` itself.
    pub fn within(&self, center: usize, epsilon: f64) -> impl Iterator<Item = usize> + '_ {
        let origin = self.points[center];

        search_boxes(origin, epsilon)
            .into_iter()
            .flatten()
            .flat_map(move |envelope| self.tree.locate_in_envelope(&envelope))
            .filter(move |entry| haversine_radians(origin, *entry.geom()) <= epsilon)
            .map(|entry| entry.data)
    }

    /// Returns `true` if at least `threshold` points (`center` included) lie
    /// within `epsilon` radians of `center`. Stops counting early.
    #[must_use]
    pub fn has_at_least(&self, center: usize, epsilon: f64, threshold: usize) -> bool {
        self.within(center, epsilon).take(threshold).count() >= threshold
    }
}

/// Computes up to two `[lat, lng]` envelopes covering every point within
/// `epsilon` radians of `origin`.
///
/// Two boxes are needed when the longitude span crosses the antimeridian.
fn search_boxes(origin: [f64; 2], epsilon: f64) -> [Option<AABB<[f64; 2]>>; 2] {
    let [lat, lng] = origin;
    let lat_min = (lat - epsilon - BOX_SLACK).max(-FRAC_PI_2);
    let lat_max = (lat + epsilon + BOX_SLACK).min(FRAC_PI_2);

    let full = |lo: f64, hi: f64| Some(AABB::from_corners([lo, -PI], [hi, PI]));

    // Cap reaches a pole: every longitude is in range.
    if lat - epsilon <= -FRAC_PI_2 || lat + epsilon >= FRAC_PI_2 {
        return [full(lat_min, lat_max), None];
    }

    let ratio = epsilon.sin() / lat.cos();
    if ratio >= 1.0 {
        return [full(lat_min, lat_max), None];
    }

    let delta = ratio.asin() + BOX_SLACK;
    let lng_min = lng - delta;
    let lng_max = lng + delta;

    if lng_min < -PI {
        [
            Some(AABB::from_corners([lat_min, -PI], [lat_max, lng_max])),
            Some(AABB::from_corners([lat_min, lng_min + 2.0 * PI], [lat_max, PI])),
        ]
    } else if lng_max > PI {
        [
            Some(AABB::from_corners([lat_min, lng_min], [lat_max, PI])),
            Some(AABB::from_corners([lat_min, -PI], [lat_max, lng_max - 2.0 * PI])),
        ]
    } else {
        [
            Some(AABB::from_corners([lat_min, lng_min], [lat_max, lng_max])),
            None,
        ]
    }
}
