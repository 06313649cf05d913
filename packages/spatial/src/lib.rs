#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spherical geometry and density-based clustering for accident hotspots.
//!
//! Coordinates are latitude/longitude degrees on the Earth's mean sphere.
//! Distances are great-circle (haversine) distances, never Euclidean
//! distances on raw degrees. [`dbscan::Dbscan`] groups points into
//! clusters using an R-tree ([`index::NeighborIndex`]) to prune candidate
//! neighbours.

pub mod dbscan;
pub mod index;

use geo::{Centroid, MultiPoint, Point};

pub use dbscan::{ClusterLabel, ClusterLabels, Dbscan, DbscanError};

/// Mean Earth radius in kilometers.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0088;

/// Converts a ground distance in meters to an angle in radians on the
/// Earth's mean sphere.
#[must_use]
pub fn meters_to_radians(meters: f64) -> f64 {
    (meters / 1000.0) / EARTH_MEAN_RADIUS_KM
}

/// Converts a `(latitude, longitude)` pair in degrees to `[lat, lng]` in
/// radians.
#[must_use]
pub fn to_radians(lat: f64, lng: f64) -> [f64; 2] {
    [lat.to_radians(), lng.to_radians()]
}

/// Central angle in radians between two `[lat, lng]` points given in
/// radians, via the haversine formula.
#[must_use]
pub fn haversine_radians(a: [f64; 2], b: [f64; 2]) -> f64 {
    let [lat1, lng1] = a;
    let [lat2, lng2] = b;
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Great-circle distance in meters between two `(latitude, longitude)`
/// pairs given in degrees.
#[must_use]
pub fn haversine_meters(a: (f64, f64), b: (f64, f64)) -> f64 {
    haversine_radians(to_radians(a.0, a.1), to_radians(b.0, b.1)) * EARTH_MEAN_RADIUS_KM * 1000.0
}

/// Arithmetic mean of `(latitude, longitude)` pairs in degrees.
///
/// The mean need not coincide with any input point. Returns `None` for an
/// empty input.
pub fn mean_center<I>(coordinates: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let points: MultiPoint<f64> = coordinates
        .into_iter()
        .map(|(lat, lng)| Point::new(lng, lat))
        .collect();

    points.centroid().map(|c| (c.y(), c.x()))
}
