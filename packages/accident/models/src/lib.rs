#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident record types and time-of-day window definitions.
//!
//! This crate defines the cleaned [`AccidentRecord`] that every later
//! stage of the hotspot pipeline consumes, along with the [`TimeWindow`]
//! buckets a caller can filter on.

use chrono::{NaiveDateTime, Timelike as _};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity values at or above this level count as major accidents.
pub const MAJOR_SEVERITY_THRESHOLD: i32 = 3;

/// Returns `true` if the given severity value counts as a major accident.
#[must_use]
pub const fn is_major_severity(severity: i32) -> bool {
    severity >= MAJOR_SEVERITY_THRESHOLD
}

/// One observed accident after loading and cleaning.
///
/// Records are created once at load time and never mutated afterwards.
/// Later stages exclude records, they never edit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentRecord {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// When the accident started, if the source timestamp was parseable.
    pub timestamp: Option<NaiveDateTime>,
    /// Hour of day (0-23) derived from [`Self::timestamp`].
    pub hour_of_day: Option<u8>,
    /// Source severity (1-4 on the source's scale).
    pub severity: i32,
    /// Whether `severity >= 3`.
    pub is_major: bool,
    /// Street the accident was reported on. `None` when the cell was empty.
    pub street_name: Option<String>,
}

impl AccidentRecord {
    /// Builds a record, deriving `hour_of_day` and `is_major`.
    ///
    /// Blank street names are stored as `None`.
    #[must_use]
    pub fn new(
        latitude: f64,
        longitude: f64,
        timestamp: Option<NaiveDateTime>,
        severity: i32,
        street_name: Option<&str>,
    ) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let hour_of_day = timestamp.map(|ts| ts.hour() as u8);

        let street_name = street_name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned);

        Self {
            latitude,
            longitude,
            timestamp,
            hour_of_day,
            severity,
            is_major: is_major_severity(severity),
            street_name,
        }
    }

    /// Returns the `(latitude, longitude)` pair in degrees.
    #[must_use]
    pub const fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Named time-of-day buckets a caller can filter accidents by.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum TimeWindow {
    /// No filtering.
    #[default]
    AllDay,
    /// 6 AM through 9 AM inclusive.
    MorningRush,
    /// 4 PM through 7 PM inclusive.
    EveningRush,
    /// 10 PM through 4 AM inclusive, wrapping midnight.
    NightOwl,
}

impl TimeWindow {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AllDay,
            Self::MorningRush,
            Self::EveningRush,
            Self::NightOwl,
        ]
    }

    /// Human-readable label including the hour range.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AllDay => "All Day",
            Self::MorningRush => "Morning Rush (6-9 AM)",
            Self::EveningRush => "Evening Rush (4-7 PM)",
            Self::NightOwl => "Night Owl (10 PM - 4 AM)",
        }
    }

    /// Returns `true` if an accident at `hour` falls in this window.
    ///
    /// A missing hour only matches [`Self::AllDay`].
    #[must_use]
    #[allow(clippy::manual_range_contains)]
    pub const fn matches(self, hour: Option<u8>) -> bool {
        match (self, hour) {
            (Self::AllDay, _) => true,
            (_, None) => false,
            (Self::MorningRush, Some(h)) => h >= 6 && h <= 9,
            (Self::EveningRush, Some(h)) => h >= 16 && h <= 19,
            (Self::NightOwl, Some(h)) => h >= 22 || h <= 4,
        }
    }
}
