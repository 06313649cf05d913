//! Time-of-day filtering.

use hotspot_map_accident_models::{AccidentRecord, TimeWindow};

/// Returns the records whose hour falls in `window`, in input order.
///
/// Records without a parseable start time only survive
/// [`TimeWindow::AllDay`]. An empty result is not an error here.
#[must_use]
pub fn filter_by_window(records: &[AccidentRecord], window: TimeWindow) -> Vec<AccidentRecord> {
    records
        .iter()
        .filter(|r| window.matches(r.hour_of_day))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(hour: Option<u8>) -> AccidentRecord {
        AccidentRecord {
            latitude: 25.77,
            longitude: -80.19,
            timestamp: None,
            hour_of_day: hour,
            severity: 2,
            is_major: false,
            street_name: None,
        }
    }

    fn hours(records: &[AccidentRecord]) -> Vec<Option<u8>> {
        records.iter().map(|r| r.hour_of_day).collect()
    }

    #[test]
    fn evening_rush_keeps_only_16_to_19() {
        let records: Vec<_> = [3, 17, 18, 20].into_iter().map(|h| record_at(Some(h))).collect();
        let filtered = filter_by_window(&records, TimeWindow::EveningRush);
        assert_eq!(hours(&filtered), vec![Some(17), Some(18)]);
    }

    #[test]
    fn all_day_is_identity_including_missing_hours() {
        let records = vec![record_at(None), record_at(Some(2)), record_at(Some(12))];
        assert_eq!(filter_by_window(&records, TimeWindow::AllDay), records);
    }

    #[test]
    fn missing_hours_are_excluded_from_named_windows() {
        let records = vec![record_at(None), record_at(Some(7))];
        assert_eq!(
            hours(&filter_by_window(&records, TimeWindow::MorningRush)),
            vec![Some(7)]
        );
        assert!(filter_by_window(&records, TimeWindow::NightOwl).is_empty());
    }

    #[test]
    fn night_owl_keeps_late_and_early_hours() {
        let records: Vec<_> = (0..24).map(|h| record_at(Some(h))).collect();
        let filtered = filter_by_window(&records, TimeWindow::NightOwl);
        assert_eq!(
            hours(&filtered),
            vec![Some(0), Some(1), Some(2), Some(3), Some(4), Some(22), Some(23)]
        );
    }

    #[test]
    fn no_match_returns_empty() {
        let records = vec![record_at(Some(12))];
        assert!(filter_by_window(&records, TimeWindow::MorningRush).is_empty());
        assert!(filter_by_window(&[], TimeWindow::AllDay).is_empty());
    }
}
