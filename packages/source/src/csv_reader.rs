//! CSV accident table reader.
//!
//! Parses a delimited file (optionally gzip-compressed) whose header row
//! names the required accident columns, and turns every row into an
//! [`AccidentRecord`] or counts it as dropped.

use std::io::Read;
use std::sync::Arc;

use hotspot_map_accident_models::AccidentRecord;

use crate::parsing::{parse_lat_lng, parse_severity, parse_start_time};
use crate::progress::ProgressCallback;
use crate::{LoadReport, SourceError};

/// Latitude column header.
pub const COLUMN_LATITUDE: &str = "Start_Lat";
/// Longitude column header.
pub const COLUMN_LONGITUDE: &str = "Start_Lng";
/// Start time column header.
pub const COLUMN_START_TIME: &str = "Start_Time";
/// Severity column header.
pub const COLUMN_SEVERITY: &str = "Severity";
/// Street name column header.
pub const COLUMN_STREET: &str = "Street";

/// How many rows are parsed between progress updates.
const PROGRESS_BATCH: u64 = 1_000;

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndexes {
    latitude: usize,
    longitude: usize,
    start_time: usize,
    severity: usize,
    street: usize,
}

impl ColumnIndexes {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, SourceError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| SourceError::MissingColumn {
                    column: name.to_owned(),
                })
        };

        Ok(Self {
            latitude: find(COLUMN_LATITUDE)?,
            longitude: find(COLUMN_LONGITUDE)?,
            start_time: find(COLUMN_START_TIME)?,
            severity: find(COLUMN_SEVERITY)?,
            street: find(COLUMN_STREET)?,
        })
    }
}

/// Reader for accident CSV data.
#[derive(Debug, Clone)]
pub struct AccidentCsvReader {
    /// Field delimiter byte (defaults to `,`).
    delimiter: u8,
    /// Whether the input is gzip-compressed.
    is_gzipped: bool,
}

impl Default for AccidentCsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl AccidentCsvReader {
    /// Creates a comma-delimited, uncompressed reader.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: b',',
            is_gzipped: false,
        }
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV files).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Marks the input as gzip-compressed.
    #[must_use]
    pub const fn with_gzip(mut self, gzipped: bool) -> Self {
        self.is_gzipped = gzipped;
        self
    }

    /// Reads every row from `input`.
    ///
    /// Rows with unusable coordinates are dropped and counted; rows with an
    /// unparseable start time are kept without an hour.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the data is not a readable table or a
    /// required column is missing.
    pub fn read<R: Read>(
        &self,
        input: R,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<(Vec<AccidentRecord>, LoadReport), SourceError> {
        if self.is_gzipped {
            self.read_table(flate2::read::GzDecoder::new(input), progress)
        } else {
            self.read_table(input, progress)
        }
    }

    fn read_table<R: Read>(
        &self,
        input: R,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<(Vec<AccidentRecord>, LoadReport), SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(input);

        let columns = ColumnIndexes::resolve(reader.headers()?)?;

        let mut records = Vec::new();
        let mut report = LoadReport::default();

        for result in reader.records() {
            let row = result?;
            report.rows_read += 1;

            let field = |i: usize| row.get(i).unwrap_or("");

            let Some((latitude, longitude)) =
                parse_lat_lng(field(columns.latitude), field(columns.longitude))
            else {
                report.rows_dropped += 1;
                continue;
            };

            let timestamp = parse_start_time(field(columns.start_time));
            if timestamp.is_none() {
                report.timestamps_unparsed += 1;
            }

            records.push(AccidentRecord::new(
                latitude,
                longitude,
                timestamp,
                parse_severity(field(columns.severity)),
                row.get(columns.street),
            ));

            if report.rows_read % PROGRESS_BATCH == 0 {
                progress.inc(PROGRESS_BATCH);
            }
        }

        progress.inc(report.rows_read % PROGRESS_BATCH);

        log::debug!(
            "Parsed {} rows ({} dropped, {} without a usable start time)",
            report.rows_read,
            report.rows_dropped,
            report.timestamps_unparsed
        );

        Ok((records, report))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use crate::progress::null_progress;

    const HEADER: &str = "ID,Severity,Start_Time,Start_Lat,Start_Lng,Street,City\n";

    fn read(csv: &str) -> Result<(Vec<AccidentRecord>, LoadReport), SourceError> {
        AccidentCsvReader::new().read(csv.as_bytes(), &null_progress())
    }

    #[test]
    fn drops_rows_with_non_numeric_latitude() {
        let csv = format!(
            "{HEADER}\
             A-1,2,2016-02-08 05:46:00,25.77,-80.19,I-95 N,Miami\n\
             A-2,3,2016-02-08 06:07:59,25.78,-80.20,SW 8th St,Miami\n\
             A-3,4,2016-02-08 06:49:27,25.79,-80.21,Biscayne Blvd,Miami\n\
             A-4,2,2016-02-08 07:23:34,not-a-lat,-80.22,NW 7th Ave,Miami\n"
        );

        let (records, report) = read(&csv).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_dropped, 1);
        assert_eq!(report.timestamps_unparsed, 0);
    }

    #[test]
    fn keeps_rows_with_bad_time_without_hour() {
        let csv = format!(
            "{HEADER}\
             A-1,3,garbage,25.77,-80.19,I-95 N,Miami\n"
        );

        let (records, report) = read(&csv).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, None);
        assert_eq!(records[0].hour_of_day, None);
        assert!(records[0].is_major);
        assert_eq!(report.timestamps_unparsed, 1);
    }

    #[test]
    fn tolerates_short_rows_and_blank_streets() {
        let csv = format!(
            "{HEADER}\
             A-1,1,2016-02-08 23:00:00,25.77,-80.19,,Miami\n\
             A-2,1,2016-02-08 23:00:00,25.77,-80.19\n"
        );

        let (records, _) = read(&csv).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.street_name.is_none()));
        assert!(records.iter().all(|r| r.hour_of_day == Some(23)));
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "Start_Lat,Start_Lng,Severity,Street\n25.0,-80.0,2,Main St\n";
        let err = read(csv).unwrap_err();
        assert!(matches!(
            err,
            SourceError::MissingColumn { ref column } if column == COLUMN_START_TIME
        ));
    }

    #[test]
    fn trims_header_names() {
        let csv = " Start_Lat , Start_Lng ,Start_Time,Severity,Street\n25.0,-80.0,,2,Main St\n";
        let (records, _) = read(csv).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn reads_tab_delimited_input() {
        let tsv = "Start_Lat\tStart_Lng\tStart_Time\tSeverity\tStreet\n\
                   25.0\t-80.0\t2020-01-01 08:00:00\t3\tMain St\n";
        let (records, _) = AccidentCsvReader::new()
            .with_delimiter(b'\t')
            .read(tsv.as_bytes(), &null_progress())
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hour_of_day, Some(8));
    }

    #[test]
    fn reads_gzipped_input() {
        let csv = format!("{HEADER}A-1,4,2016-02-08 05:46:00,25.77,-80.19,I-95 N,Miami\n");
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(csv.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let (records, _) = AccidentCsvReader::new()
            .with_gzip(true)
            .read(compressed.as_slice(), &null_progress())
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, 4);
    }
}
