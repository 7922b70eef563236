use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use futures_util::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Document, doc};
use tracing::{debug, error, info};

use super::error::IngestError;
use super::grid::{self, Row};
use super::{AttendanceReport, WriteFailure, is_identity};
use crate::model::record::PersonRecord;
use crate::utils::files;

/// Parallel per-day sequences for one identity block. Index i across the three
/// vectors describes one day's attendance.
#[derive(Debug, PartialEq)]
pub struct AttendanceEntry {
    pub id: String,
    pub dates: Vec<String>,
    pub time_in: Vec<String>,
    pub time_out: Vec<String>,
}

/// Reconciles an attendance sheet into the collection.
///
/// An explicit path is honored when given; otherwise the most recently
/// modified spreadsheet in `folder` is picked up. Per-identity write failures
/// are collected into the report instead of aborting the run; only connection,
/// file and sheet errors are fatal.
pub async fn run(
    coll: &Collection<PersonRecord>,
    folder: &Path,
    explicit: Option<&Path>,
    max_concurrent: usize,
) -> Result<AttendanceReport, IngestError> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => files::newest_spreadsheet(folder)?,
    };
    info!(path = %path.display(), "processing attendance sheet");

    let rows = grid::read_first_sheet(&path)?;
    let entries = extract_blocks(&rows);
    info!(blocks = entries.len(), "attendance blocks extracted");

    let snapshot = known_ids(coll).await?;
    let mut report = AttendanceReport::default();

    for entry in &entries {
        match replace_attendance(coll, entry).await {
            Ok(()) => report.processed += 1,
            Err(e) => {
                error!(id = %entry.id, error = %e, "attendance upsert failed");
                report.failures.push(WriteFailure {
                    id: entry.id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let outcomes: Vec<_> = stream::iter(stale_identities(snapshot, &entries).into_iter().map(|id| {
        let coll = coll.clone();
        async move {
            match zero_attendance(&coll, &id).await {
                Ok(()) => Ok(id),
                Err(e) => Err((id, e)),
            }
        }
    }))
    .buffer_unordered(max_concurrent)
    .collect()
    .await;

    for outcome in outcomes {
        match outcome {
            Ok(id) => {
                info!(%id, "attendance zeroed for identity absent from sheet");
                report.cleared += 1;
            }
            Err((id, e)) => {
                error!(%id, error = %e, "failed to zero stale attendance");
                report.failures.push(WriteFailure {
                    id,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Scans rows for identity markers and parses the block below each one.
///
/// The scan resumes right after a marker row rather than skipping the rows its
/// block consumed, so a day cell that also matches the identity pattern starts
/// a block of its own.
pub fn extract_blocks(rows: &[Row]) -> Vec<AttendanceEntry> {
    let mut entries = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let Some(id) = grid::cell(row, 0) else {
            continue;
        };
        if !is_identity(id) {
            continue;
        }

        // row index+1 is the header separator; day rows start two below the marker
        let mut dates = Vec::new();
        let mut time_in = Vec::new();
        let mut time_out = Vec::new();
        let mut day_index = index + 2;

        while let Some(day) = rows.get(day_index) {
            let Some(date) = grid::cell(day, 0).filter(|date| !date.is_empty()) else {
                break;
            };
            dates.push(date.to_owned());
            time_in.push(check_cell(day, 2));
            time_out.push(check_cell(day, 3));
            day_index += 1;
        }

        entries.push(AttendanceEntry {
            id: id.to_owned(),
            dates,
            time_in,
            time_out,
        });
    }

    entries
}

fn check_cell(row: &Row, idx: usize) -> String {
    grid::cell(row, idx)
        .map(str::to_owned)
        .unwrap_or_else(|| "0".to_string())
}

/// Known identities that did not appear in this sheet. Their attendance gets
/// zeroed, never deleted.
fn stale_identities(snapshot: Vec<String>, entries: &[AttendanceEntry]) -> Vec<String> {
    snapshot
        .into_iter()
        .filter(|known| entries.iter().all(|entry| entry.id != *known))
        .collect()
}

async fn known_ids(coll: &Collection<PersonRecord>) -> Result<Vec<String>, IngestError> {
    let mut cursor = coll.find(doc! {}).projection(doc! { "id": 1 }).await?;
    let mut ids = Vec::new();
    while let Some(record) = cursor.try_next().await? {
        ids.push(record.id);
    }
    Ok(ids)
}

/// Replaces the three sequences for one identity. Existing documents go
/// through a two-step clear-then-append, so an observer can see a transient
/// empty state between the two updates.
async fn replace_attendance(
    coll: &Collection<PersonRecord>,
    entry: &AttendanceEntry,
) -> Result<(), IngestError> {
    let filter = doc! { "id": &entry.id };

    if coll.find_one(filter.clone()).await?.is_some() {
        coll.update_one(filter.clone(), zeroed_arrays()).await?;
        coll.update_one(
            filter,
            doc! { "$push": {
                "dates": { "$each": entry.dates.clone() },
                "timeIn": { "$each": entry.time_in.clone() },
                "timeOut": { "$each": entry.time_out.clone() },
            }},
        )
        .await?;
        debug!(id = %entry.id, days = entry.dates.len(), "attendance replaced");
    } else {
        let record = PersonRecord::attendance(
            entry.id.clone(),
            entry.dates.clone(),
            entry.time_in.clone(),
            entry.time_out.clone(),
        );
        coll.insert_one(&record).await?;
        debug!(id = %entry.id, days = entry.dates.len(), "attendance inserted");
    }

    Ok(())
}

async fn zero_attendance(coll: &Collection<PersonRecord>, id: &str) -> Result<(), IngestError> {
    coll.update_one(doc! { "id": id }, zeroed_arrays()).await?;
    Ok(())
}

fn zeroed_arrays() -> Document {
    doc! { "$set": { "dates": [], "timeIn": [], "timeOut": [] } }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(cells: &[&str]) -> Row {
        cells.iter().map(|cell| Some((*cell).to_string())).collect()
    }

    #[test]
    fn parses_day_rows_two_below_the_marker() {
        let rows = vec![
            r(&["1234567"]),
            r(&["header"]),
            r(&["2024-01-01", "", "08:00", "17:00"]),
            r(&["2024-01-02", "", "08:30", "17:30"]),
            r(&[""]),
        ];

        let entries = extract_blocks(&rows);
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.id, "1234567");
        assert_eq!(entry.dates, ["2024-01-01", "2024-01-02"]);
        assert_eq!(entry.time_in, ["08:00", "08:30"]);
        assert_eq!(entry.time_out, ["17:00", "17:30"]);
    }

    #[test]
    fn missing_check_cells_become_literal_zero() {
        let rows = vec![
            r(&["1234567"]),
            r(&["header"]),
            r(&["2024-01-01"]),
            r(&["2024-01-02", "", "08:15"]),
        ];

        let entries = extract_blocks(&rows);
        assert_eq!(entries[0].time_in, ["0", "08:15"]);
        assert_eq!(entries[0].time_out, ["0", "0"]);
    }

    #[test]
    fn empty_leading_cell_terminates_the_block() {
        let rows = vec![
            r(&["1234567"]),
            r(&["header"]),
            r(&["2024-01-01", "", "08:00", "17:00"]),
            r(&[""]),
            r(&["2024-02-01", "", "09:00", "18:00"]),
        ];

        let entries = extract_blocks(&rows);
        assert_eq!(entries[0].dates, ["2024-01-01"]);
    }

    #[test]
    fn absent_row_terminates_the_block() {
        let rows = vec![
            r(&["1234567"]),
            r(&["header"]),
            r(&["2024-01-01", "", "08:00", "17:00"]),
        ];

        let entries = extract_blocks(&rows);
        assert_eq!(entries[0].dates, ["2024-01-01"]);
    }

    #[test]
    fn marker_without_day_rows_yields_an_empty_block() {
        let rows = vec![r(&["7654321"])];

        let entries = extract_blocks(&rows);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "7654321");
        assert!(entries[0].dates.is_empty());
        assert!(entries[0].time_in.is_empty());
        assert!(entries[0].time_out.is_empty());
    }

    #[test]
    fn day_cells_matching_the_identity_pattern_start_their_own_block() {
        let rows = vec![
            r(&["1234567"]),
            r(&["header"]),
            r(&["7654321", "", "08:00", "17:00"]),
        ];

        let entries = extract_blocks(&rows);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "1234567");
        assert_eq!(entries[0].dates, ["7654321"]);
        assert_eq!(entries[1].id, "7654321");
        assert!(entries[1].dates.is_empty());
    }

    #[test]
    fn non_identity_rows_do_not_start_blocks() {
        let rows = vec![r(&["ABC1234"]), r(&["header"]), r(&["2024-01-01"])];

        assert!(extract_blocks(&rows).is_empty());
    }

    #[test]
    fn stale_identities_are_those_missing_from_the_sheet() {
        let entries = vec![AttendanceEntry {
            id: "1234567".into(),
            dates: vec![],
            time_in: vec![],
            time_out: vec![],
        }];
        let snapshot = vec!["1111111".into(), "1234567".into(), "2222222".into()];

        assert_eq!(stale_identities(snapshot, &entries), ["1111111", "2222222"]);
    }
}
