use std::path::Path;

use futures::stream::{self, StreamExt};
use mongodb::Collection;
use mongodb::bson::{Document, doc};
use tracing::{debug, error, info};

use super::error::IngestError;
use super::grid::{self, Row};
use super::{RosterReport, WriteFailure, is_identity};
use crate::model::record::PersonRecord;
use crate::utils::password;

/// One employee row from a roster sheet.
#[derive(Debug, PartialEq)]
pub struct RosterRow {
    pub id: String,
    pub name: String,
    pub department: String,
}

enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Reconciles a roster sheet into the collection. Upserts for distinct
/// identities run concurrently through a bounded task group; every outcome is
/// awaited and per-identity failures end up in the report.
pub async fn run(
    coll: &Collection<PersonRecord>,
    path: &Path,
    max_concurrent: usize,
) -> Result<RosterReport, IngestError> {
    info!(path = %path.display(), "processing roster sheet");

    let rows = grid::read_first_sheet(path)?;
    let people = parse_rows(&rows);
    info!(rows = people.len(), "roster rows matched the identity pattern");

    let outcomes: Vec<_> = stream::iter(people.into_iter().map(|person| {
        let coll = coll.clone();
        async move {
            let id = person.id.clone();
            match upsert_person(&coll, &person).await {
                Ok(outcome) => Ok(outcome),
                Err(e) => Err((id, e)),
            }
        }
    }))
    .buffer_unordered(max_concurrent)
    .collect()
    .await;

    let mut report = RosterReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(UpsertOutcome::Inserted) => report.inserted += 1,
            Ok(UpsertOutcome::Updated) => report.updated += 1,
            Err((id, e)) => {
                error!(%id, error = %e, "roster upsert failed");
                report.failures.push(WriteFailure {
                    id,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Rows whose first cell is a 7-digit identity; everything else is skipped
/// silently. Cells are read by original column position, so an absent cell
/// does not shift the meaning of later columns.
pub fn parse_rows(rows: &[Row]) -> Vec<RosterRow> {
    rows.iter()
        .filter_map(|row| {
            let id = grid::cell(row, 0)?;
            if !is_identity(id) {
                return None;
            }
            Some(RosterRow {
                id: id.to_owned(),
                name: profile_cell(row, 1),
                department: profile_cell(row, 2),
            })
        })
        .collect()
}

fn profile_cell(row: &Row, idx: usize) -> String {
    grid::cell(row, idx).map(str::to_owned).unwrap_or_default()
}

/// Inserts a new document for an unseen identity, or `$set`s only the
/// non-empty fields on an existing one. The password is assigned once at
/// insert and never written on the update path.
async fn upsert_person(
    coll: &Collection<PersonRecord>,
    person: &RosterRow,
) -> Result<UpsertOutcome, IngestError> {
    let filter = doc! { "id": &person.id };
    let existing = coll.find_one(filter.clone()).await?;

    let password = match existing.as_ref().and_then(|record| record.password.clone()) {
        Some(stored) => stored,
        None => password::generate(),
    };

    match existing {
        None => {
            let record = PersonRecord::roster(
                person.id.clone(),
                person.name.clone(),
                person.department.clone(),
                password,
            );
            coll.insert_one(&record).await?;
            info!(id = %person.id, "roster record inserted");
            Ok(UpsertOutcome::Inserted)
        }
        Some(_) => {
            let fields = profile_updates(&person.name, &person.department);
            if !fields.is_empty() {
                coll.update_one(filter, doc! { "$set": fields }).await?;
            }
            debug!(id = %person.id, "roster record updated");
            Ok(UpsertOutcome::Updated)
        }
    }
}

/// Only non-empty fields make it into the update; password never does.
fn profile_updates(name: &str, department: &str) -> Document {
    let mut fields = Document::new();
    if !name.is_empty() {
        fields.insert("name", name);
    }
    if !department.is_empty() {
        fields.insert("department", department);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(cells: &[&str]) -> Row {
        cells.iter().map(|cell| Some((*cell).to_string())).collect()
    }

    #[test]
    fn rows_without_a_seven_digit_identity_are_excluded() {
        let rows = vec![
            r(&["ABC1234", "Not", "Included"]),
            r(&["7654321", "Jane Doe", "Engineering"]),
            vec![],
            r(&["employee id", "name", "department"]),
        ];

        let parsed = parse_rows(&rows);
        assert_eq!(
            parsed,
            [RosterRow {
                id: "7654321".into(),
                name: "Jane Doe".into(),
                department: "Engineering".into(),
            }]
        );
    }

    #[test]
    fn missing_cells_default_to_empty_strings() {
        let rows = vec![r(&["7654321"])];

        let parsed = parse_rows(&rows);
        assert_eq!(parsed[0].name, "");
        assert_eq!(parsed[0].department, "");
    }

    #[test]
    fn absent_cells_do_not_shift_later_columns() {
        let rows: Vec<Row> = vec![vec![
            Some("7654321".into()),
            None,
            Some("Engineering".into()),
        ]];

        let parsed = parse_rows(&rows);
        assert_eq!(parsed[0].name, "");
        assert_eq!(parsed[0].department, "Engineering");
    }

    #[test]
    fn update_document_skips_empty_fields() {
        let fields = profile_updates("Jane Doe", "");
        assert_eq!(fields.get_str("name").unwrap(), "Jane Doe");
        assert!(!fields.contains_key("department"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn update_document_is_empty_when_nothing_changes() {
        assert!(profile_updates("", "").is_empty());
    }
}
