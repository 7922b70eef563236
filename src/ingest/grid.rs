use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use super::error::IngestError;

/// One spreadsheet row. `None` marks an absent cell, which is distinct from a
/// present-but-empty `Some("")`.
pub type Row = Vec<Option<String>>;

/// Decodes the first worksheet of an .xls/.xlsx file into rows of cell strings.
///
/// No structural validation happens here; malformed sheets simply come back as
/// short or empty rows.
pub fn read_first_sheet(path: &Path) -> Result<Vec<Row>, IngestError> {
    let sheet_err = |source| IngestError::Sheet {
        path: path.display().to_string(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(sheet_err)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::EmptyWorkbook(path.display().to_string()))?;
    let range = workbook.worksheet_range(&sheet_name).map_err(sheet_err)?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect())
}

/// Cell at `idx`, or `None` when the row is short or the cell absent.
pub fn cell(row: &Row, idx: usize) -> Option<&str> {
    row.get(idx).and_then(|cell| cell.as_deref())
}

fn cell_value(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cells_map_to_absent() {
        assert_eq!(cell_value(&Data::Empty), None);
    }

    #[test]
    fn empty_string_cell_stays_present() {
        assert_eq!(cell_value(&Data::String(String::new())), Some(String::new()));
    }

    #[test]
    fn numeric_cells_become_strings() {
        assert_eq!(cell_value(&Data::Float(1234567.0)), Some("1234567".to_string()));
        assert_eq!(cell_value(&Data::Int(42)), Some("42".to_string()));
    }

    #[test]
    fn cell_lookup_handles_short_rows() {
        let row: Row = vec![Some("1234567".into()), None];
        assert_eq!(cell(&row, 0), Some("1234567"));
        assert_eq!(cell(&row, 1), None);
        assert_eq!(cell(&row, 5), None);
    }
}
