use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::ingest::error::IngestError;

const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

/// Picks the most recently modified spreadsheet in `folder`. Used as the
/// fallback when an attendance run is triggered without an explicit file.
pub fn newest_spreadsheet(folder: &Path) -> Result<PathBuf, IngestError> {
    let read_err = |source| IngestError::FileRead {
        path: folder.display().to_string(),
        source,
    };

    let mut newest: Option<(PathBuf, SystemTime)> = None;

    for entry in fs::read_dir(folder).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();

        let is_spreadsheet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext));
        if !is_spreadsheet {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .map_err(read_err)?;
        if newest.as_ref().is_none_or(|(_, best)| modified > *best) {
            newest = Some((path, modified));
        }
    }

    newest
        .map(|(path, _)| path)
        .ok_or_else(|| IngestError::NoSpreadsheet(folder.display().to_string()))
}
