/// Error types for the ingest pipeline
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Database unreachable when opening the per-upload connection
    #[error("failed to connect to database: {0}")]
    Connection(#[source] mongodb::error::Error),

    /// A find/insert/update against the collection failed
    #[error("database operation failed: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Upload folder or file could not be read
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet could not be decoded
    #[error("failed to decode spreadsheet {path}: {source}")]
    Sheet {
        path: String,
        #[source]
        source: calamine::Error,
    },

    /// Directory scan found no .xls/.xlsx file to process
    #[error("no spreadsheet files found in {0}")]
    NoSpreadsheet(String),

    /// Workbook decoded fine but contains no worksheets
    #[error("spreadsheet has no worksheets: {0}")]
    EmptyWorkbook(String),
}
