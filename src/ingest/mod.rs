use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

pub mod attendance;
pub mod error;
pub mod grid;
pub mod roster;

static IDENTITY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{7}$").expect("identity pattern is valid"));

/// A person is keyed by a seven-digit numeric string in both sheet kinds.
pub fn is_identity(cell: &str) -> bool {
    IDENTITY_PATTERN.is_match(cell)
}

/// One write that failed while the rest of the upload carried on.
#[derive(Debug, Serialize, ToSchema)]
pub struct WriteFailure {
    #[schema(example = "1234567")]
    pub id: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct AttendanceReport {
    /// Identities whose attendance was replaced from the sheet
    #[schema(example = 12)]
    pub processed: usize,
    /// Known identities absent from the sheet whose arrays were zeroed
    #[schema(example = 3)]
    pub cleared: usize,
    pub failures: Vec<WriteFailure>,
}

impl AttendanceReport {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct RosterReport {
    #[schema(example = 10)]
    pub inserted: usize,
    #[schema(example = 5)]
    pub updated: usize,
    pub failures: Vec<WriteFailure>,
}

impl RosterReport {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}
