use crate::ingest::{AttendanceReport, RosterReport, WriteFailure};
use crate::model::record::PersonRecord;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Ingest API",
        version = "1.0.0",
        description = r#"
## Spreadsheet Attendance Ingest

Accepts attendance-log and employee-roster spreadsheets over multipart upload
and reconciles them into a single MongoDB collection keyed by a 7-digit
identity.

### 🔹 Endpoints
- **POST /upload/roster** — employee rows: identity, name, department
- **POST /upload/attendance** — per-identity blocks of date / check-in / check-out rows

### 📦 Response Format
- JSON report per upload
- `success` is false when some writes failed; the failures are listed individually

---
Built with **Rust**, **Actix Web**, **calamine**, and **MongoDB**.
"#,
    ),
    paths(
        crate::api::upload::upload_roster,
        crate::api::upload::upload_attendance
    ),
    components(schemas(AttendanceReport, RosterReport, WriteFailure, PersonRecord)),
    tags(
        (name = "Upload", description = "Spreadsheet upload & reconciliation APIs"),
    )
)]
pub struct ApiDoc;
