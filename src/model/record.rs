use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The single-collection document: one per identity, carrying the union of
/// the roster profile fields and the attendance arrays. Profile fields stay
/// absent until a roster upload mentions the identity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonRecord {
    #[schema(example = "1234567")]
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Engineering")]
    pub department: Option<String>,

    /// Assigned once when the identity is first seen in a roster; never
    /// regenerated or overwritten afterwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Parallel to `timeIn`/`timeOut`; index i is one day's attendance.
    #[serde(default)]
    #[schema(example = json!(["2024-01-01", "2024-01-02"]))]
    pub dates: Vec<String>,

    #[serde(default, rename = "timeIn")]
    #[schema(example = json!(["08:00", "08:30"]))]
    pub time_in: Vec<String>,

    #[serde(default, rename = "timeOut")]
    #[schema(example = json!(["17:00", "17:30"]))]
    pub time_out: Vec<String>,
}

impl PersonRecord {
    pub fn attendance(
        id: String,
        dates: Vec<String>,
        time_in: Vec<String>,
        time_out: Vec<String>,
    ) -> Self {
        Self {
            id,
            name: None,
            department: None,
            password: None,
            dates,
            time_in,
            time_out,
        }
    }

    pub fn roster(id: String, name: String, department: String, password: String) -> Self {
        Self {
            id,
            name: Some(name),
            department: Some(department),
            password: Some(password),
            dates: Vec::new(),
            time_in: Vec::new(),
            time_out: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_record_omits_profile_fields() {
        let record = PersonRecord::attendance(
            "1234567".into(),
            vec!["2024-01-01".into()],
            vec!["08:00".into()],
            vec!["17:00".into()],
        );

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("name").is_none());
        assert!(value.get("department").is_none());
        assert!(value.get("password").is_none());
        assert_eq!(value["timeIn"][0], "08:00");
        assert_eq!(value["timeOut"][0], "17:00");
    }

    #[test]
    fn partial_document_deserializes_with_defaults() {
        let record: PersonRecord = serde_json::from_str(r#"{"id":"7654321"}"#).unwrap();

        assert_eq!(record.id, "7654321");
        assert!(record.name.is_none());
        assert!(record.password.is_none());
        assert!(record.dates.is_empty());
        assert!(record.time_in.is_empty());
        assert!(record.time_out.is_empty());
    }
}
