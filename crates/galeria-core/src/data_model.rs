//! Data Model: FieldSnapshot, ValidationResult, SubmissionPayload, ApplicationRecord
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix under which every draft entry is stored.
pub const DRAFT_PREFIX: &str = "galeria_secreta_form_";

/// Namespaced storage key for a field's draft.
pub fn draft_key(field_name: &str) -> String {
    format!("{DRAFT_PREFIX}{field_name}")
}

/// Input type of a form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Email,
    Tel,
    Number,
    Text,
    Textarea,
    Select,
    File,
    Checkbox,
    Hidden,
}

impl FieldKind {
    /// File and checkbox controls never take part in draft persistence.
    pub fn is_draftable(&self) -> bool {
        !matches!(self, FieldKind::File | FieldKind::Checkbox)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Tel => "tel",
            FieldKind::Number => "number",
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Select => "select",
            FieldKind::File => "file",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Hidden => "hidden",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field type: {0}")]
pub struct UnknownFieldKind(pub String);

impl FromStr for FieldKind {
    type Err = UnknownFieldKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(FieldKind::Email),
            "tel" => Ok(FieldKind::Tel),
            "number" => Ok(FieldKind::Number),
            "text" => Ok(FieldKind::Text),
            "textarea" => Ok(FieldKind::Textarea),
            "select" | "select-one" => Ok(FieldKind::Select),
            "file" => Ok(FieldKind::File),
            "checkbox" => Ok(FieldKind::Checkbox),
            "hidden" => Ok(FieldKind::Hidden),
            other => Err(UnknownFieldKind(other.to_string())),
        }
    }
}

/// Point-in-time view of a single form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub name: String,
    pub kind: FieldKind,
    pub value: String,
    #[serde(default)]
    pub required: bool,
}

impl FieldSnapshot {
    pub fn new(name: impl Into<String>, kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
            required: false,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value with surrounding whitespace removed; this is what rules see.
    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.trimmed().is_empty()
    }
}

/// Verdict for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Binary image attached to the photo control.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoAttachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// Bytes are left out so logs stay readable.
impl fmt::Debug for PhotoAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoAttachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// Everything sent to the submission endpoint for one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    /// Ordered (field name, value) pairs
    pub fields: Vec<(String, String)>,
    /// Photo control name and its attachment
    pub photo: Option<(String, PhotoAttachment)>,
    /// Generated at submit time
    pub timestamp: DateTime<Utc>,
}

impl SubmissionPayload {
    /// Field name under which the timestamp is transmitted.
    pub const TIMESTAMP_FIELD: &'static str = "timestamp";

    /// ISO-8601 with millisecond precision and a `Z` suffix.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Stored application as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: i64,
    /// Remaining stored columns, passed through untouched
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ApplicationRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            fields: serde_json::Map::new(),
        }
    }

    /// Submission time, when the stored column holds a string
    pub fn timestamp(&self) -> Option<&str> {
        self.fields
            .get(SubmissionPayload::TIMESTAMP_FIELD)
            .and_then(serde_json::Value::as_str)
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.fields.insert(
            SubmissionPayload::TIMESTAMP_FIELD.to_string(),
            serde_json::Value::String(timestamp.into()),
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_field_kind_parsing() {
        assert_eq!("email".parse::<FieldKind>().unwrap(), FieldKind::Email);
        assert_eq!("TEL".parse::<FieldKind>().unwrap(), FieldKind::Tel);
        assert_eq!("select-one".parse::<FieldKind>().unwrap(), FieldKind::Select);
        assert!("radio".parse::<FieldKind>().is_err());
    }

    #[test]
    fn test_draftable_kinds() {
        assert!(FieldKind::Text.is_draftable());
        assert!(FieldKind::Textarea.is_draftable());
        assert!(!FieldKind::File.is_draftable());
        assert!(!FieldKind::Checkbox.is_draftable());
    }

    #[test]
    fn test_draft_key_is_namespaced() {
        assert_eq!(draft_key("nome"), "galeria_secreta_form_nome");
    }

    #[test]
    fn test_timestamp_format() {
        let payload = SubmissionPayload {
            fields: vec![("nome".into(), "Ana".into())],
            photo: None,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        };
        assert_eq!(payload.timestamp_iso(), "2024-05-01T12:30:00.000Z");
        assert_eq!(payload.field("nome"), Some("Ana"));
        assert_eq!(payload.field("email"), None);
    }

    #[test]
    fn test_record_flattens_columns() {
        let raw = json!({
            "id": 7,
            "nome": "Ana",
            "idade": 30,
            "timestamp": "2024-05-01T12:30:00.000Z"
        });
        let record: ApplicationRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.fields.get("nome"), Some(&json!("Ana")));
        assert_eq!(record.timestamp(), Some("2024-05-01T12:30:00.000Z"));
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn test_record_keeps_null_and_odd_columns() {
        for raw in [
            json!({ "id": 1, "nome": "Ana", "timestamp": null }),
            json!({ "id": 2, "nome": "Bia", "timestamp": 1714566600, "foto": null }),
        ] {
            let record: ApplicationRecord = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(record.timestamp(), None);
            assert_eq!(serde_json::to_value(&record).unwrap(), raw);
        }
    }

    #[test]
    fn test_unknown_field_kind_message() {
        let err = "radio".parse::<FieldKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown field type: radio");
    }

    #[test]
    fn test_photo_debug_hides_bytes() {
        let photo = PhotoAttachment::new("me.png", "image/png", vec![0u8; 2048]);
        let debug = format!("{photo:?}");
        assert!(debug.contains("size: 2048"));
        assert!(!debug.contains("[0, 0"));
    }
}
