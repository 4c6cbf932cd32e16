//! Headless application form
//!
//! Holds field values, inline errors and the photo slot. Nothing here talks
//! to the network or to draft storage; the controller wires those in.

use chrono::{DateTime, Utc};
use galeria_core::{FieldKind, FieldSnapshot, PhotoAttachment, SubmissionPayload, ValidationResult};
use galeria_rules::{validate_photo, FormReport, Locale, RuleTable};
use std::collections::BTreeMap;
use thiserror::Error;

/// Value a checked checkbox submits
pub const CHECKED: &str = "on";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Value restored by `reset`
    pub default: String,
    pub value: String,
}

impl FormField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: String::new(),
            value: String::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self.value = self.default.clone();
        self
    }

    pub fn is_checked(&self) -> bool {
        self.kind == FieldKind::Checkbox && self.value == CHECKED
    }
}

/// What the photo control currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhotoPreview {
    #[default]
    Placeholder,
    Loaded { file_name: String },
}

#[derive(Debug, Clone)]
pub struct ApplicationForm {
    fields: Vec<FormField>,
    errors: BTreeMap<String, String>,
    photo: Option<PhotoAttachment>,
    preview: PhotoPreview,
}

impl ApplicationForm {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            errors: BTreeMap::new(),
            photo: None,
            preview: PhotoPreview::Placeholder,
        }
    }

    /// The public site's application form
    pub fn standard() -> Self {
        Self::new(vec![
            FormField::new("nome", FieldKind::Text).required(),
            FormField::new("email", FieldKind::Email).required(),
            FormField::new("telefone", FieldKind::Tel).required(),
            FormField::new("idade", FieldKind::Number).required(),
            FormField::new("cidade", FieldKind::Text),
            FormField::new("experiencia", FieldKind::Textarea).required(),
            FormField::new("disponibilidade", FieldKind::Select).required(),
            FormField::new("foto", FieldKind::File),
            FormField::new("termos", FieldKind::Checkbox).required(),
        ])
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = &mut FormField> {
        self.fields.iter_mut()
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut FormField, FormError> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value.as_str())
    }

    /// Typed input; clears the field's inline error
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        let field = self.field_mut(name)?;
        field.value = value.into();
        self.errors.remove(name);
        Ok(())
    }

    /// Tick or untick a checkbox
    pub fn check(&mut self, name: &str, checked: bool) -> Result<(), FormError> {
        let value = if checked { CHECKED } else { "" };
        self.set_value(name, value)
    }

    fn snapshot_of(&self, field: &FormField) -> FieldSnapshot {
        let value = match field.kind {
            FieldKind::File => self
                .photo
                .as_ref()
                .map(|p| p.file_name.clone())
                .unwrap_or_default(),
            _ => field.value.clone(),
        };
        FieldSnapshot {
            name: field.name.clone(),
            kind: field.kind,
            value,
            required: field.required,
        }
    }

    pub fn snapshot(&self, name: &str) -> Option<FieldSnapshot> {
        self.field(name).map(|f| self.snapshot_of(f))
    }

    /// Every field as the validator sees it, in form order
    pub fn snapshots(&self) -> Vec<FieldSnapshot> {
        self.fields.iter().map(|f| self.snapshot_of(f)).collect()
    }

    // === Inline errors ===

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error_for(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn show_error(&mut self, name: &str, message: impl Into<String>) {
        self.errors.insert(name.to_string(), message.into());
    }

    pub fn clear_error(&mut self, name: &str) {
        self.errors.remove(name);
    }

    /// Show every failure in `report` and clear the fields that passed
    pub fn apply_report(&mut self, report: &FormReport) {
        for field in &report.fields {
            match field.result.message() {
                Some(message) if !field.result.valid => {
                    self.errors.insert(field.name.clone(), message.to_string());
                }
                _ => {
                    self.errors.remove(&field.name);
                }
            }
        }
    }

    /// Validate one field as it loses focus
    pub fn blur(&mut self, name: &str, table: &RuleTable) -> Result<ValidationResult, FormError> {
        let snapshot = self
            .snapshot(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let result = table.validate(&snapshot);
        match result.message() {
            Some(message) if !result.valid => self.show_error(name, message),
            _ => self.clear_error(name),
        }
        Ok(result)
    }

    // === Photo ===

    /// Accept `photo` if it passes the photo checks; a rejected file leaves
    /// the slot empty and the placeholder visible
    pub fn attach_photo(&mut self, photo: PhotoAttachment, locale: Locale) -> ValidationResult {
        let result = validate_photo(&photo, locale);
        if result.valid {
            self.preview = PhotoPreview::Loaded {
                file_name: photo.file_name.clone(),
            };
            self.photo = Some(photo);
        } else {
            self.clear_photo();
        }
        result
    }

    pub fn clear_photo(&mut self) {
        self.photo = None;
        self.preview = PhotoPreview::Placeholder;
    }

    pub fn photo(&self) -> Option<&PhotoAttachment> {
        self.photo.as_ref()
    }

    pub fn preview(&self) -> &PhotoPreview {
        &self.preview
    }

    fn photo_field(&self) -> Option<&FormField> {
        self.fields.iter().find(|f| f.kind == FieldKind::File)
    }

    /// Every field back to its default, errors cleared, photo removed
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value = field.default.clone();
        }
        self.errors.clear();
        self.clear_photo();
    }

    /// Build the multipart payload for one attempt
    ///
    /// Unchecked checkboxes are left out, as a browser form would. The photo
    /// travels under the file field's name.
    pub fn payload(&self, timestamp: DateTime<Utc>) -> SubmissionPayload {
        let fields = self
            .fields
            .iter()
            .filter(|f| match f.kind {
                FieldKind::File => false,
                FieldKind::Checkbox => f.is_checked(),
                _ => true,
            })
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();

        let photo = match (self.photo_field(), &self.photo) {
            (Some(field), Some(photo)) => Some((field.name.clone(), photo.clone())),
            _ => None,
        };

        SubmissionPayload {
            fields,
            photo,
            timestamp,
        }
    }
}
