//! Whole-form validation
//!
//! Every field is checked even after a failure so all inline errors can be
//! shown at once.

use galeria_core::{FieldSnapshot, ValidationResult};
use serde::{Deserialize, Serialize};

use crate::rule_table::RuleTable;

/// Outcome for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReport {
    pub name: String,
    pub result: ValidationResult,
}

/// Outcome for the whole form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormReport {
    pub valid: bool,
    pub fields: Vec<FieldReport>,
}

impl FormReport {
    /// Failing fields with their messages, in form order
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter(|f| !f.result.valid).map(|f| {
            (
                f.name.as_str(),
                f.result.message().unwrap_or_default(),
            )
        })
    }

    pub fn error_count(&self) -> usize {
        self.fields.iter().filter(|f| !f.result.valid).count()
    }

    pub fn result_for(&self, name: &str) -> Option<&ValidationResult> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.result)
    }
}

/// Validate every field; the form is valid only if all of them are
pub fn validate_form(table: &RuleTable, fields: &[FieldSnapshot]) -> FormReport {
    let fields: Vec<FieldReport> = fields
        .iter()
        .map(|field| FieldReport {
            name: field.name.clone(),
            result: table.validate(field),
        })
        .collect();

    FormReport {
        valid: fields.iter().all(|f| f.result.valid),
        fields,
    }
}
