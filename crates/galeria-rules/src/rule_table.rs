//! Ordered rule tables
//!
//! Rules run in table order and the first failure wins, so the presence
//! check sits at the top of every standard table.

use galeria_core::{FieldKind, FieldSnapshot, ValidationResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::messages::Locale;
use crate::rule::{FieldRule, RuleCheck};

/// Youngest accepted applicant
pub const MIN_AGE: i64 = 18;
/// Oldest accepted applicant
pub const MAX_AGE: i64 = 65;
/// Shortest accepted name
pub const MIN_NAME_LEN: usize = 2;
/// Shortest accepted free-text answer
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Field names the age rule binds to
pub const AGE_FIELDS: [&str; 2] = ["idade", "age"];
/// Field names the name rule binds to
pub const NAME_FIELDS: [&str; 2] = ["nome", "name"];

#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("Failed to read rule table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid rule table: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Duplicate rule id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default)]
    rules: Vec<FieldRule>,
}

impl RuleTable {
    /// Empty table; every field is valid
    pub fn new() -> Self {
        Self::default()
    }

    /// The application form's rules
    pub fn standard(locale: Locale) -> Self {
        Self::new()
            .with_rule(
                FieldRule::new("required", RuleCheck::Required, locale.required()).required_only(),
            )
            .with_rule(
                FieldRule::new("email.format", RuleCheck::EmailFormat, locale.invalid_email())
                    .for_kinds([FieldKind::Email]),
            )
            .with_rule(
                FieldRule::new("tel.format", RuleCheck::PhoneFormat, locale.invalid_phone())
                    .for_kinds([FieldKind::Tel]),
            )
            .with_rule(
                FieldRule::new(
                    "age.range",
                    RuleCheck::IntegerRange {
                        min: MIN_AGE,
                        max: MAX_AGE,
                        below: Some(locale.min_age(MIN_AGE)),
                        above: Some(locale.max_age(MAX_AGE)),
                    },
                    locale.invalid_age(),
                )
                .for_kinds([FieldKind::Number])
                .for_names(AGE_FIELDS),
            )
            .with_rule(
                FieldRule::new(
                    "name.min_length",
                    RuleCheck::MinLength { min: MIN_NAME_LEN },
                    locale.name_too_short(MIN_NAME_LEN),
                )
                .for_kinds([FieldKind::Text])
                .for_names(NAME_FIELDS),
            )
            .with_rule(
                FieldRule::new(
                    "textarea.min_length",
                    RuleCheck::MinLength {
                        min: MIN_DESCRIPTION_LEN,
                    },
                    locale.description_too_short(MIN_DESCRIPTION_LEN),
                )
                .for_kinds([FieldKind::Textarea])
                .required_only(),
            )
    }

    /// Parse a table from YAML
    ///
    /// ```
    /// use galeria_rules::RuleTable;
    ///
    /// let table = RuleTable::from_yaml(r#"
    /// rules:
    ///   - id: cidade.min_length
    ///     selector: { names: [cidade] }
    ///     check: { type: min_length, min: 3 }
    ///     message: City name is too short.
    /// "#).unwrap();
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn from_yaml(source: &str) -> Result<Self, RuleTableError> {
        let table: RuleTable = serde_yaml::from_str(source)?;
        table.check_ids()?;
        debug!(rules = table.len(), "Loaded rule table");
        Ok(table)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RuleTableError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    /// Append a rule (builder style)
    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append a rule, rejecting duplicate ids
    pub fn push(&mut self, rule: FieldRule) -> Result<(), RuleTableError> {
        if self.rules.iter().any(|r| r.id == rule.id) {
            return Err(RuleTableError::DuplicateId(rule.id));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Append every rule of `other` after this table's rules
    pub fn extend(&mut self, other: RuleTable) -> Result<(), RuleTableError> {
        for rule in other.rules {
            self.push(rule)?;
        }
        Ok(())
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate one field; the first failing rule decides the message
    pub fn validate(&self, field: &FieldSnapshot) -> ValidationResult {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate(field))
            .map(ValidationResult::invalid)
            .unwrap_or_else(ValidationResult::ok)
    }

    fn check_ids(&self) -> Result<(), RuleTableError> {
        for (i, rule) in self.rules.iter().enumerate() {
            if self.rules[..i].iter().any(|r| r.id == rule.id) {
                return Err(RuleTableError::DuplicateId(rule.id.clone()));
            }
        }
        Ok(())
    }
}
