//! Individual field rules
//!
//! A rule pairs a selector (which fields it covers) with a check (what the
//! value must satisfy) and the message shown when the check fails.

use galeria_core::{FieldKind, FieldSnapshot};
use serde::{Deserialize, Serialize};

use crate::patterns;

/// A single validation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Unique identifier for the rule
    pub id: String,

    /// Which fields the rule applies to
    #[serde(default)]
    pub selector: FieldSelector,

    /// What the value must satisfy
    pub check: RuleCheck,

    /// Message shown next to the field when the check fails
    pub message: String,

    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl FieldRule {
    /// Create a new rule
    pub fn new(id: impl Into<String>, check: RuleCheck, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            selector: FieldSelector::default(),
            check,
            message: message.into(),
            enabled: true,
        }
    }

    /// Restrict to fields of these kinds
    pub fn for_kinds(mut self, kinds: impl IntoIterator<Item = FieldKind>) -> Self {
        self.selector.kinds.extend(kinds);
        self
    }

    /// Restrict to fields with one of these names
    pub fn for_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.selector.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Only apply to fields marked required
    pub fn required_only(mut self) -> Self {
        self.selector.required_only = true;
        self
    }

    /// Disable the rule
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn applies_to(&self, field: &FieldSnapshot) -> bool {
        self.enabled && self.selector.matches(field)
    }

    /// Evaluate the rule; `Some(message)` when the field violates it
    pub fn evaluate(&self, field: &FieldSnapshot) -> Option<String> {
        if !self.applies_to(field) {
            return None;
        }

        let value = field.trimmed();

        // Only the presence check looks at empty values.
        if value.is_empty() {
            return match self.check {
                RuleCheck::Required => Some(self.message.clone()),
                _ => None,
            };
        }

        match &self.check {
            RuleCheck::Required => None,
            RuleCheck::EmailFormat => (!patterns::is_email(value)).then(|| self.message.clone()),
            RuleCheck::PhoneFormat => (!patterns::is_phone(value)).then(|| self.message.clone()),
            RuleCheck::IntegerRange {
                min,
                max,
                below,
                above,
            } => match patterns::leading_integer(value) {
                None => Some(self.message.clone()),
                Some(n) if n < *min => Some(below.clone().unwrap_or_else(|| self.message.clone())),
                Some(n) if n > *max => Some(above.clone().unwrap_or_else(|| self.message.clone())),
                Some(_) => None,
            },
            RuleCheck::MinLength { min } => {
                (value.chars().count() < *min).then(|| self.message.clone())
            }
        }
    }
}

/// Which fields a rule covers. Empty lists match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    #[serde(default)]
    pub kinds: Vec<FieldKind>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub required_only: bool,
}

impl FieldSelector {
    pub fn matches(&self, field: &FieldSnapshot) -> bool {
        if self.required_only && !field.required {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&field.kind) {
            return false;
        }
        self.names.is_empty() || self.names.iter().any(|n| n == &field.name)
    }
}

/// A check a field value must pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCheck {
    /// Value must not be empty
    Required,
    /// `local@domain.tld`
    EmailFormat,
    /// Phone-like: optional `+`, digits, spaces, hyphens, parentheses, 9+ chars
    PhoneFormat,
    /// Integer within `[min, max]`; unparseable values fail with the rule message
    IntegerRange {
        min: i64,
        max: i64,
        /// Message when below `min`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        below: Option<String>,
        /// Message when above `max`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        above: Option<String>,
    },
    /// At least `min` characters
    MinLength { min: usize },
}
