//! Galeria Rules: field validation for the application form
//!
//! Validation is a declarative table of rules. Each rule selects fields by
//! kind and/or name, runs one check on the trimmed value and carries the
//! message shown next to the field when the check fails.
//!
//! # Flow
//!
//! ```text
//! FieldSnapshot → RuleTable (first failing rule wins) → ValidationResult
//! [FieldSnapshot] → validate_form (no short-circuit)   → FormReport
//! ```
//!
//! # Example
//!
//! ```
//! use galeria_core::{FieldKind, FieldSnapshot};
//! use galeria_rules::{validate_form, Locale, RuleTable};
//!
//! let table = RuleTable::standard(Locale::En);
//!
//! let age = FieldSnapshot::new("idade", FieldKind::Number, "17").required();
//! let result = table.validate(&age);
//! assert!(!result.valid);
//! assert_eq!(result.message(), Some("Minimum age is 18."));
//!
//! let report = validate_form(&table, &[
//!     FieldSnapshot::new("nome", FieldKind::Text, "").required(),
//!     FieldSnapshot::new("email", FieldKind::Email, "not-an-email"),
//! ]);
//! assert_eq!(report.error_count(), 2);
//! ```

pub mod messages;
pub mod patterns;
pub mod photo;
pub mod report;
pub mod rule;
pub mod rule_table;

pub use messages::Locale;
pub use photo::{validate_photo, MAX_PHOTO_BYTES, MAX_PHOTO_MB};
pub use report::{validate_form, FieldReport, FormReport};
pub use rule::{FieldRule, FieldSelector, RuleCheck};
pub use rule_table::{RuleTable, RuleTableError, MAX_AGE, MIN_AGE};

use galeria_core::{FieldSnapshot, ValidationResult};
use lazy_static::lazy_static;

lazy_static! {
    static ref STANDARD_EN: RuleTable = RuleTable::standard(Locale::En);
}

/// Validate one field against the standard English table
pub fn validate(field: &FieldSnapshot) -> ValidationResult {
    STANDARD_EN.validate(field)
}
