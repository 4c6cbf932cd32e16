//! Galeria Core: data model, error taxonomy and clock
//!
//! Shared by the client-side submission pipeline and the admin panel.

pub mod clock;
pub mod data_model;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use data_model::{
    draft_key, ApplicationRecord, FieldKind, FieldSnapshot, PhotoAttachment, Severity,
    SubmissionPayload, ValidationResult, DRAFT_PREFIX,
};
pub use error::GaleriaError;

/// Versão do pipeline de candidaturas
pub const GALERIA_VERSION: &str = "1.0.0";
