//! Galeria Client: the application form's submission pipeline without a UI
//!
//! # Flow
//!
//! ```text
//! on_input ──► ApplicationForm ──► AutoSave (500 ms debounce) ──► DraftStorage
//!     │
//! submit ──► age fast path ──► validate_form ──► fetch_with_retry ──► Transport
//!     │                                              (1 s, 2 s backoff)
//!     └──► watch::Receiver<ControlSnapshot>   NotificationCenter   UiEffect
//! ```
//!
//! Time flows through an injected [`galeria_core::Clock`], so backoff,
//! debouncing and notification lifetimes are deterministic under
//! [`galeria_core::ManualClock`].

pub mod autosave;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod form;
pub mod notifications;
pub mod retry;
pub mod transport;

pub use autosave::{AutoSave, DraftStorage, FileStorage, MemoryStorage, StorageError, DRAFT_DEBOUNCE};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use controller::{
    ButtonLabel, ControlSnapshot, FormContext, Rejection, SubmissionController, SubmissionState,
    SubmitControl, SubmitOutcome, UiEffect,
};
pub use debounce::Debouncer;
pub use form::{ApplicationForm, FormError, FormField, PhotoPreview};
pub use notifications::{Notification, NotificationCenter, AUTO_DISMISS_AFTER, DISMISS_ANIMATION};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use transport::{
    ReqwestTransport, SubmissionRequest, Transport, TransportError, TransportResponse,
};
