//! Submission controller
//!
//! Drives one form through `Idle → Validating → Submitting → Succeeded |
//! Failed → Idle`. The current state and the submit control are published on
//! a `watch` channel; a UI subscribes and renders whatever it receives.
//!
//! Only one attempt can be in flight: `submit` claims the `Idle` state
//! atomically and every other call made meanwhile returns
//! [`SubmitOutcome::Busy`]. Whatever happens during the attempt, the control
//! is re-enabled and the state returns to `Idle`.

use galeria_core::{Clock, GaleriaError, PhotoAttachment, Severity, ValidationResult};
use galeria_rules::patterns::leading_integer;
use galeria_rules::rule_table::AGE_FIELDS;
use galeria_rules::{validate_form, FormReport, Locale, RuleTable, MAX_AGE, MIN_AGE};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::autosave::AutoSave;
use crate::config::ClientConfig;
use crate::form::{ApplicationForm, FormError};
use crate::notifications::NotificationCenter;
use crate::retry::{fetch_with_retry, RetryPolicy};
use crate::transport::{SubmissionRequest, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLabel {
    /// Normal caption
    Idle,
    /// Loading indicator
    Loading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: ButtonLabel,
}

impl SubmitControl {
    pub const READY: SubmitControl = SubmitControl {
        enabled: true,
        label: ButtonLabel::Idle,
    };

    pub const BUSY: SubmitControl = SubmitControl {
        enabled: false,
        label: ButtonLabel::Loading,
    };
}

/// What subscribers of the controller see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSnapshot {
    pub state: SubmissionState,
    pub control: SubmitControl,
}

impl ControlSnapshot {
    fn idle() -> Self {
        Self {
            state: SubmissionState::Idle,
            control: SubmitControl::READY,
        }
    }
}

/// One-shot instructions for the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEffect {
    ScrollToForm,
    PhotoPlaceholderRestored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Age outside the accepted range, caught before full validation
    AgeOutOfRange { age: i64 },
    InvalidFields(FormReport),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Another attempt was already in flight
    Busy,
    /// Stopped before any network call
    Rejected(Rejection),
    Succeeded { status: u16 },
    Failed(GaleriaError),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded { .. })
    }
}

/// Everything the controller mutates on behalf of the view
pub struct FormContext {
    pub form: ApplicationForm,
    pub rules: RuleTable,
    pub notifications: NotificationCenter,
    pub autosave: AutoSave,
    pub locale: Locale,
    pub clock: Arc<dyn Clock>,
    effects: Vec<UiEffect>,
}

impl FormContext {
    pub fn new(
        form: ApplicationForm,
        rules: RuleTable,
        autosave: AutoSave,
        locale: Locale,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications: NotificationCenter::new(clock.clone()),
            form,
            rules,
            autosave,
            locale,
            clock,
            effects: Vec::new(),
        }
    }

    fn error(&mut self, message: String) {
        self.notifications.notify(message, Severity::Error);
    }
}

/// Publishes `Idle` when dropped, whichever way `submit` exits.
struct IdleOnDrop<'a>(&'a watch::Sender<ControlSnapshot>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_replace(ControlSnapshot::idle());
    }
}

pub struct SubmissionController<T: Transport> {
    context: Mutex<FormContext>,
    transport: T,
    endpoint: String,
    retry: RetryPolicy,
    state: watch::Sender<ControlSnapshot>,
}

impl<T: Transport> SubmissionController<T> {
    /// Build a controller and fill the form from any saved drafts
    pub fn new(
        mut context: FormContext,
        transport: T,
        endpoint: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        let restored = AutoSave::report(context.autosave.restore(&mut context.form), "restore");
        if restored > 0 {
            info!(restored, "Restored draft fields");
        }

        let (state, _) = watch::channel(ControlSnapshot::idle());
        Self {
            context: Mutex::new(context),
            transport,
            endpoint: endpoint.into(),
            retry,
            state,
        }
    }

    /// Standard form and rules, wired from configuration
    pub fn from_config(
        config: &ClientConfig,
        transport: T,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GaleriaError> {
        let storage = config.open_storage()?;
        let context = FormContext::new(
            ApplicationForm::standard(),
            config.rule_table()?,
            AutoSave::new(storage),
            config.locale,
            clock,
        );
        Ok(Self::new(
            context,
            transport,
            config.endpoint.clone(),
            config.retry.clone(),
        ))
    }

    pub fn subscribe(&self) -> watch::Receiver<ControlSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        *self.state.borrow()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Lock the form context
    ///
    /// The lock is never held across an await, so a poisoned lock only means
    /// a panic in synchronous view code; the data is still consistent.
    pub fn context(&self) -> MutexGuard<'_, FormContext> {
        self.context.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // === Input events ===

    /// Typed input: update the value, clear its error and queue a draft write
    pub fn on_input(&self, name: &str, value: &str) -> Result<(), FormError> {
        let mut ctx = self.context();
        ctx.form.set_value(name, value)?;
        let now = ctx.clock.now();
        if let Some(snapshot) = ctx.form.snapshot(name) {
            ctx.autosave.record(&snapshot, now);
        }
        Ok(())
    }

    /// Field lost focus: validate it and show or clear its inline error
    pub fn on_blur(&self, name: &str) -> Result<ValidationResult, FormError> {
        let mut ctx = self.context();
        let FormContext { form, rules, .. } = &mut *ctx;
        form.blur(name, rules)
    }

    pub fn on_check(&self, name: &str, checked: bool) -> Result<(), FormError> {
        self.context().form.check(name, checked)
    }

    /// File picked or dropped on the photo control
    pub fn attach_photo(&self, photo: PhotoAttachment) -> ValidationResult {
        let mut ctx = self.context();
        let locale = ctx.locale;
        let result = ctx.form.attach_photo(photo, locale);
        if let Some(message) = result.message() {
            ctx.error(message.to_string());
        }
        result
    }

    /// Escape key: start dismissing every notification
    pub fn on_escape(&self) {
        self.context().notifications.dismiss_all();
    }

    /// Periodic housekeeping: write due drafts and drop finished notifications
    pub fn tick(&self) -> usize {
        let mut ctx = self.context();
        let now = ctx.clock.now();
        let written = AutoSave::report(ctx.autosave.flush_due(now), "flush");
        ctx.notifications.prune();
        written
    }

    /// Effects queued since the last call, oldest first
    pub fn take_effects(&self) -> Vec<UiEffect> {
        std::mem::take(&mut self.context().effects)
    }

    // === Submission ===

    pub async fn submit(&self) -> SubmitOutcome {
        let claimed = self.state.send_if_modified(|snap| {
            if snap.state != SubmissionState::Idle {
                return false;
            }
            snap.state = SubmissionState::Validating;
            true
        });
        if !claimed {
            debug!("Submission already in flight");
            return SubmitOutcome::Busy;
        }
        let _idle = IdleOnDrop(&self.state);

        let request = match self.validate() {
            Ok(request) => request,
            Err(rejection) => return SubmitOutcome::Rejected(rejection),
        };

        self.publish(SubmissionState::Submitting, SubmitControl::BUSY);
        info!(
            attempt_id = %request.attempt_id,
            endpoint = %request.url,
            "Submitting application"
        );

        let clock = self.context().clock.clone();
        let result = fetch_with_retry(&self.transport, clock.as_ref(), &request, &self.retry).await;

        let mut ctx = self.context();
        let locale = ctx.locale;
        match result {
            Ok(response) if response.is_success() => {
                info!(attempt_id = %request.attempt_id, status = response.status, "Application accepted");
                self.publish(SubmissionState::Succeeded, SubmitControl::BUSY);

                ctx.notifications.notify(locale.submitted(), Severity::Success);
                ctx.form.reset();
                ctx.effects.push(UiEffect::PhotoPlaceholderRestored);
                AutoSave::report(ctx.autosave.clear_all(), "clear");
                ctx.effects.push(UiEffect::ScrollToForm);

                SubmitOutcome::Succeeded {
                    status: response.status,
                }
            }
            Ok(response) => {
                let detail = response
                    .error_detail()
                    .unwrap_or_else(|| locale.unknown_error());
                warn!(
                    attempt_id = %request.attempt_id,
                    status = response.status,
                    %detail,
                    "Application rejected by server"
                );
                self.publish(SubmissionState::Failed, SubmitControl::BUSY);
                ctx.error(locale.submit_failed(&detail));

                SubmitOutcome::Failed(GaleriaError::Application {
                    status: response.status,
                    detail,
                })
            }
            Err(err) => {
                let detail = err.to_string();
                self.publish(SubmissionState::Failed, SubmitControl::BUSY);
                ctx.error(locale.connection_error(&detail));

                SubmitOutcome::Failed(GaleriaError::Transport(detail))
            }
        }
    }

    /// Age fast path, then every field; builds the request on success
    fn validate(&self) -> Result<SubmissionRequest, Rejection> {
        let mut ctx = self.context();
        let locale = ctx.locale;

        let age = AGE_FIELDS
            .iter()
            .find_map(|name| ctx.form.value(name))
            .and_then(leading_integer);
        if let Some(age) = age {
            let message = if age < MIN_AGE {
                Some(locale.too_young(MIN_AGE))
            } else if age > MAX_AGE {
                Some(locale.too_old(MAX_AGE))
            } else {
                None
            };
            if let Some(message) = message {
                debug!(age, "Age outside accepted range");
                ctx.error(message);
                return Err(Rejection::AgeOutOfRange { age });
            }
        }

        let report = validate_form(&ctx.rules, &ctx.form.snapshots());
        ctx.form.apply_report(&report);
        if !report.valid {
            debug!(errors = report.error_count(), "Form has invalid fields");
            return Err(Rejection::InvalidFields(report));
        }

        let payload = ctx.form.payload(ctx.clock.now_utc());
        Ok(SubmissionRequest::new(self.endpoint.clone(), payload))
    }

    fn publish(&self, state: SubmissionState, control: SubmitControl) {
        self.state.send_replace(ControlSnapshot { state, control });
    }
}
