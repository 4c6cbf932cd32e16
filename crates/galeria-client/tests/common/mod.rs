//! Shared fixtures for the client integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use galeria_client::{
    ApplicationForm, AutoSave, ControlSnapshot, DraftStorage, FormContext, MemoryStorage,
    RetryPolicy, SubmissionController, SubmissionRequest, Transport, TransportError,
    TransportResponse,
};
use galeria_core::{ManualClock, PhotoAttachment, SubmissionPayload};
use galeria_rules::{Locale, RuleTable};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Notify};

pub const ENDPOINT: &str = "http://galeria.test/api/candidatura";

/// Transport that replays a script and records what it was asked to send
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<SubmissionRequest>>,
    observer: Mutex<Option<watch::Receiver<ControlSnapshot>>>,
    seen: Mutex<Vec<ControlSnapshot>>,
    hold: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    /// Every call waits on `gate` before answering
    pub fn held(script: Vec<Result<TransportResponse, TransportError>>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            hold: Some(gate),
            ..Self::default()
        })
    }

    pub fn failing(times: usize) -> Vec<Result<TransportResponse, TransportError>> {
        (0..times)
            .map(|_| Err(TransportError::Connect("connection refused".into())))
            .collect()
    }

    /// Record the controller's published state on every call
    pub fn observe(&self, rx: watch::Receiver<ControlSnapshot>) {
        *self.observer.lock().unwrap() = Some(rx);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<SubmissionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn seen(&self) -> Vec<ControlSnapshot> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &SubmissionRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(rx) = self.observer.lock().unwrap().as_ref() {
            self.seen.lock().unwrap().push(*rx.borrow());
        }
        if let Some(gate) = &self.hold {
            gate.notified().await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("script exhausted".into())))
    }
}

pub fn ok(status: u16) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::new(status, Vec::new()))
}

pub fn json(status: u16, body: serde_json::Value) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::new(status, body.to_string()))
}

pub fn request() -> SubmissionRequest {
    SubmissionRequest::new(
        ENDPOINT,
        SubmissionPayload {
            fields: vec![("nome".into(), "Ana Silva".into())],
            photo: None,
            timestamp: Utc::now(),
        },
    )
}

pub fn controller<T: Transport>(
    transport: T,
    clock: &ManualClock,
    storage: Box<dyn DraftStorage>,
) -> SubmissionController<T> {
    let context = FormContext::new(
        ApplicationForm::standard(),
        RuleTable::standard(Locale::En),
        AutoSave::new(storage),
        Locale::En,
        Arc::new(clock.clone()),
    );
    SubmissionController::new(context, transport, ENDPOINT, RetryPolicy::default())
}

pub fn memory_controller<T: Transport>(transport: T, clock: &ManualClock) -> SubmissionController<T> {
    controller(transport, clock, Box::new(MemoryStorage::new()))
}

pub const VALID_FIELDS: [(&str, &str); 7] = [
    ("nome", "Ana Silva"),
    ("email", "ana@example.com"),
    ("telefone", "+351 912 345 678"),
    ("idade", "30"),
    ("cidade", "Lisboa"),
    ("experiencia", "Dez anos de fotografia de estúdio."),
    ("disponibilidade", "imediata"),
];

/// Type a complete, valid application
pub fn fill_valid<T: Transport>(ctrl: &SubmissionController<T>) {
    for (name, value) in VALID_FIELDS {
        ctrl.on_input(name, value).unwrap();
    }
    ctrl.on_check("termos", true).unwrap();
    let photo = ctrl.attach_photo(PhotoAttachment::new("retrato.jpg", "image/jpeg", vec![0xFF; 64]));
    assert!(photo.valid);
}
