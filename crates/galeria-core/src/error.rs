//! Unified Error Model
use thiserror::Error;

/// Top-level error taxonomy shared by the client pipeline and the panel.
///
/// Every variant is recoverable: the client returns to `Idle` and the
/// server answers the request.
#[derive(Error, Debug)]
pub enum GaleriaError {
    /// Field or form validation failed; never reaches the network.
    #[error("VALIDATION/{0}")]
    Validation(String),

    /// Connection failure after the retry budget was spent.
    #[error("TRANSPORT/{0}")]
    Transport(String),

    /// Non-2xx answer from the submission endpoint.
    #[error("APPLICATION/{status}: {detail}")]
    Application { status: u16, detail: String },

    /// The hosted table could not be queried.
    #[error("STORE/{0}")]
    BackingStore(String),

    #[error("CONFIG/{0}")]
    Config(String),
}

impl GaleriaError {
    /// Only transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GaleriaError::Transport(_))
    }
}
