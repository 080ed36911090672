use crate::backend::BackendError;

/// A single form field that failed validation.
///
/// `field` is the wire name of the field (for example `practitionerEmail`) so front ends can
/// point the nurse at the offending input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            reason: "is required".into(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("validation failed: {0}")]
    Validation(#[from] FieldError),
    #[error("no active event is assigned to this session")]
    NoActiveEvent,
    #[error("assigned event could not be loaded: {0}")]
    EventUnavailable(String),
    #[error("a submission is already in progress")]
    SubmissionInProgress,
    #[error("request was cancelled")]
    Cancelled,
    #[error("the registration form is not on its final step")]
    WizardIncomplete,
    #[error("failed to read signature image: {0}")]
    SignatureRead(std::io::Error),
    #[error("signature is not a PNG or JPEG image")]
    SignatureFormat,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl IntakeError {
    /// Message suitable for a transient notification shown to the nurse.
    ///
    /// Backend failures surface the server's own message when it sent one; everything else
    /// uses the error's display text.
    pub fn user_message(&self) -> String {
        match self {
            IntakeError::Backend(err) => err.user_message(),
            IntakeError::EventUnavailable(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
