//! The seam between intake workflows and the remote booking backend.
//!
//! Workflows depend on the [`Backend`] trait only; the HTTP implementation lives in the
//! `intake-client` crate. This module also holds the two small concurrency primitives every
//! workflow shares: the submission guard and the cancellable request scope.

use crate::error::{IntakeError, IntakeResult};
use crate::event::AssignedEvent;
use crate::patient::{NewPatient, Patient};
use crate::referral::{NewReferral, Referral};
use async_trait::async_trait;
use intake_types::EventId;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Shown when the backend failed without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Non-2xx response. `message` is the body's own message when it carried one.
    #[error("backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },
    #[error("could not reach backend: {0}")]
    Transport(String),
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// The server's message when present, otherwise the error text itself.
    pub fn detail(&self) -> String {
        match self {
            BackendError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Remote operations used by the nurse intake workflow.
///
/// Every call is made with the nurse's session credentials.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn next_nurse_event(&self) -> Result<AssignedEvent, BackendError>;

    async fn list_patients(&self, event_id: &EventId) -> Result<Vec<Patient>, BackendError>;

    async fn create_patient(&self, patient: &NewPatient) -> Result<Patient, BackendError>;

    async fn create_referral(&self, referral: &NewReferral) -> Result<Referral, BackendError>;

    async fn list_referrals(&self, event_id: &EventId) -> Result<Vec<Referral>, BackendError>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn next_nurse_event(&self) -> Result<AssignedEvent, BackendError> {
        (**self).next_nurse_event().await
    }

    async fn list_patients(&self, event_id: &EventId) -> Result<Vec<Patient>, BackendError> {
        (**self).list_patients(event_id).await
    }

    async fn create_patient(&self, patient: &NewPatient) -> Result<Patient, BackendError> {
        (**self).create_patient(patient).await
    }

    async fn create_referral(&self, referral: &NewReferral) -> Result<Referral, BackendError> {
        (**self).create_referral(referral).await
    }

    async fn list_referrals(&self, event_id: &EventId) -> Result<Vec<Referral>, BackendError> {
        (**self).list_referrals(event_id).await
    }
}

/// Rejects re-entrant submissions.
///
/// A workflow holds one `InFlight`; each submit takes a [`InFlightToken`] for its duration and
/// any concurrent submit fails fast with [`IntakeError::SubmissionInProgress`].
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> IntakeResult<InFlightToken<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| IntakeError::SubmissionInProgress)?;
        Ok(InFlightToken { guard: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the owning [`InFlight`] when dropped.
#[derive(Debug)]
pub struct InFlightToken<'a> {
    guard: &'a InFlight,
}

impl Drop for InFlightToken<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

/// Cancellable context for view-triggered requests.
///
/// Futures run through [`RequestScope::run`] race against the scope's teardown signal. Once
/// the scope is cancelled, results that resolve afterwards are discarded and the caller gets
/// [`IntakeError::Cancelled`]. Clones share the same signal.
#[derive(Clone, Debug)]
pub struct RequestScope {
    cancelled: watch::Sender<bool>,
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestScope {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self { cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    pub async fn run<F, T>(&self, fut: F) -> IntakeResult<T>
    where
        F: Future<Output = T>,
    {
        let mut rx = self.cancelled.subscribe();
        if *rx.borrow_and_update() {
            return Err(IntakeError::Cancelled);
        }

        // The sender is owned by `self`, so this only completes on cancellation.
        let teardown = async move {
            let _ = rx.wait_for(|cancelled| *cancelled).await;
        };

        tokio::select! {
            biased;
            _ = teardown => Err(IntakeError::Cancelled),
            out = fut => {
                if self.is_cancelled() {
                    Err(IntakeError::Cancelled)
                } else {
                    Ok(out)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn in_flight_rejects_second_submission_until_released() {
        let guard = InFlight::new();
        let token = guard.try_begin().expect("first submission starts");
        assert!(guard.is_busy());
        assert!(matches!(
            guard.try_begin(),
            Err(IntakeError::SubmissionInProgress)
        ));

        drop(token);
        assert!(!guard.is_busy());
        guard.try_begin().expect("guard is free again");
    }

    #[test]
    fn user_message_prefers_backend_text() {
        let err = BackendError::Status {
            status: 400,
            message: Some("ID number already registered".into()),
        };
        assert_eq!(err.user_message(), "ID number already registered");

        let err = BackendError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(
            BackendError::Transport("refused".into()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
    }

    #[tokio::test]
    async fn scope_passes_results_through() {
        let scope = RequestScope::new();
        let value = scope.run(async { 7 }).await.expect("not cancelled");
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn cancelled_scope_discards_slow_results() {
        let scope = RequestScope::new();
        let teardown = scope.clone();

        let slow = tokio::spawn(async move {
            scope
                .run(async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    "late"
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        teardown.cancel();

        let result = slow.await.expect("task joins");
        assert!(matches!(result, Err(IntakeError::Cancelled)));
    }

    #[tokio::test]
    async fn cancelled_scope_refuses_new_work() {
        let scope = RequestScope::new();
        scope.cancel();
        assert!(matches!(
            scope.run(async { 1 }).await,
            Err(IntakeError::Cancelled)
        ));
    }
}
