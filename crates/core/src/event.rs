//! The nurse's assigned event and the session that holds it.
//!
//! [`EventSession`] is constructed once per nurse session and handed to every workflow that
//! needs the event id. Mounting performs the single fetch; reading state never hits the
//! backend. Consumers that need resilience against the login race use
//! [`EventSession::load_with_retry`].

use crate::backend::{Backend, RequestScope};
use crate::constants::{DEFAULT_EVENT_RETRY_ATTEMPTS, DEFAULT_EVENT_RETRY_DELAY_MS};
use crate::error::{IntakeError, IntakeResult};
use intake_types::EventId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::RwLock;

/// Backend message returned while a fresh session cookie has not yet reached the event API.
const NURSE_ONLY_MESSAGE: &str = "only nurses are allowed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Pending,
    Accepted,
    Rejected,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Pending => "Pending",
            EventStatus::Accepted => "Accepted",
            EventStatus::Rejected => "Rejected",
        }
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(EventStatus::Pending),
            "accepted" => Ok(EventStatus::Accepted),
            "rejected" => Ok(EventStatus::Rejected),
            other => Err(format!("unknown event status '{other}'")),
        }
    }
}

/// The wellness event a nurse is currently responsible for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedEvent {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default, alias = "name")]
    pub event_name: String,
    #[serde(default, alias = "code")]
    pub event_code: Option<String>,
    #[serde(default, alias = "date")]
    pub event_date: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(
        default,
        alias = "attendees",
        deserialize_with = "crate::wire::lenient_count"
    )]
    pub number_of_attendees: Option<u32>,
    #[serde(default)]
    pub additional_notes: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::lenient_choice")]
    pub status: Option<EventStatus>,
}

impl AssignedEvent {
    pub fn event_id(&self) -> Option<EventId> {
        EventId::new(&self.id).ok()
    }
}

/// How a consumer retries the event fetch when it hits the login race.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-fetches allowed after the first failure.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_EVENT_RETRY_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_EVENT_RETRY_DELAY_MS),
        }
    }
}

/// Observable state of the session, as exposed to consuming views.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventState {
    pub event: Option<AssignedEvent>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl EventState {
    pub fn is_transient_authorization_error(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(is_transient_authorization_message)
    }
}

/// True for the "only nurses are allowed" rejection seen right after login.
pub fn is_transient_authorization_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains(NURSE_ONLY_MESSAGE)
}

/// Holds the assigned event for one nurse session.
pub struct EventSession<B> {
    backend: B,
    scope: RequestScope,
    state: RwLock<EventState>,
}

impl<B: Backend> EventSession<B> {
    /// Creates the session and performs its one initial fetch.
    pub async fn mount(backend: B, scope: RequestScope) -> Self {
        let session = Self {
            backend,
            scope,
            state: RwLock::new(EventState {
                is_loading: true,
                ..Default::default()
            }),
        };
        session.fetch_event_data().await;
        session
    }

    /// Fetches the nurse's next event and records the outcome.
    ///
    /// On success the event replaces whatever was held and the error is cleared; on failure
    /// the error message is stored and the event cleared. A fetch cut short by the session's
    /// request scope leaves the previous state untouched.
    pub async fn fetch_event_data(&self) -> EventState {
        self.state.write().await.is_loading = true;

        let outcome = self.scope.run(self.backend.next_nurse_event()).await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match outcome {
            Ok(Ok(event)) => {
                tracing::info!(event_id = %event.id, "assigned event loaded");
                state.event = Some(event);
                state.error = None;
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "assigned event fetch failed");
                state.event = None;
                state.error = Some(err.detail());
            }
            Err(_) => {
                tracing::debug!("assigned event fetch cancelled");
            }
        }
        state.clone()
    }

    /// Manual re-trigger of the fetch.
    pub async fn refresh_event(&self) -> EventState {
        self.fetch_event_data().await
    }

    pub async fn snapshot(&self) -> EventState {
        self.state.read().await.clone()
    }

    pub async fn event_id(&self) -> Option<EventId> {
        self.state
            .read()
            .await
            .event
            .as_ref()
            .and_then(AssignedEvent::event_id)
    }

    /// The current event id, or [`IntakeError::NoActiveEvent`].
    pub async fn require_event_id(&self) -> IntakeResult<EventId> {
        self.event_id().await.ok_or(IntakeError::NoActiveEvent)
    }

    /// Returns the event, re-fetching while the backend reports the login race.
    ///
    /// Up to `policy.max_retries` re-fetches are made, `policy.delay` apart. Any other error,
    /// or running out of retries, yields [`IntakeError::EventUnavailable`]; the caller can
    /// offer a manual retry through [`EventSession::refresh_event`].
    pub async fn load_with_retry(&self, policy: RetryPolicy) -> IntakeResult<AssignedEvent> {
        let mut state = self.snapshot().await;
        if state.event.is_none() && state.error.is_none() {
            state = self.fetch_event_data().await;
        }

        let mut retries = 0;
        loop {
            if let Some(event) = state.event {
                return Ok(event);
            }
            if self.scope.is_cancelled() {
                return Err(IntakeError::Cancelled);
            }

            let message = state
                .error
                .clone()
                .unwrap_or_else(|| "no event assigned".to_string());

            if !is_transient_authorization_message(&message) || retries >= policy.max_retries {
                return Err(IntakeError::EventUnavailable(message));
            }

            retries += 1;
            tracing::info!(
                attempt = retries,
                max = policy.max_retries,
                "event fetch rejected during login, retrying"
            );
            self.scope.run(tokio::time::sleep(policy.delay)).await?;
            state = self.fetch_event_data().await;
        }
    }
}
