//! # Intake Client
//!
//! HTTP implementation of [`intake_core::Backend`] for the wellness booking API.
//!
//! Every request carries the nurse's session cookie. Error responses are reduced to the
//! body's `message` (or `error`) field so workflows can show the server's own wording.

use async_trait::async_trait;
use intake_core::constants::{
    NEXT_NURSE_EVENT_PATH, PATIENTS_BY_EVENT_PATH, PATIENTS_PATH, REFERRALS_BY_EVENT_PATH,
    REFERRALS_PATH,
};
use intake_core::{
    AssignedEvent, Backend, BackendError, ClientConfig, IntakeError, IntakeResult, NewPatient,
    NewReferral, Patient, Referral,
};
use intake_types::EventId;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Response wrapper used by most endpoints: `{ success, message, data }`.
///
/// The event endpoint names its payload `event` instead of `data`.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, alias = "event")]
    data: Option<T>,
}

impl<T> Envelope<T> {
    /// Treats an explicit `success: false` as a failure even on a 2xx status.
    fn into_data(self, status: u16) -> Result<Option<T>, BackendError> {
        if self.success == Some(false) {
            return Err(BackendError::Status {
                status,
                message: non_blank(self.message),
            });
        }
        Ok(self.data)
    }
}

/// Patient creation answers with either the bare document or `{ data }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedPatient {
    Wrapped { data: Patient },
    Bare(Patient),
}

pub struct HttpBackend {
    config: Arc<ClientConfig>,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Builds the client from startup configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Config`] if the session cookie is not a valid header value or
    /// the TLS backend cannot be initialised.
    pub fn new(config: Arc<ClientConfig>) -> IntakeResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = config.session_cookie() {
            let mut value = HeaderValue::from_str(cookie)
                .map_err(|e| IntakeError::Config(format!("invalid session cookie: {e}")))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(|e| IntakeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        Url::parse(&self.config.endpoint(path))
            .map_err(|e| BackendError::Transport(format!("invalid endpoint url: {e}")))
    }

    /// `path` with the event id appended as its own, percent-encoded, segment.
    fn event_url(&self, path: &str, event_id: &EventId) -> Result<Url, BackendError> {
        let mut url = self.url(path)?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Transport("endpoint url cannot take a path".into()))?
            .push(event_id.as_str());
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(u16, T), BackendError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "backend returned an error status");
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed = response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok((status.as_u16(), parsed))
    }

    fn transport_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Transport(format!(
                "request timed out after {}s",
                self.config.request_timeout().as_secs()
            ))
        } else if err.is_connect() {
            BackendError::Transport(format!(
                "could not connect to {}",
                self.config.api_base_url()
            ))
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn next_nurse_event(&self) -> Result<AssignedEvent, BackendError> {
        let url = self.url(NEXT_NURSE_EVENT_PATH)?;
        let (status, envelope) = self
            .send::<Envelope<AssignedEvent>>(self.client.get(url))
            .await?;
        let message = non_blank(envelope.message.clone());
        envelope.into_data(status)?.ok_or(BackendError::Status {
            status,
            message: message.or_else(|| Some("No event is currently assigned".into())),
        })
    }

    async fn list_patients(&self, event_id: &EventId) -> Result<Vec<Patient>, BackendError> {
        let url = self.event_url(PATIENTS_BY_EVENT_PATH, event_id)?;
        let (status, envelope) = self
            .send::<Envelope<Vec<Patient>>>(self.client.get(url))
            .await?;
        let patients = envelope.into_data(status)?.unwrap_or_default();
        tracing::debug!(event_id = %event_id, count = patients.len(), "patients fetched");
        Ok(patients)
    }

    async fn create_patient(&self, patient: &NewPatient) -> Result<Patient, BackendError> {
        let url = self.url(PATIENTS_PATH)?;
        let (_, created) = self
            .send::<CreatedPatient>(self.client.post(url).json(patient))
            .await?;
        Ok(match created {
            CreatedPatient::Wrapped { data } => data,
            CreatedPatient::Bare(patient) => patient,
        })
    }

    async fn create_referral(&self, referral: &NewReferral) -> Result<Referral, BackendError> {
        let url = self.url(REFERRALS_PATH)?;
        let (status, envelope) = self
            .send::<Envelope<Referral>>(self.client.post(url).json(referral))
            .await?;
        envelope
            .into_data(status)?
            .ok_or_else(|| BackendError::Decode("referral response carried no data".into()))
    }

    async fn list_referrals(&self, event_id: &EventId) -> Result<Vec<Referral>, BackendError> {
        let url = self.event_url(REFERRALS_BY_EVENT_PATH, event_id)?;
        let (status, envelope) = self
            .send::<Envelope<Vec<Referral>>>(self.client.get(url))
            .await?;
        Ok(envelope.into_data(status)?.unwrap_or_default())
    }
}

fn non_blank(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

/// Pulls a human-readable message out of an error body, if it has one.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let text = |key: &str| {
        value
            .get(key)
            .and_then(|v| v.as_str().or_else(|| v.get("message").and_then(|m| m.as_str())))
            .map(str::to_string)
    };
    non_blank(text("message")).or_else(|| non_blank(text("error")))
}
