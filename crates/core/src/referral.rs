//! Referral sub-workflow.
//!
//! A nurse refers one patient of the active event to an external practitioner. The form is
//! validated locally before any request is made; a failed submission leaves the form as the
//! nurse filled it.

use crate::backend::{Backend, InFlight, RequestScope};
use crate::classifier::RiskColor;
use crate::error::{FieldError, IntakeError, IntakeResult};
use crate::patient::Patient;
use chrono::{DateTime, Utc};
use intake_types::{EventId, NonEmptyText};
use serde::{Deserialize, Serialize};

/// A referral as stored by the backend. Read-only from this client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    #[serde(rename = "_id", default, deserialize_with = "crate::wire::scalar_text")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::wire::scalar_text")]
    pub id_number: String,
    #[serde(default, deserialize_with = "crate::wire::lenient_reference")]
    pub event_id: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::scalar_text")]
    pub practitioner_name: String,
    #[serde(default, deserialize_with = "crate::wire::scalar_text")]
    pub practitioner_email: String,
    #[serde(default, deserialize_with = "crate::wire::scalar_text")]
    pub comments: String,
    #[serde(default, deserialize_with = "crate::wire::lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Referral {
    /// Badge text and colour for the referral's server-assigned status.
    pub fn status_badge(&self) -> (&str, RiskColor) {
        let status = self.status.as_deref().map(str::trim).unwrap_or("");
        let color = match status.to_ascii_lowercase().as_str() {
            "completed" => RiskColor::Green,
            "pending" => RiskColor::Yellow,
            _ => RiskColor::Gray,
        };
        let label = if status.is_empty() { "Unknown" } else { status };
        (label, color)
    }
}

/// Payload posted to create a referral.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReferral {
    pub id_number: NonEmptyText,
    pub event_id: EventId,
    pub practitioner_name: NonEmptyText,
    pub practitioner_email: NonEmptyText,
    pub comments: NonEmptyText,
}

/// The patient a referral form was opened for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferralTarget {
    pub id_number: String,
    pub display_name: String,
}

/// Modal form state for a new referral.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferralForm {
    pub patient: Option<ReferralTarget>,
    pub practitioner_name: String,
    pub practitioner_email: String,
    pub comments: String,
}

impl ReferralForm {
    pub fn for_patient(patient: &Patient) -> Self {
        let mut form = Self::default();
        form.select_patient(patient);
        form
    }

    pub fn select_patient(&mut self, patient: &Patient) {
        self.patient = Some(ReferralTarget {
            id_number: patient.personal_info.id_number.clone(),
            display_name: patient.personal_info.display_name(),
        });
    }

    /// Checks the preconditions in the order the form presents them.
    pub fn validate(&self, event_id: Option<&EventId>) -> Result<NewReferral, FieldError> {
        let practitioner_name = NonEmptyText::new(&self.practitioner_name)
            .map_err(|_| FieldError::required("practitionerName"))?;
        let practitioner_email = NonEmptyText::new(&self.practitioner_email)
            .map_err(|_| FieldError::required("practitionerEmail"))?;
        let comments =
            NonEmptyText::new(&self.comments).map_err(|_| FieldError::required("comments"))?;
        let event_id = event_id
            .cloned()
            .ok_or_else(|| FieldError::invalid("eventId", "no active event"))?;
        let id_number = self
            .patient
            .as_ref()
            .and_then(|p| NonEmptyText::new(&p.id_number).ok())
            .ok_or_else(|| FieldError::invalid("idNumber", "no patient selected"))?;

        Ok(NewReferral {
            id_number,
            event_id,
            practitioner_name,
            practitioner_email,
            comments,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct ReferralWorkflow<B> {
    backend: B,
    scope: RequestScope,
    in_flight: InFlight,
}

impl<B: Backend> ReferralWorkflow<B> {
    pub fn new(backend: B, scope: RequestScope) -> Self {
        Self {
            backend,
            scope,
            in_flight: InFlight::new(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Validates and posts the referral.
    ///
    /// Validation failures make no request. On success the form is cleared, including the
    /// selected patient; on any failure it is left intact for a retry.
    pub async fn submit(
        &self,
        form: &mut ReferralForm,
        event_id: Option<&EventId>,
    ) -> IntakeResult<Referral> {
        let payload = form.validate(event_id)?;
        let _token = self.in_flight.try_begin()?;

        let created = self
            .scope
            .run(self.backend.create_referral(&payload))
            .await?
            .map_err(|err| {
                tracing::warn!(
                    event_id = %payload.event_id,
                    error = %err,
                    "referral submission failed"
                );
                IntakeError::from(err)
            })?;

        tracing::info!(event_id = %payload.event_id, referral_id = %created.id, "referral created");
        form.clear();
        Ok(created)
    }

    pub async fn list(&self, event_id: &EventId) -> IntakeResult<Vec<Referral>> {
        let referrals = self
            .scope
            .run(self.backend.list_referrals(event_id))
            .await??;
        tracing::debug!(event_id = %event_id, count = referrals.len(), "referrals loaded");
        Ok(referrals)
    }
}
