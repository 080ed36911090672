//! In-memory backend used by the unit tests.

use crate::backend::{Backend, BackendError};
use crate::event::{AssignedEvent, EventStatus};
use crate::patient::{NewPatient, Patient, PersonalInfo};
use crate::referral::{NewReferral, Referral};
use async_trait::async_trait;
use intake_types::EventId;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn sample_event(id: &str) -> AssignedEvent {
    AssignedEvent {
        id: id.to_string(),
        event_name: "Wellness screening".to_string(),
        venue: Some("Community hall".to_string()),
        status: Some(EventStatus::Accepted),
        ..Default::default()
    }
}

pub(crate) fn sample_patient(full_name: &str, surname: &str, id_number: &str) -> Patient {
    Patient {
        id: Some(format!("pat-{id_number}")),
        event_id: Some("evt-1".to_string()),
        personal_info: PersonalInfo {
            full_name: full_name.to_string(),
            surname: surname.to_string(),
            id_number: id_number.to_string(),
            email: format!("{}@example.com", full_name.to_lowercase()),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    event: Option<AssignedEvent>,
    event_results: Mutex<VecDeque<Result<AssignedEvent, BackendError>>>,
    event_fetches: AtomicUsize,
    patients: Mutex<Vec<Patient>>,
    patient_fetches: AtomicUsize,
    created_patients: Mutex<Vec<NewPatient>>,
    create_failure: Mutex<Option<BackendError>>,
    referrals: Mutex<Vec<Referral>>,
    referral_posts: AtomicUsize,
    referral_failure: Mutex<Option<BackendError>>,
    submit_delay: Option<Duration>,
}

impl FakeBackend {
    pub(crate) fn with_event(event: AssignedEvent) -> Self {
        Self {
            event: Some(event),
            ..Default::default()
        }
    }

    pub(crate) fn with_patients(self, patients: Vec<Patient>) -> Self {
        *self.patients.lock().unwrap() = patients;
        self
    }

    /// Holds every create call open for `delay` before it answers.
    pub(crate) fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    async fn slow_submit(&self) {
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub(crate) fn push_event_result(&self, result: Result<AssignedEvent, BackendError>) {
        self.event_results.lock().unwrap().push_back(result);
    }

    pub(crate) fn fail_next_create(&self, err: BackendError) {
        *self.create_failure.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_next_referral(&self, err: BackendError) {
        *self.referral_failure.lock().unwrap() = Some(err);
    }

    pub(crate) fn event_fetches(&self) -> usize {
        self.event_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn patient_fetches(&self) -> usize {
        self.patient_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn referral_posts(&self) -> usize {
        self.referral_posts.load(Ordering::SeqCst)
    }

    pub(crate) fn created_patients(&self) -> Vec<NewPatient> {
        self.created_patients.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn next_nurse_event(&self) -> Result<AssignedEvent, BackendError> {
        self.event_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.event_results.lock().unwrap().pop_front() {
            return result;
        }
        self.event.clone().ok_or(BackendError::Status {
            status: 404,
            message: Some("No event assigned".into()),
        })
    }

    async fn list_patients(&self, event_id: &EventId) -> Result<Vec<Patient>, BackendError> {
        self.patient_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .patients
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.event_id.as_deref().map_or(true, |id| id == event_id.as_str()))
            .cloned()
            .collect())
    }

    async fn create_patient(&self, patient: &NewPatient) -> Result<Patient, BackendError> {
        self.slow_submit().await;
        if let Some(err) = self.create_failure.lock().unwrap().take() {
            return Err(err);
        }
        self.created_patients.lock().unwrap().push(patient.clone());

        let created = Patient {
            id: Some(format!("pat-{}", patient.personal_info.id_number)),
            event_id: Some(patient.event_id.to_string()),
            personal_info: patient.personal_info.clone(),
            medical_aid_details: patient.medical_aid_details.clone(),
            medical_info: patient.medical_info.clone(),
            mental_health_assessment: patient.mental_health_assessment.clone(),
            consent_signature: Some(patient.consent_signature.as_data_url().to_string()),
        };
        self.patients.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn create_referral(&self, referral: &NewReferral) -> Result<Referral, BackendError> {
        self.referral_posts.fetch_add(1, Ordering::SeqCst);
        self.slow_submit().await;
        if let Some(err) = self.referral_failure.lock().unwrap().take() {
            return Err(err);
        }
        let created = Referral {
            id: format!("ref-{}", self.referrals.lock().unwrap().len() + 1),
            id_number: referral.id_number.to_string(),
            event_id: Some(referral.event_id.to_string()),
            practitioner_name: referral.practitioner_name.to_string(),
            practitioner_email: referral.practitioner_email.to_string(),
            comments: referral.comments.to_string(),
            status: Some("Pending".into()),
            created_at: None,
        };
        self.referrals.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list_referrals(&self, event_id: &EventId) -> Result<Vec<Referral>, BackendError> {
        Ok(self
            .referrals
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.event_id.as_deref() == Some(event_id.as_str()))
            .cloned()
            .collect())
    }
}
