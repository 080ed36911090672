//! Patient registration wizard.
//!
//! Five steps collect one patient record:
//!
//! 1. personal information
//! 2. medical aid details
//! 3. consent signature
//! 4. medical screening
//! 5. mental health questions
//!
//! [`RegistrationForm`] is the aggregate state, with one sub-object per step. Moving forward
//! always validates the step being left, so a record cannot reach submission with a step that
//! was skipped over. [`RegistrationWorkflow`] posts the finished form once and refreshes the
//! event's patient list from the backend.

use crate::backend::{Backend, InFlight, RequestScope};
use crate::classifier::{self, round_one_decimal};
use crate::directory::PatientDirectory;
use crate::error::{FieldError, IntakeError, IntakeResult};
use crate::patient::{
    GlucoseType, HivStatus, MedicalAidDetails, MedicalInfo, MentalHealthEntry, NewPatient,
    Patient, PersonalInfo,
};
use crate::signature::ConsentSignature;
use intake_types::EventId;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Questions every new form starts with. Nurses may remove them.
pub const DEFAULT_MENTAL_HEALTH_QUESTIONS: [&str; 2] = [
    "Over the last two weeks, how often have you felt down, depressed or hopeless?",
    "Over the last two weeks, how often have you felt nervous, anxious or on edge?",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WizardStep {
    PersonalInfo,
    MedicalAid,
    Consent,
    MedicalScreening,
    MentalHealth,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::PersonalInfo,
        WizardStep::MedicalAid,
        WizardStep::Consent,
        WizardStep::MedicalScreening,
        WizardStep::MentalHealth,
    ];

    pub fn index(self) -> usize {
        match self {
            WizardStep::PersonalInfo => 0,
            WizardStep::MedicalAid => 1,
            WizardStep::Consent => 2,
            WizardStep::MedicalScreening => 3,
            WizardStep::MentalHealth => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::PersonalInfo => "Personal Info",
            WizardStep::MedicalAid => "Medical Aid",
            WizardStep::Consent => "Consent",
            WizardStep::MedicalScreening => "Medical Screening",
            WizardStep::MentalHealth => "Mental Health Questions",
        }
    }

    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::PersonalInfo => Some(WizardStep::MedicalAid),
            WizardStep::MedicalAid => Some(WizardStep::Consent),
            WizardStep::Consent => Some(WizardStep::MedicalScreening),
            WizardStep::MedicalScreening => Some(WizardStep::MentalHealth),
            WizardStep::MentalHealth => None,
        }
    }

    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::PersonalInfo => None,
            WizardStep::MedicalAid => Some(WizardStep::PersonalInfo),
            WizardStep::Consent => Some(WizardStep::MedicalAid),
            WizardStep::MedicalScreening => Some(WizardStep::Consent),
            WizardStep::MentalHealth => Some(WizardStep::MedicalScreening),
        }
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.index() + 1, Self::ALL.len(), self.title())
    }
}

/// Outcome of pressing "Next".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    Moved(WizardStep),
    /// The form is on its last step; the action is now "Submit".
    ReadyToSubmit,
}

/// Screening inputs as typed by the nurse.
///
/// Values stay as text until the step is validated so a half-typed number never loses what
/// was entered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreeningDraft {
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub height: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub weight: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub blood_pressure: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub cholesterol: String,
    pub hiv_status: String,
    pub glucose_type: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub glucose_level: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub hba1c: String,
}

impl ScreeningDraft {
    pub fn height(&self) -> Option<f64> {
        parse_number(&self.height)
    }

    pub fn weight(&self) -> Option<f64> {
        parse_number(&self.weight)
    }

    /// Live BMI for display; `None` until both height and weight are numeric.
    pub fn bmi(&self) -> Option<f64> {
        classifier::calculate_bmi(self.height(), self.weight())
    }

    /// Every field is optional, but a field that was filled in must parse.
    pub fn validate(&self) -> Result<MedicalInfo, FieldError> {
        let height = positive_number("height", &self.height)?;
        let weight = positive_number("weight", &self.weight)?;

        let blood_pressure = match self.blood_pressure.trim() {
            "" => None,
            raw => {
                classifier::parse_blood_pressure(raw).ok_or_else(|| {
                    FieldError::invalid("bloodPressure", "expected systolic/diastolic, e.g. 120/80")
                })?;
                Some(raw.replace(' ', ""))
            }
        };

        Ok(MedicalInfo {
            height,
            weight,
            bmi: classifier::calculate_bmi(height, weight),
            blood_pressure,
            cholesterol: positive_number("cholesterol", &self.cholesterol)?,
            hiv_status: choice::<HivStatus>("hivStatus", &self.hiv_status)?,
            glucose_type: choice::<GlucoseType>("glucoseType", &self.glucose_type)?,
            glucose_level: positive_number("glucoseLevel", &self.glucose_level)?,
            hba1c: positive_number("hba1c", &self.hba1c)?.map(round_one_decimal),
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn positive_number(field: &'static str, raw: &str) -> Result<Option<f64>, FieldError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match parse_number(raw) {
        Some(value) if value > 0.0 => Ok(Some(value)),
        _ => Err(FieldError::invalid(field, "must be a positive number")),
    }
}

fn choice<T: FromStr<Err = String>>(
    field: &'static str,
    raw: &str,
) -> Result<Option<T>, FieldError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|reason| FieldError::invalid(field, reason))
}

/// A registration prepared ahead of time, e.g. a YAML file handed to the CLI.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationDraft {
    #[serde(deserialize_with = "crate::wire::null_default")]
    pub personal_info: PersonalInfo,
    #[serde(deserialize_with = "crate::wire::null_default")]
    pub medical_aid_details: MedicalAidDetails,
    #[serde(deserialize_with = "crate::wire::null_default")]
    pub medical_info: ScreeningDraft,
    /// Omitted means "use the default questions".
    pub mental_health_assessment: Option<Vec<MentalHealthEntry>>,
}

/// Aggregate wizard state.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistrationForm {
    step: WizardStep,
    pub personal_info: PersonalInfo,
    pub medical_aid_details: MedicalAidDetails,
    consent_signature: Option<ConsentSignature>,
    pub screening: ScreeningDraft,
    mental_health: Vec<MentalHealthEntry>,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            step: WizardStep::PersonalInfo,
            personal_info: PersonalInfo::default(),
            medical_aid_details: MedicalAidDetails::default(),
            consent_signature: None,
            screening: ScreeningDraft::default(),
            mental_health: DEFAULT_MENTAL_HEALTH_QUESTIONS
                .iter()
                .map(|q| MentalHealthEntry::new(*q, ""))
                .collect(),
        }
    }
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A form on its first step pre-filled from `draft`.
    pub fn from_draft(draft: RegistrationDraft) -> Self {
        let mut form = Self {
            personal_info: draft.personal_info,
            medical_aid_details: draft.medical_aid_details,
            screening: draft.medical_info,
            ..Self::default()
        };
        if let Some(entries) = draft.mental_health_assessment {
            form.mental_health = entries;
        }
        form
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Validates the current step and moves forward by one.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field of the current step. The step does not change.
    pub fn next(&mut self) -> Result<Advance, FieldError> {
        self.validate_step(self.step)?;
        match self.step.next() {
            Some(step) => {
                self.step = step;
                Ok(Advance::Moved(step))
            }
            None => Ok(Advance::ReadyToSubmit),
        }
    }

    /// Moves back by one. A no-op on the first step.
    pub fn back(&mut self) -> WizardStep {
        if let Some(step) = self.step.previous() {
            self.step = step;
        }
        self.step
    }

    /// Presses "Next" until the form is ready to submit.
    pub fn advance_to_submit(&mut self) -> Result<(), FieldError> {
        while self.next()? != Advance::ReadyToSubmit {}
        Ok(())
    }

    pub fn validate_step(&self, step: WizardStep) -> Result<(), FieldError> {
        match step {
            WizardStep::PersonalInfo => {
                let info = &self.personal_info;
                for (field, value) in [
                    ("fullName", &info.full_name),
                    ("surname", &info.surname),
                    ("idNumber", &info.id_number),
                    ("dateOfBirth", &info.date_of_birth),
                    ("sex", &info.sex),
                ] {
                    if value.trim().is_empty() {
                        return Err(FieldError::required(field));
                    }
                }
                Ok(())
            }
            WizardStep::MedicalAid | WizardStep::MentalHealth => Ok(()),
            WizardStep::Consent => self
                .consent_signature
                .as_ref()
                .map(|_| ())
                .ok_or_else(|| FieldError::required("consentSignature")),
            WizardStep::MedicalScreening => self.screening.validate().map(|_| ()),
        }
    }

    pub fn consent_signature(&self) -> Option<&ConsentSignature> {
        self.consent_signature.as_ref()
    }

    pub fn set_signature(&mut self, signature: ConsentSignature) {
        self.consent_signature = Some(signature);
    }

    pub fn clear_signature(&mut self) {
        self.consent_signature = None;
    }

    pub fn mental_health(&self) -> &[MentalHealthEntry] {
        &self.mental_health
    }

    pub fn add_question(&mut self, question: impl Into<String>) -> usize {
        self.mental_health.push(MentalHealthEntry::new(question, ""));
        self.mental_health.len() - 1
    }

    pub fn answer_question(&mut self, index: usize, answer: impl Into<String>) -> bool {
        match self.mental_health.get_mut(index) {
            Some(entry) => {
                entry.answer = answer.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_question(&mut self, index: usize) -> Option<MentalHealthEntry> {
        (index < self.mental_health.len()).then(|| self.mental_health.remove(index))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Builds the creation payload, re-checking every step.
    pub fn to_payload(&self, event_id: EventId) -> Result<NewPatient, FieldError> {
        for step in WizardStep::ALL {
            self.validate_step(step)?;
        }
        let consent_signature = self
            .consent_signature
            .clone()
            .ok_or_else(|| FieldError::required("consentSignature"))?;

        Ok(NewPatient {
            event_id,
            personal_info: trimmed_personal_info(&self.personal_info),
            medical_info: self.screening.validate()?,
            medical_aid_details: trimmed_medical_aid(&self.medical_aid_details),
            mental_health_assessment: self
                .mental_health
                .iter()
                .filter(|entry| !entry.question.trim().is_empty())
                .cloned()
                .collect(),
            consent_signature,
        })
    }
}

fn trimmed_personal_info(info: &PersonalInfo) -> PersonalInfo {
    PersonalInfo {
        full_name: info.full_name.trim().to_string(),
        surname: info.surname.trim().to_string(),
        date_of_birth: info.date_of_birth.trim().to_string(),
        id_number: info.id_number.trim().to_string(),
        email: info.email.trim().to_string(),
        phone: info.phone.trim().to_string(),
        sex: info.sex.trim().to_string(),
    }
}

fn trimmed_medical_aid(details: &MedicalAidDetails) -> MedicalAidDetails {
    let clean = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    MedicalAidDetails {
        scheme_name: clean(&details.scheme_name),
        plan_option: clean(&details.plan_option),
        membership_number: clean(&details.membership_number),
        main_member_name: clean(&details.main_member_name),
        main_member_address: clean(&details.main_member_address),
        dependent_code: clean(&details.dependent_code),
    }
}

pub struct RegistrationWorkflow<B> {
    backend: B,
    scope: RequestScope,
    in_flight: InFlight,
}

impl<B: Backend> RegistrationWorkflow<B> {
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

    /// Submits a form that has reached its final step.
    ///
    /// On success the form is reset and `directory` is reloaded from the backend. On failure
    /// the form is untouched so the nurse can retry.
    ///
    /// # Errors
    ///
    /// - [`IntakeError::NoActiveEvent`] without an assigned event.
    /// - [`IntakeError::WizardIncomplete`] if the form is not on its last step.
    /// - [`IntakeError::Validation`] if any step no longer validates.
    /// - [`IntakeError::SubmissionInProgress`] for a re-entrant submit.
    /// - [`IntakeError::Backend`] when the backend rejects the record.
    pub async fn submit(
        &self,
        form: &mut RegistrationForm,
        event_id: Option<&EventId>,
        directory: &mut PatientDirectory,
    ) -> IntakeResult<Patient> {
        let event_id = event_id.ok_or(IntakeError::NoActiveEvent)?;
        if !form.step().is_last() {
            return Err(IntakeError::WizardIncomplete);
        }
        let payload = form.to_payload(event_id.clone())?;
        let _token = self.in_flight.try_begin()?;

        let created = self
            .scope
            .run(self.backend.create_patient(&payload))
            .await?
            .map_err(|err| {
                tracing::warn!(event_id = %event_id, error = %err, "patient registration failed");
                IntakeError::from(err)
            })?;

        tracing::info!(event_id = %event_id, "patient registered");
        form.reset();

        if let Err(err) = directory.load(&self.backend, &self.scope, event_id).await {
            tracing::warn!(event_id = %event_id, error = %err, "patient list refresh failed");
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::signature::TINY_PNG;
    use crate::test_support::{sample_event, FakeBackend};
    use std::sync::Arc;
    use std::time::Duration;

    fn signature() -> ConsentSignature {
        ConsentSignature::from_image_bytes(TINY_PNG).unwrap()
    }

    fn complete_form() -> RegistrationForm {
        let mut form = RegistrationForm::new();
        form.personal_info = PersonalInfo {
            full_name: "Thandi".into(),
            surname: "Nkosi".into(),
            date_of_birth: "1990-01-01".into(),
            id_number: "9001015800087".into(),
            email: "thandi@example.com".into(),
            phone: "0821234567".into(),
            sex: "Female".into(),
        };
        form.set_signature(signature());
        form.screening.height = "170".into();
        form.screening.weight = "70".into();
        form.screening.blood_pressure = "118 / 76".into();
        form.screening.glucose_type = "fasting".into();
        form.screening.glucose_level = "6.0".into();
        form
    }

    #[test]
    fn back_on_first_step_is_a_no_op() {
        let mut form = RegistrationForm::new();
        assert_eq!(form.back(), WizardStep::PersonalInfo);
        assert_eq!(form.step().index(), 0);
    }

    #[test]
    fn steps_move_by_exactly_one() {
        let mut form = complete_form();
        for expected in [
            WizardStep::MedicalAid,
            WizardStep::Consent,
            WizardStep::MedicalScreening,
            WizardStep::MentalHealth,
        ] {
            let before = form.step().index();
            assert_eq!(form.next().unwrap(), Advance::Moved(expected));
            assert_eq!(form.step().index(), before + 1);
        }

        assert_eq!(form.next().unwrap(), Advance::ReadyToSubmit);
        assert_eq!(form.step(), WizardStep::MentalHealth);

        assert_eq!(form.back(), WizardStep::MedicalScreening);
        assert_eq!(form.back(), WizardStep::Consent);
    }

    #[test]
    fn next_refuses_to_leave_an_invalid_step() {
        let mut form = complete_form();
        form.personal_info.id_number = "  ".into();
        let err = form.next().unwrap_err();
        assert_eq!(err.field, "idNumber");
        assert_eq!(form.step(), WizardStep::PersonalInfo);

        form.personal_info.id_number = "9001015800087".into();
        form.clear_signature();
        form.next().unwrap();
        form.next().unwrap();
        assert_eq!(form.next().unwrap_err().field, "consentSignature");
        assert_eq!(form.step(), WizardStep::Consent);
    }

    #[test]
    fn screening_fields_are_optional_but_must_parse() {
        let mut draft = ScreeningDraft::default();
        assert_eq!(draft.validate().unwrap(), MedicalInfo::default());
        assert_eq!(draft.bmi(), None);

        draft.height = "170".into();
        assert_eq!(draft.bmi(), None);
        draft.weight = "70".into();
        assert_eq!(draft.bmi(), Some(24.2));

        draft.blood_pressure = "high".into();
        assert_eq!(draft.validate().unwrap_err().field, "bloodPressure");
        draft.blood_pressure = String::new();

        draft.hiv_status = "maybe".into();
        assert_eq!(draft.validate().unwrap_err().field, "hivStatus");
        draft.hiv_status = "POSITIVE".into();

        draft.hba1c = "6.04".into();
        let info = draft.validate().unwrap();
        assert_eq!(info.bmi, Some(24.2));
        assert_eq!(info.hiv_status, Some(HivStatus::Positive));
        assert_eq!(info.hba1c, Some(6.0));
    }

    #[test]
    fn mental_health_rows_can_be_added_and_removed() {
        let mut form = RegistrationForm::new();
        assert_eq!(form.mental_health().len(), 2);

        let idx = form.add_question("Do you have someone to talk to?");
        assert!(form.answer_question(idx, "Yes"));
        assert_eq!(form.mental_health().len(), 3);

        assert!(form.remove_question(0).is_some());
        assert!(form.remove_question(0).is_some());
        assert!(form.remove_question(5).is_none());
        assert_eq!(form.mental_health()[0].answer, "Yes");

        form.remove_question(0);
        assert!(form.mental_health().is_empty());
        assert!(form.validate_step(WizardStep::MentalHealth).is_ok());
    }

    #[test]
    fn payload_carries_computed_bmi_and_trimmed_fields() {
        let mut form = complete_form();
        form.personal_info.full_name = "  Thandi ".into();
        form.medical_aid_details.scheme_name = Some("  ".into());
        let payload = form.to_payload(EventId::new("evt-1").unwrap()).unwrap();

        assert_eq!(payload.personal_info.full_name, "Thandi");
        assert_eq!(payload.medical_info.bmi, Some(24.2));
        assert_eq!(payload.medical_info.blood_pressure.as_deref(), Some("118/76"));
        assert_eq!(payload.medical_aid_details.scheme_name, None);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["eventId"], "evt-1");
        assert_eq!(value["medicalInfo"]["glucoseType"], "Fasting");
        assert!(value["consentSignature"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
        assert_eq!(value["mentalHealthAssessment"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn draft_loads_numbers_written_as_yaml_scalars() {
        let raw = serde_json::json!({
            "personalInfo": { "fullName": "Sipho", "idNumber": 8802025800081_u64 },
            "medicalInfo": { "height": 181, "weight": "90.5" }
        });
        let draft: RegistrationDraft = serde_json::from_value(raw).unwrap();
        let form = RegistrationForm::from_draft(draft);

        assert_eq!(form.personal_info.id_number, "8802025800081");
        assert_eq!(form.screening.height, "181");
        assert_eq!(form.mental_health().len(), 2);
        assert_eq!(form.step(), WizardStep::PersonalInfo);
    }

    #[tokio::test]
    async fn submit_requires_final_step_and_event() {
        let backend = Arc::new(FakeBackend::default());
        let workflow = RegistrationWorkflow::new(backend.clone(), RequestScope::new());
        let mut directory = PatientDirectory::new();
        let event = EventId::new("evt-1").unwrap();

        let mut form = complete_form();
        let err = workflow
            .submit(&mut form, Some(&event), &mut directory)
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::WizardIncomplete));

        form.advance_to_submit().unwrap();
        let err = workflow
            .submit(&mut form, None, &mut directory)
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::NoActiveEvent));
        assert!(backend.created_patients().is_empty());
    }

    #[tokio::test]
    async fn successful_submit_resets_form_and_refetches_list() {
        let backend = Arc::new(FakeBackend::default());
        let workflow = RegistrationWorkflow::new(backend.clone(), RequestScope::new());
        let mut directory = PatientDirectory::new();
        let event = EventId::new("evt-1").unwrap();

        let mut form = complete_form();
        form.advance_to_submit().unwrap();
        let created = workflow
            .submit(&mut form, Some(&event), &mut directory)
            .await
            .expect("registration succeeds");

        assert_eq!(created.personal_info.id_number, "9001015800087");
        assert_eq!(form, RegistrationForm::new());
        assert_eq!(backend.patient_fetches(), 1);
        assert_eq!(directory.patients().len(), 1);
        assert!(!workflow.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_submit_is_rejected_while_first_is_in_flight() {
        let backend = Arc::new(
            FakeBackend::with_event(sample_event("evt-1"))
                .with_submit_delay(Duration::from_millis(500)),
        );
        let workflow = RegistrationWorkflow::new(backend.clone(), RequestScope::new());
        let event_id = EventId::new("evt-1").unwrap();

        let mut first = complete_form();
        first.advance_to_submit().unwrap();
        let mut second = first.clone();
        let mut first_directory = PatientDirectory::new();
        let mut second_directory = PatientDirectory::new();

        let (first_result, second_result) = tokio::join!(
            workflow.submit(&mut first, Some(&event_id), &mut first_directory),
            workflow.submit(&mut second, Some(&event_id), &mut second_directory),
        );

        first_result.expect("first submission goes through");
        assert!(matches!(second_result, Err(IntakeError::SubmissionInProgress)));
        assert_eq!(backend.created_patients().len(), 1);
        assert_eq!(second.step(), WizardStep::MentalHealth);
        assert!(!workflow.is_submitting());
    }

    #[tokio::test]
    async fn failed_submit_preserves_the_form() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail_next_create(BackendError::Status {
            status: 409,
            message: Some("Patient with this ID number already exists".into()),
        });
        let workflow = RegistrationWorkflow::new(backend.clone(), RequestScope::new());
        let mut directory = PatientDirectory::new();
        let event = EventId::new("evt-1").unwrap();

        let mut form = complete_form();
        form.advance_to_submit().unwrap();
        let before = form.clone();

        let err = workflow
            .submit(&mut form, Some(&event), &mut directory)
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "Patient with this ID number already exists"
        );
        assert_eq!(form, before);
        assert_eq!(backend.patient_fetches(), 0);
    }
}
