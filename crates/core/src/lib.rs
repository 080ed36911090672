//! # Intake Core
//!
//! Core logic for nurse-side patient intake at corporate wellness events.
//!
//! This crate contains the domain model and the workflows that act on it:
//! - the nurse's assigned event, fetched once per session ([`EventSession`])
//! - the five-step patient registration wizard ([`RegistrationForm`])
//! - health metric classification for BMI, blood pressure, glucose and HbA1c
//! - referrals to external practitioners
//! - the paginated patient directory and aggregate health summary
//!
//! **No transport concerns**: HTTP lives in `intake-client`, which implements the [`Backend`]
//! trait defined here. Workflows are tested against an in-memory backend.

pub mod backend;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod event;
pub mod patient;
pub mod referral;
pub mod registration;
pub mod report;
pub mod signature;

pub(crate) mod wire;

#[cfg(test)]
mod test_support;

pub use backend::{Backend, BackendError, InFlight, RequestScope, GENERIC_FAILURE_MESSAGE};
pub use config::ClientConfig;
pub use directory::{PatientDirectory, PAGE_SIZE};
pub use error::{FieldError, IntakeError, IntakeResult};
pub use event::{AssignedEvent, EventSession, EventState, EventStatus, RetryPolicy};
pub use patient::{NewPatient, Patient};
pub use referral::{NewReferral, Referral, ReferralForm, ReferralWorkflow};
pub use registration::{
    Advance, RegistrationDraft, RegistrationForm, RegistrationWorkflow, WizardStep,
};
pub use report::HealthSummary;
pub use signature::ConsentSignature;
