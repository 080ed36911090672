//! Constants used throughout the intake core crate.
//!
//! Backend endpoint paths and configuration defaults live here so the client and the CLI agree
//! on them.

/// Backend used when `INTAKE_API_BASE_URL` is not set.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Re-fetches of the assigned event after the login race, before giving up.
pub const DEFAULT_EVENT_RETRY_ATTEMPTS: u32 = 3;

pub const DEFAULT_EVENT_RETRY_DELAY_MS: u64 = 1_000;

pub const ENV_API_BASE_URL: &str = "INTAKE_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "INTAKE_REQUEST_TIMEOUT_SECS";
pub const ENV_SESSION_COOKIE: &str = "INTAKE_SESSION_COOKIE";
pub const ENV_EVENT_RETRY_ATTEMPTS: &str = "INTAKE_EVENT_RETRY_ATTEMPTS";
pub const ENV_EVENT_RETRY_DELAY_MS: &str = "INTAKE_EVENT_RETRY_DELAY_MS";

pub const NEXT_NURSE_EVENT_PATH: &str = "/api/v1/events/nurse/next";
pub const PATIENTS_PATH: &str = "/api/v1/patients";
/// Followed by `/{event_id}`.
pub const PATIENTS_BY_EVENT_PATH: &str = "/api/v1/patients/event";
/// The backend spells the resource `refferals`.
pub const REFERRALS_PATH: &str = "/api/v1/refferals";
/// Followed by `/{event_id}`.
pub const REFERRALS_BY_EVENT_PATH: &str = "/api/v1/refferals/event";
