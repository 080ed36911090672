//! Patient data model.
//!
//! Wire-compatible (camelCase JSON) representation of patients registered at an event, plus
//! the payload posted by the registration wizard.
//!
//! Records coming back from the backend are read leniently: numeric fields accept numbers,
//! numeric strings, empty strings or null, and enum fields accept any casing. Values that do
//! not parse become `None` and classify as unknown rather than failing the whole list.

use crate::classifier::{
    self, BloodPressureCategory, BmiCategory, Classification, GlucoseRisk, Hba1cCategory,
    RiskColor,
};
use crate::signature::ConsentSignature;
use intake_types::EventId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HivStatus {
    Negative,
    Positive,
    Inconclusive,
}

impl HivStatus {
    pub const ALL: [HivStatus; 3] = [
        HivStatus::Negative,
        HivStatus::Positive,
        HivStatus::Inconclusive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HivStatus::Negative => "Negative",
            HivStatus::Positive => "Positive",
            HivStatus::Inconclusive => "Inconclusive",
        }
    }
}

impl FromStr for HivStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative" => Ok(HivStatus::Negative),
            "positive" => Ok(HivStatus::Positive),
            "inconclusive" => Ok(HivStatus::Inconclusive),
            other => Err(format!("unknown HIV status '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlucoseType {
    Fasting,
    Random,
    Postprandial,
}

impl GlucoseType {
    pub fn as_str(self) -> &'static str {
        match self {
            GlucoseType::Fasting => "Fasting",
            GlucoseType::Random => "Random",
            GlucoseType::Postprandial => "Postprandial",
        }
    }
}

impl FromStr for GlucoseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fasting" => Ok(GlucoseType::Fasting),
            "random" => Ok(GlucoseType::Random),
            "postprandial" => Ok(GlucoseType::Postprandial),
            other => Err(format!("unknown glucose type '{other}'")),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub full_name: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub surname: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub date_of_birth: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub id_number: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub email: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub phone: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub sex: String,
}

impl PersonalInfo {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.full_name.trim(), self.surname.trim())
            .trim()
            .to_string()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalAidDetails {
    #[serde(
        deserialize_with = "crate::wire::lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheme_name: Option<String>,
    #[serde(
        deserialize_with = "crate::wire::lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub plan_option: Option<String>,
    #[serde(
        deserialize_with = "crate::wire::lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub membership_number: Option<String>,
    #[serde(
        deserialize_with = "crate::wire::lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub main_member_name: Option<String>,
    #[serde(
        deserialize_with = "crate::wire::lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub main_member_address: Option<String>,
    #[serde(
        deserialize_with = "crate::wire::lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub dependent_code: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalInfo {
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<f64>,
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub bmi: Option<f64>,
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub blood_pressure: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub cholesterol: Option<f64>,
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_choice",
        skip_serializing_if = "Option::is_none"
    )]
    pub hiv_status: Option<HivStatus>,
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_choice",
        skip_serializing_if = "Option::is_none"
    )]
    pub glucose_type: Option<GlucoseType>,
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub glucose_level: Option<f64>,
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub hba1c: Option<f64>,
}

/// One classified biometric, ready for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricReading {
    pub metric: &'static str,
    pub value: Option<String>,
    pub category: &'static str,
    pub color: RiskColor,
}

impl MedicalInfo {
    /// Stored BMI, or one derived from height and weight when the record has none.
    pub fn effective_bmi(&self) -> Option<f64> {
        self.bmi
            .filter(|v| v.is_finite())
            .or_else(|| classifier::calculate_bmi(self.height, self.weight))
    }

    pub fn bmi_category(&self) -> BmiCategory {
        classifier::classify_bmi(self.effective_bmi())
    }

    pub fn blood_pressure_category(&self) -> BloodPressureCategory {
        self.blood_pressure
            .as_deref()
            .map(classifier::classify_blood_pressure)
            .unwrap_or(BloodPressureCategory::Unknown)
    }

    pub fn glucose_risk(&self) -> GlucoseRisk {
        classifier::classify_glucose(self.glucose_type, self.glucose_level)
    }

    pub fn hba1c_category(&self) -> Hba1cCategory {
        classifier::classify_hba1c(self.hba1c)
    }

    /// The four classified metrics in display order.
    pub fn readings(&self) -> Vec<MetricReading> {
        fn reading<C: Classification>(
            metric: &'static str,
            value: Option<String>,
            class: C,
        ) -> MetricReading {
            MetricReading {
                metric,
                value,
                category: class.label(),
                color: class.color(),
            }
        }

        let glucose_value = self.glucose_level.map(|level| match self.glucose_type {
            Some(kind) => format!("{level} mmol/L ({})", kind.as_str()),
            None => format!("{level} mmol/L"),
        });

        vec![
            reading(
                "BMI",
                self.effective_bmi().map(|b| format!("{b:.1}")),
                self.bmi_category(),
            ),
            reading(
                "Blood pressure",
                self.blood_pressure.clone(),
                self.blood_pressure_category(),
            ),
            reading("Glucose", glucose_value, self.glucose_risk()),
            reading(
                "HbA1c",
                self.hba1c.map(|v| format!("{v:.1}%")),
                self.hba1c_category(),
            ),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentalHealthEntry {
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub question: String,
    #[serde(deserialize_with = "crate::wire::scalar_text")]
    pub answer: String,
}

impl MentalHealthEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A patient as returned by the backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "crate::wire::lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_reference",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_id: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_default")]
    pub personal_info: PersonalInfo,
    #[serde(default, deserialize_with = "crate::wire::null_default")]
    pub medical_aid_details: MedicalAidDetails,
    #[serde(default, deserialize_with = "crate::wire::null_default")]
    pub medical_info: MedicalInfo,
    #[serde(default, deserialize_with = "crate::wire::null_default")]
    pub mental_health_assessment: Vec<MentalHealthEntry>,
    #[serde(
        default,
        deserialize_with = "crate::wire::lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub consent_signature: Option<String>,
}

/// Payload posted to create a patient.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub event_id: EventId,
    pub personal_info: PersonalInfo,
    pub medical_info: MedicalInfo,
    pub medical_aid_details: MedicalAidDetails,
    pub mental_health_assessment: Vec<MentalHealthEntry>,
    pub consent_signature: ConsentSignature,
}
