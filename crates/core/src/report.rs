//! Aggregate health summary for an event's patients.

use crate::classifier::{
    BloodPressureCategory, BmiCategory, Classification, GlucoseRisk, Hba1cCategory, RiskColor,
};
use crate::patient::{HivStatus, Patient};
use serde::Serialize;
use std::collections::BTreeMap;

/// Label used for patients whose sex was left blank.
pub const UNSPECIFIED_SEX: &str = "Unspecified";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: &'static str,
    pub color: RiskColor,
    pub count: usize,
}

/// Counts for one metric. Buckets follow category order and always include `Unknown`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetricBreakdown {
    pub metric: &'static str,
    pub buckets: Vec<Bucket>,
}

impl MetricBreakdown {
    fn tally<C, F>(
        metric: &'static str,
        categories: &[C],
        patients: &[Patient],
        classify: F,
    ) -> Self
    where
        C: Classification + PartialEq,
        F: Fn(&Patient) -> C,
    {
        let mut buckets: Vec<Bucket> = categories
            .iter()
            .map(|c| Bucket {
                label: c.label(),
                color: c.color(),
                count: 0,
            })
            .collect();

        for patient in patients {
            let category = classify(patient);
            if let Some(pos) = categories.iter().position(|c| *c == category) {
                buckets[pos].count += 1;
            }
        }
        Self { metric, buckets }
    }

    pub fn count(&self, label: &str) -> usize {
        self.buckets
            .iter()
            .find(|b| b.label == label)
            .map_or(0, |b| b.count)
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub patients: usize,
    pub bmi: MetricBreakdown,
    pub blood_pressure: MetricBreakdown,
    pub glucose: MetricBreakdown,
    pub hba1c: MetricBreakdown,
    pub hiv_status: BTreeMap<HivStatus, usize>,
    pub hiv_unknown: usize,
    pub sex: BTreeMap<String, usize>,
}

impl HealthSummary {
    pub fn from_patients(patients: &[Patient]) -> Self {
        let mut hiv_status: BTreeMap<HivStatus, usize> =
            HivStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut hiv_unknown = 0;
        let mut sex = BTreeMap::new();

        for patient in patients {
            match patient.medical_info.hiv_status {
                Some(status) => *hiv_status.entry(status).or_default() += 1,
                None => hiv_unknown += 1,
            }

            let label = match patient.personal_info.sex.trim() {
                "" => UNSPECIFIED_SEX.to_string(),
                other => capitalise(other),
            };
            *sex.entry(label).or_insert(0) += 1;
        }

        Self {
            patients: patients.len(),
            bmi: MetricBreakdown::tally("BMI", &BmiCategory::ALL, patients, |p| {
                p.medical_info.bmi_category()
            }),
            blood_pressure: MetricBreakdown::tally(
                "Blood pressure",
                &BloodPressureCategory::ALL,
                patients,
                |p| p.medical_info.blood_pressure_category(),
            ),
            glucose: MetricBreakdown::tally("Glucose", &GlucoseRisk::ALL, patients, |p| {
                p.medical_info.glucose_risk()
            }),
            hba1c: MetricBreakdown::tally("HbA1c", &Hba1cCategory::ALL, patients, |p| {
                p.medical_info.hba1c_category()
            }),
            hiv_status,
            hiv_unknown,
            sex,
        }
    }

    /// The four biometric breakdowns in display order.
    pub fn metrics(&self) -> [&MetricBreakdown; 4] {
        [&self.bmi, &self.blood_pressure, &self.glucose, &self.hba1c]
    }
}

fn capitalise(value: &str) -> String {
    let lower = value.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
