//! Health metric classification.
//!
//! Pure functions mapping raw biometric values to ordinal risk categories and a display
//! colour. Every place that renders or aggregates a biometric goes through these functions;
//! thresholds live here and nowhere else.
//!
//! Missing, non-finite or unparseable input never errors. It resolves to the `Unknown`
//! variant of the relevant category so aggregate reports can count it in its own bucket.

use crate::patient::GlucoseType;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// BMI below this is underweight.
pub const BMI_UNDERWEIGHT_BELOW: f64 = 18.5;
/// BMI at or above this is overweight.
pub const BMI_OVERWEIGHT_FROM: f64 = 25.0;
/// BMI at or above this is obese.
pub const BMI_OBESE_FROM: f64 = 30.0;

pub const BP_NORMAL_SYSTOLIC_BELOW: u32 = 120;
pub const BP_NORMAL_DIASTOLIC_BELOW: u32 = 80;
pub const BP_ELEVATED_SYSTOLIC_BELOW: u32 = 139;
pub const BP_ELEVATED_DIASTOLIC_BELOW: u32 = 89;
pub const BP_HIGH_SYSTOLIC_FROM: u32 = 140;
pub const BP_HIGH_DIASTOLIC_FROM: u32 = 90;

/// Fasting glucose thresholds in mmol/L: (caution from, high from).
pub const GLUCOSE_FASTING: (f64, f64) = (5.6, 7.0);
/// Random and postprandial glucose thresholds in mmol/L: (caution from, high from).
pub const GLUCOSE_NON_FASTING: (f64, f64) = (7.8, 11.1);

pub const HBA1C_PREDIABETES_FROM: f64 = 5.7;
pub const HBA1C_DIABETES_FROM: f64 = 6.5;

static BLOOD_PRESSURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,3})\s*/\s*(\d{1,3})\s*$").expect("blood pressure pattern is valid")
});

/// Display colour attached to a classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Green,
    Yellow,
    Red,
    Gray,
}

impl RiskColor {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskColor::Green => "green",
            RiskColor::Yellow => "yellow",
            RiskColor::Red => "red",
            RiskColor::Gray => "gray",
        }
    }
}

impl std::fmt::Display for RiskColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common surface of every metric category.
pub trait Classification: Copy {
    /// Human-readable category label.
    fn label(self) -> &'static str;

    /// Colour used when the category is rendered.
    fn color(self) -> RiskColor;

    fn is_unknown(self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BmiCategory {
    Underweight,
    NormalWeight,
    Overweight,
    Obese,
    Unknown,
}

impl BmiCategory {
    pub const ALL: [BmiCategory; 5] = [
        BmiCategory::Underweight,
        BmiCategory::NormalWeight,
        BmiCategory::Overweight,
        BmiCategory::Obese,
        BmiCategory::Unknown,
    ];
}

impl Classification for BmiCategory {
    fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
            BmiCategory::Unknown => "Unknown",
        }
    }

    fn color(self) -> RiskColor {
        match self {
            BmiCategory::NormalWeight => RiskColor::Green,
            BmiCategory::Underweight | BmiCategory::Overweight => RiskColor::Yellow,
            BmiCategory::Obese => RiskColor::Red,
            BmiCategory::Unknown => RiskColor::Gray,
        }
    }

    fn is_unknown(self) -> bool {
        self == BmiCategory::Unknown
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BloodPressureCategory {
    Normal,
    Elevated,
    High,
    Unknown,
}

impl BloodPressureCategory {
    pub const ALL: [BloodPressureCategory; 4] = [
        BloodPressureCategory::Normal,
        BloodPressureCategory::Elevated,
        BloodPressureCategory::High,
        BloodPressureCategory::Unknown,
    ];
}

impl Classification for BloodPressureCategory {
    fn label(self) -> &'static str {
        match self {
            BloodPressureCategory::Normal => "Normal",
            BloodPressureCategory::Elevated => "Elevated",
            BloodPressureCategory::High => "High",
            BloodPressureCategory::Unknown => "Unknown",
        }
    }

    fn color(self) -> RiskColor {
        match self {
            BloodPressureCategory::Normal => RiskColor::Green,
            BloodPressureCategory::Elevated => RiskColor::Yellow,
            BloodPressureCategory::High => RiskColor::Red,
            BloodPressureCategory::Unknown => RiskColor::Gray,
        }
    }

    fn is_unknown(self) -> bool {
        self == BloodPressureCategory::Unknown
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GlucoseRisk {
    Normal,
    Caution,
    High,
    Unknown,
}

impl GlucoseRisk {
    pub const ALL: [GlucoseRisk; 4] = [
        GlucoseRisk::Normal,
        GlucoseRisk::Caution,
        GlucoseRisk::High,
        GlucoseRisk::Unknown,
    ];
}

impl Classification for GlucoseRisk {
    fn label(self) -> &'static str {
        match self {
            GlucoseRisk::Normal => "Normal",
            GlucoseRisk::Caution => "Caution",
            GlucoseRisk::High => "High risk",
            GlucoseRisk::Unknown => "Unknown",
        }
    }

    fn color(self) -> RiskColor {
        match self {
            GlucoseRisk::Normal => RiskColor::Green,
            GlucoseRisk::Caution => RiskColor::Yellow,
            GlucoseRisk::High => RiskColor::Red,
            GlucoseRisk::Unknown => RiskColor::Gray,
        }
    }

    fn is_unknown(self) -> bool {
        self == GlucoseRisk::Unknown
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Hba1cCategory {
    Normal,
    Prediabetes,
    Diabetes,
    Unknown,
}

impl Hba1cCategory {
    pub const ALL: [Hba1cCategory; 4] = [
        Hba1cCategory::Normal,
        Hba1cCategory::Prediabetes,
        Hba1cCategory::Diabetes,
        Hba1cCategory::Unknown,
    ];
}

impl Classification for Hba1cCategory {
    fn label(self) -> &'static str {
        match self {
            Hba1cCategory::Normal => "Normal",
            Hba1cCategory::Prediabetes => "Prediabetes",
            Hba1cCategory::Diabetes => "Diabetes",
            Hba1cCategory::Unknown => "Unknown",
        }
    }

    fn color(self) -> RiskColor {
        match self {
            Hba1cCategory::Normal => RiskColor::Green,
            Hba1cCategory::Prediabetes => RiskColor::Yellow,
            Hba1cCategory::Diabetes => RiskColor::Red,
            Hba1cCategory::Unknown => RiskColor::Gray,
        }
    }

    fn is_unknown(self) -> bool {
        self == Hba1cCategory::Unknown
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Computes BMI from height in centimetres and weight in kilograms.
///
/// The result is rounded to one decimal place. Returns `None` when either input is missing,
/// non-finite or not strictly positive.
pub fn calculate_bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<f64> {
    let height = finite(height_cm).filter(|h| *h > 0.0)?;
    let weight = finite(weight_kg).filter(|w| *w > 0.0)?;
    let metres = height / 100.0;
    Some(round_one_decimal(weight / (metres * metres)))
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn classify_bmi(bmi: Option<f64>) -> BmiCategory {
    match finite(bmi) {
        None => BmiCategory::Unknown,
        Some(v) if v < BMI_UNDERWEIGHT_BELOW => BmiCategory::Underweight,
        Some(v) if v < BMI_OVERWEIGHT_FROM => BmiCategory::NormalWeight,
        Some(v) if v < BMI_OBESE_FROM => BmiCategory::Overweight,
        Some(_) => BmiCategory::Obese,
    }
}

/// Extracts `(systolic, diastolic)` from a `"systolic/diastolic"` reading.
pub fn parse_blood_pressure(value: &str) -> Option<(u32, u32)> {
    let caps = BLOOD_PRESSURE_PATTERN.captures(value)?;
    let systolic = caps.get(1)?.as_str().parse().ok()?;
    let diastolic = caps.get(2)?.as_str().parse().ok()?;
    Some((systolic, diastolic))
}

/// Classifies a `"systolic/diastolic"` reading.
///
/// Readings that match none of the three buckets (for example a high systolic with a normal
/// diastolic) fall back to `Unknown`.
pub fn classify_blood_pressure(value: &str) -> BloodPressureCategory {
    let Some((systolic, diastolic)) = parse_blood_pressure(value) else {
        return BloodPressureCategory::Unknown;
    };

    if systolic < BP_NORMAL_SYSTOLIC_BELOW && diastolic < BP_NORMAL_DIASTOLIC_BELOW {
        BloodPressureCategory::Normal
    } else if systolic < BP_ELEVATED_SYSTOLIC_BELOW && diastolic < BP_ELEVATED_DIASTOLIC_BELOW {
        BloodPressureCategory::Elevated
    } else if systolic >= BP_HIGH_SYSTOLIC_FROM && diastolic >= BP_HIGH_DIASTOLIC_FROM {
        BloodPressureCategory::High
    } else {
        BloodPressureCategory::Unknown
    }
}

pub fn classify_glucose(kind: Option<GlucoseType>, value: Option<f64>) -> GlucoseRisk {
    let (Some(kind), Some(value)) = (kind, finite(value)) else {
        return GlucoseRisk::Unknown;
    };

    let (caution_from, high_from) = match kind {
        GlucoseType::Fasting => GLUCOSE_FASTING,
        GlucoseType::Random | GlucoseType::Postprandial => GLUCOSE_NON_FASTING,
    };

    if value >= high_from {
        GlucoseRisk::High
    } else if value >= caution_from {
        GlucoseRisk::Caution
    } else {
        GlucoseRisk::Normal
    }
}

pub fn classify_hba1c(value: Option<f64>) -> Hba1cCategory {
    match finite(value) {
        None => Hba1cCategory::Unknown,
        Some(v) if v < HBA1C_PREDIABETES_FROM => Hba1cCategory::Normal,
        Some(v) if v < HBA1C_DIABETES_FROM => Hba1cCategory::Prediabetes,
        Some(_) => Hba1cCategory::Diabetes,
    }
}
