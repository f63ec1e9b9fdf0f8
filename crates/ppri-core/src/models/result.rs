use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Automated risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
        }
    }

    /// Parse the wire label used by prediction services (`"High Risk"`).
    /// Bare tier names (`"high"`, `"moderate"`, `"medium"`) are accepted too.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let tier = normalized.strip_suffix(" risk").unwrap_or(&normalized);
        match tier {
            "low" => Some(RiskLevel::Low),
            "moderate" | "medium" => Some(RiskLevel::Moderate),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The clinician's own risk judgment, recorded alongside the automated tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClinicianRisk {
    Low,
    Medium,
    High,
}

impl ClinicianRisk {
    pub fn label(&self) -> &'static str {
        match self {
            ClinicianRisk::Low => "Low",
            ClinicianRisk::Medium => "Medium",
            ClinicianRisk::High => "High",
        }
    }

    /// The automated tier this judgment corresponds to.
    pub fn as_risk_level(&self) -> RiskLevel {
        match self {
            ClinicianRisk::Low => RiskLevel::Low,
            ClinicianRisk::Medium => RiskLevel::Moderate,
            ClinicianRisk::High => RiskLevel::High,
        }
    }
}

impl fmt::Display for ClinicianRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Response of an external predictive model. Its scale depends on the
/// deployment (0–100 for the model service, 0–30 for raw EPDS).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Prediction {
    pub score: f64,
    pub risk_level: RiskLevel,
}

/// Output of one "generate result" action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssessmentResult {
    /// Sum of the ten EPDS items, 0–30.
    pub total_score: u8,
    pub risk_level: RiskLevel,
    /// Immediate clinical attention is warranted.
    pub safety_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
}

impl AssessmentResult {
    /// The score shown to clinicians and persisted: the model score when a
    /// prediction is attached, otherwise the EPDS total.
    pub fn reported_score(&self) -> f64 {
        match self.prediction {
            Some(p) => p.score,
            None => f64::from(self.total_score),
        }
    }
}
