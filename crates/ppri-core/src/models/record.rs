use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::clinician::Clinician;
use super::draft::AssessmentDraft;
use super::result::{AssessmentResult, ClinicianRisk, RiskLevel};

/// A finalized screening, ready for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssessmentRecord {
    pub patient_name: String,
    pub risk_level: RiskLevel,
    /// Reported score: model score when a prediction was used, else the EPDS total.
    pub score: f64,
    /// `score` came from a predictive model rather than the EPDS sum.
    #[serde(default)]
    pub predicted: bool,
    pub epds_total: u8,
    pub safety_flag: bool,
    pub clinician_risk: ClinicianRisk,
    pub plan: String,
    pub notes: String,
    /// Email of the clinician who saved the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinician: Option<String>,
    pub timestamp: jiff::Timestamp,
    /// Every questionnaire answer, keyed by form field name.
    pub raw_data: serde_json::Value,
}

impl AssessmentRecord {
    /// Combine a draft, its result and the clinician's override. Returns
    /// `None` while the override has no risk level.
    pub fn finalize(
        draft: &AssessmentDraft,
        result: &AssessmentResult,
        clinician: Option<&Clinician>,
        timestamp: jiff::Timestamp,
    ) -> Option<Self> {
        let clinician_risk = draft.clinician_override.risk_level?;
        Some(Self {
            patient_name: draft.patient_name.trim().to_string(),
            risk_level: result.risk_level,
            score: result.reported_score(),
            predicted: result.prediction.is_some(),
            epds_total: result.total_score,
            safety_flag: result.safety_flag,
            clinician_risk,
            plan: draft.clinician_override.plan.trim().to_string(),
            notes: draft.clinician_override.notes.clone(),
            clinician: clinician.map(|c| c.email.clone()),
            timestamp,
            raw_data: serde_json::Value::Object(draft.answer_map()),
        })
    }
}

/// A record as returned by persistence, with its assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SavedRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub record: AssessmentRecord,
}
