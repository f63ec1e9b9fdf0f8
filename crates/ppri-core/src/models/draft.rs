use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::epds::{EPDS_ITEM_COUNT, EpdsAnswers, item_field, item_index};
use crate::error::CoreError;
use super::result::ClinicianRisk;

/// Care plans offered on the clinician summary step.
pub const PLAN_OPTIONS: [&str; 4] = [
    "Routine follow-up",
    "Early follow-up",
    "Refer to mental health specialist",
    "Emergency intervention",
];

/// A free-form questionnaire answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Blank text counts as unanswered.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
        }
    }

    /// Read this answer as the rating for EPDS item `index` (zero-based).
    /// Whole numbers and digit strings are accepted; the 0-3 range is left
    /// to [`EpdsAnswers::set`].
    pub fn epds_rating(&self, index: usize) -> Result<u8, CoreError> {
        let rating = match self {
            FieldValue::Number(n) if n.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(n) => {
                Some(*n as u8)
            }
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => s.trim().parse::<u8>().ok(),
        };
        rating.ok_or_else(|| CoreError::EpdsValueInvalid {
            item: index + 1,
            value: self.to_string(),
        })
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

/// Clinician judgment entered after the automated result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClinicianOverride {
    pub risk_level: Option<ClinicianRisk>,
    pub plan: String,
    pub notes: String,
}

impl ClinicianOverride {
    /// Form names of the fields required before saving, in form order.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.risk_level.is_none() {
            missing.push("clinician_risk".to_string());
        }
        if self.plan.trim().is_empty() {
            missing.push("plan".to_string());
        }
        missing
    }
}

/// Working record of one in-progress screening.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssessmentDraft {
    pub patient_name: String,
    /// Demographics, obstetric history and psychosocial answers keyed by
    /// form field name. The set of fields varies between form revisions.
    #[serde(default)]
    pub demographics: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub epds: EpdsAnswers,
    #[serde(default)]
    pub clinician_override: ClinicianOverride,
}

impl AssessmentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a form field holds a non-blank answer. Knows about
    /// `patient_name` and the `epds_N` items as well as demographics.
    pub fn has_answer(&self, field: &str) -> bool {
        if field == "patient_name" {
            return !self.patient_name.trim().is_empty();
        }
        if let Some(index) = item_index(field) {
            return self.epds.get(index).is_some();
        }
        self.demographics
            .get(field)
            .is_some_and(|value| !value.is_blank())
    }

    /// The complete answer set as one flat object: `patient_name`, every
    /// demographics field and `epds_1` … `epds_10` (unset items are null).
    pub fn answer_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert(
            "patient_name".to_string(),
            serde_json::Value::String(self.patient_name.clone()),
        );
        for (field, value) in &self.demographics {
            map.insert(field.clone(), value.to_json());
        }
        for index in 0..EPDS_ITEM_COUNT {
            let value = self
                .epds
                .get(index)
                .map(serde_json::Value::from)
                .unwrap_or(serde_json::Value::Null);
            map.insert(item_field(index), value);
        }
        map
    }
}
