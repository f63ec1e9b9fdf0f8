//! Drives one screening through the questionnaire from a prepared answer
//! file, the way a clinician would step through the form.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ppri_core::models::draft::{ClinicianOverride, FieldValue};
use ppri_core::models::epds::EPDS_ITEM_COUNT;
use ppri_core::models::record::SavedRecord;
use ppri_core::models::result::AssessmentResult;
use ppri_instruments::safety::SafetyAlert;
use ppri_wizard::Questionnaire;
use ppri_wizard::collaborator::{AssessmentStore, StaticIdentity};
use ppri_wizard::predictor::ScaledEpdsPredictor;
use ppri_wizard::state::Phase;
use ppri_wizard::step::Step;

use crate::config::{PpriConfig, ScoringMode};

/// Contents of an answer file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreeningInput {
    pub patient_name: String,
    /// Every other questionnaire answer, keyed by form field name.
    #[serde(default)]
    pub answers: BTreeMap<String, FieldValue>,
    /// EPDS items 1–10 in order, each 0–3.
    pub epds: Vec<u8>,
    #[serde(default)]
    pub summary: ClinicianOverride,
}

impl ScreeningInput {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read answers at {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Keys of `answers` that no questionnaire step reads.
    pub fn ignored_answers(&self) -> Vec<&str> {
        self.answers
            .keys()
            .map(String::as_str)
            .filter(|key| !Step::ALL.iter().any(|step| answer_fields(*step).contains(key)))
            .collect()
    }
}

/// Fields taken from `answers` on a step. EPDS items come from `epds` and
/// the summary from `summary`, never from `answers`.
fn answer_fields(step: Step) -> &'static [&'static str] {
    if step.is_questionnaire() && step != Step::Epds {
        step.fields()
    } else {
        &[]
    }
}

/// What a completed screening produced.
#[derive(Debug, Clone)]
pub struct ScreeningOutcome {
    pub result: AssessmentResult,
    /// The alert as raised, before acknowledgement.
    pub alert: Option<SafetyAlert>,
    pub saved: SavedRecord,
}

pub fn build_questionnaire(config: &PpriConfig, store: Arc<dyn AssessmentStore>) -> Questionnaire {
    let mut questionnaire = Questionnaire::new(store);
    if config.scoring == ScoringMode::ScaledEpds {
        questionnaire = questionnaire.with_predictor(Arc::new(ScaledEpdsPredictor));
    }
    if let Some(clinician) = &config.clinician {
        questionnaire = questionnaire.with_identity(Arc::new(StaticIdentity(clinician.clone())));
    }
    questionnaire
}

/// Step through the form, generate the result, acknowledge any alert and
/// save. The alert is acknowledged on the caller's behalf once it has been
/// captured in the outcome.
pub async fn run(
    questionnaire: &mut Questionnaire,
    input: &ScreeningInput,
) -> eyre::Result<ScreeningOutcome> {
    if input.epds.len() != EPDS_ITEM_COUNT {
        return Err(eyre::eyre!(
            "expected {EPDS_ITEM_COUNT} EPDS answers, got {}",
            input.epds.len()
        ));
    }

    let ignored = input.ignored_answers();
    if !ignored.is_empty() {
        tracing::warn!(fields = ?ignored, "ignoring answers for unknown fields");
    }

    questionnaire.set_patient_name(input.patient_name.as_str())?;
    while let Phase::Collecting(step) = questionnaire.phase() {
        for field in answer_fields(step) {
            if let Some(value) = input.answers.get(*field) {
                questionnaire.set_field(*field, value.clone())?;
            }
        }
        if step == Step::Epds {
            for (index, value) in input.epds.iter().enumerate() {
                questionnaire.set_epds(index, *value)?;
            }
            break;
        }
        questionnaire.go_next()?;
    }

    let result = *questionnaire.generate().await?;
    let alert = questionnaire.safety_alert().cloned();
    if alert.is_some() {
        questionnaire.acknowledge_alert();
    }

    questionnaire.proceed_to_summary()?;
    if let Some(risk) = input.summary.risk_level {
        questionnaire.set_clinician_risk(risk)?;
    }
    questionnaire.set_plan(input.summary.plan.as_str())?;
    questionnaire.set_notes(input.summary.notes.as_str())?;

    let saved = questionnaire.save().await?.clone();
    Ok(ScreeningOutcome {
        result,
        alert,
        saved,
    })
}
