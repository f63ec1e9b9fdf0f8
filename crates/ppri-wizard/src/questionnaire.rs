use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use ppri_audit::{AuditAction, AuditEvent};
use ppri_core::models::draft::{AssessmentDraft, FieldValue, PLAN_OPTIONS};
use ppri_core::models::epds::{item_field, item_index};
use ppri_core::models::record::{AssessmentRecord, SavedRecord};
use ppri_core::models::result::{AssessmentResult, ClinicianRisk};
use ppri_instruments::engine;
use ppri_instruments::safety::SafetyAlert;

use crate::collaborator::{AssessmentStore, IdentityProvider, Predictor};
use crate::error::{ValidationError, WizardError};
use crate::state::{Phase, WizardState};
use crate::step::Step;

const RESOURCE_TYPE: &str = "assessment";

/// One screening session: the draft, its navigation state and the latest
/// generated result.
///
/// Every transition takes `&mut self`, so a second `generate` or `save`
/// cannot start while one is awaiting its collaborator. State is only
/// committed once the collaborator has answered.
pub struct Questionnaire {
    draft_id: Uuid,
    draft: AssessmentDraft,
    state: WizardState,
    result: Option<AssessmentResult>,
    alert: Option<SafetyAlert>,
    generation: u64,
    saved: Option<SavedRecord>,
    store: Arc<dyn AssessmentStore>,
    predictor: Option<Arc<dyn Predictor>>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl Questionnaire {
    pub fn new(store: Arc<dyn AssessmentStore>) -> Self {
        Self {
            draft_id: Uuid::new_v4(),
            draft: AssessmentDraft::new(),
            state: WizardState::default(),
            result: None,
            alert: None,
            generation: 0,
            saved: None,
            store,
            predictor: None,
            identity: None,
        }
    }

    /// Use an external model for the risk tier.
    pub fn with_predictor(mut self, predictor: Arc<dyn Predictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn draft_id(&self) -> Uuid {
        self.draft_id
    }

    pub fn draft(&self) -> &AssessmentDraft {
        &self.draft
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    /// Number of results generated for this draft so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn safety_alert(&self) -> Option<&SafetyAlert> {
        self.alert.as_ref()
    }

    /// The alert if it should interrupt the clinician right now.
    pub fn alert_to_show(&self) -> Option<&SafetyAlert> {
        self.alert.as_ref().filter(|a| a.should_show())
    }

    pub fn saved_record(&self) -> Option<&SavedRecord> {
        self.saved.as_ref()
    }

    pub fn is_frozen(&self) -> bool {
        self.state.phase == Phase::Saved
    }

    // ── answers ───────────────────────────────────────────────────────

    pub fn set_patient_name(&mut self, name: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_collecting("edit answers")?;
        self.draft.patient_name = name.into();
        Ok(())
    }

    /// Set a questionnaire answer by form field name. `patient_name` goes to
    /// the draft's name and `epds_N` to the EPDS slot, which must receive a
    /// whole-number rating in 0-3.
    pub fn set_field(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<(), WizardError> {
        self.ensure_collecting("edit answers")?;
        let field = field.into();
        let value = value.into();
        if let Some(index) = item_index(&field) {
            let rating = value.epds_rating(index)?;
            self.draft.epds.set(index, rating)?;
        } else if field == "patient_name" {
            self.draft.patient_name = value.to_string();
        } else {
            self.draft.demographics.insert(field, value);
        }
        Ok(())
    }

    pub fn clear_field(&mut self, field: &str) -> Result<(), WizardError> {
        self.ensure_collecting("edit answers")?;
        if let Some(index) = item_index(field) {
            self.draft.epds.clear(index)?;
        } else if field == "patient_name" {
            self.draft.patient_name.clear();
        } else {
            self.draft.demographics.remove(field);
        }
        Ok(())
    }

    /// Answer EPDS item `index` (zero-based) with a value in 0–3.
    pub fn set_epds(&mut self, index: usize, value: u8) -> Result<(), WizardError> {
        self.ensure_collecting("edit answers")?;
        self.draft.epds.set(index, value)?;
        Ok(())
    }

    pub fn clear_epds(&mut self, index: usize) -> Result<(), WizardError> {
        self.ensure_collecting("edit answers")?;
        self.draft.epds.clear(index)?;
        Ok(())
    }

    // ── clinician override ────────────────────────────────────────────

    pub fn set_clinician_risk(&mut self, risk: ClinicianRisk) -> Result<(), WizardError> {
        self.ensure_summary("edit the clinician summary")?;
        self.draft.clinician_override.risk_level = Some(risk);
        Ok(())
    }

    /// Choose one of [`PLAN_OPTIONS`]. A blank plan clears the choice.
    pub fn set_plan(&mut self, plan: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_summary("edit the clinician summary")?;
        let plan = plan.into();
        let plan = plan.trim();
        if !plan.is_empty() && !PLAN_OPTIONS.contains(&plan) {
            return Err(WizardError::UnknownPlan(plan.to_string()));
        }
        self.draft.clinician_override.plan = plan.to_string();
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_summary("edit the clinician summary")?;
        self.draft.clinician_override.notes = notes.into();
        Ok(())
    }

    // ── validation ────────────────────────────────────────────────────

    /// Required fields of `step` that are still unanswered.
    pub fn missing_fields(&self, step: Step) -> Vec<String> {
        if step == Step::ClinicianSummary {
            return self.draft.clinician_override.missing_fields();
        }
        step.required_fields()
            .iter()
            .filter(|field| !self.draft.has_answer(field))
            .map(|field| field.to_string())
            .collect()
    }

    fn validate_step(&self, step: Step) -> Result<(), ValidationError> {
        let missing = self.missing_fields(step);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    fn validate_questionnaire(&self) -> Result<(), ValidationError> {
        let missing: Vec<String> = Step::ALL
            .iter()
            .filter(|s| s.is_questionnaire())
            .flat_map(|s| self.missing_fields(*s))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    // ── navigation ────────────────────────────────────────────────────

    /// Advance one step. The current step's required fields must be
    /// answered. Leaving the EPDS step needs [`Self::generate`].
    pub fn go_next(&mut self) -> Result<Phase, WizardError> {
        match self.state.phase {
            Phase::Collecting(step) => {
                self.validate_step(step)?;
                let Some(next) = step.next().filter(|s| s.is_questionnaire()) else {
                    return Err(WizardError::GenerateRequired);
                };
                self.state.enter(Phase::Collecting(next));
                Ok(self.state.phase)
            }
            Phase::ResultReady => self.proceed_to_summary(),
            Phase::Saved => Err(WizardError::Frozen),
            phase => Err(WizardError::NotAllowed {
                action: "go to the next step",
                phase,
            }),
        }
    }

    /// Step back once. Leaving the result or summary discards the result so
    /// it can never be shown against edited answers.
    pub fn go_back(&mut self) -> Result<Phase, WizardError> {
        let phase = self.state.phase;
        match phase {
            Phase::Collecting(step) => {
                let previous = step.previous().ok_or(WizardError::NotAllowed {
                    action: "go back",
                    phase,
                })?;
                self.state.enter(Phase::Collecting(previous));
            }
            Phase::ResultPending | Phase::ResultReady | Phase::Summary => {
                self.discard_result();
                self.state.enter(Phase::Collecting(Step::Epds));
            }
            Phase::Saved => return Err(WizardError::Frozen),
        }
        Ok(self.state.phase)
    }

    /// Jump to a step by index. Only visited steps and the step right after
    /// the current one are reachable; the result is never a jump target.
    pub fn jump_to(&mut self, index: usize) -> Result<Phase, WizardError> {
        let target = Step::from_index(index).ok_or(WizardError::UnknownStep(index))?;
        let phase = self.state.phase;
        if phase == Phase::Saved {
            return Err(WizardError::Frozen);
        }

        let current = self.state.current_step();
        if target == current {
            return Ok(phase);
        }

        match target {
            Step::Result => return Err(WizardError::GenerateRequired),
            Step::ClinicianSummary if phase == Phase::ResultReady => {
                return self.proceed_to_summary();
            }
            Step::ClinicianSummary => return Err(WizardError::StepNotReachable(target)),
            _ => {}
        }

        let next_in_line = target.index() == current.index() + 1;
        if !self.state.is_visited(target) && !next_in_line {
            return Err(WizardError::StepNotReachable(target));
        }

        if let Phase::Collecting(step) = phase
            && target > step
        {
            self.validate_step(step)?;
        }

        if matches!(
            phase,
            Phase::ResultPending | Phase::ResultReady | Phase::Summary
        ) {
            self.discard_result();
        }
        self.state.enter(Phase::Collecting(target));
        Ok(self.state.phase)
    }

    /// Score the EPDS answers and show the result.
    ///
    /// Fails with a validation error, leaving the state untouched, while any
    /// required answer is missing. With a predictor configured the model's
    /// tier replaces the local one; the safety flag stays local.
    pub async fn generate(&mut self) -> Result<&AssessmentResult, WizardError> {
        let phase = self.state.phase;
        match phase {
            Phase::Collecting(Step::Epds) | Phase::ResultPending => {}
            Phase::Saved => return Err(WizardError::Frozen),
            phase => {
                return Err(WizardError::NotAllowed {
                    action: "generate a result",
                    phase,
                });
            }
        }

        self.validate_questionnaire()?;
        let answers = self.draft.epds.values().ok_or_else(|| ValidationError {
            missing: self.draft.epds.unanswered().into_iter().map(item_field).collect(),
        })?;
        let mut result = engine::score(&answers)?;

        if let Some(predictor) = self.predictor.clone() {
            self.state.phase = Phase::ResultPending;
            match predictor.predict(self.draft.answer_map()).await {
                Ok(prediction) => result = engine::apply_prediction(result, prediction),
                Err(e) => {
                    warn!(draft = %self.draft_id, error = %e, "prediction failed");
                    self.state.phase = Phase::Collecting(Step::Epds);
                    return Err(e.into());
                }
            }
        }

        self.generation += 1;
        self.alert = SafetyAlert::evaluate(&answers, &result, self.generation);
        self.state.enter(Phase::ResultReady);

        info!(
            draft = %self.draft_id,
            generation = self.generation,
            total_score = result.total_score,
            risk_level = %result.risk_level,
            safety_flag = result.safety_flag,
            "result generated"
        );
        self.audit(AuditAction::GenerateResult)
            .with_details(serde_json::json!({
                "generation": self.generation,
                "risk_level": result.risk_level,
                "safety_flag": result.safety_flag,
                "predicted": result.prediction.is_some(),
            }))
            .emit();

        Ok(&*self.result.insert(result))
    }

    /// Dismiss the safety alert for the current result. Returns whether an
    /// unacknowledged alert was dismissed.
    pub fn acknowledge_alert(&mut self) -> bool {
        let Some(alert) = self.alert.as_mut().filter(|a| a.should_show()) else {
            return false;
        };
        alert.acknowledge();
        let generation = alert.generation;
        self.audit(AuditAction::AcknowledgeAlert)
            .with_details(serde_json::json!({ "generation": generation }))
            .emit();
        true
    }

    pub fn proceed_to_summary(&mut self) -> Result<Phase, WizardError> {
        match self.state.phase {
            Phase::ResultReady if self.result.is_some() => {
                self.state.enter(Phase::Summary);
                Ok(self.state.phase)
            }
            Phase::Saved => Err(WizardError::Frozen),
            phase => Err(WizardError::NotAllowed {
                action: "proceed to the summary",
                phase,
            }),
        }
    }

    /// Persist the draft, result and clinician override.
    ///
    /// Requires a clinician risk level and a plan. On a store failure the
    /// questionnaire stays in the summary with every answer intact, so the
    /// call can simply be retried.
    pub async fn save(&mut self) -> Result<&SavedRecord, WizardError> {
        let phase = self.state.phase;
        match phase {
            Phase::Summary => {}
            Phase::Saved => return Err(WizardError::Frozen),
            phase => return Err(WizardError::NotAllowed { action: "save", phase }),
        }

        self.validate_step(Step::ClinicianSummary)?;
        let result = self
            .result
            .as_ref()
            .ok_or(WizardError::NotAllowed { action: "save", phase })?;
        let clinician = self.identity.as_ref().and_then(|i| i.current_clinician());
        let record = AssessmentRecord::finalize(
            &self.draft,
            result,
            clinician.as_ref(),
            jiff::Timestamp::now(),
        )
        .ok_or_else(|| ValidationError {
            missing: vec!["clinician_risk".to_string()],
        })?;

        let saved = self.store.save(record).await.inspect_err(|e| {
            warn!(draft = %self.draft_id, error = %e, "saving assessment failed");
        })?;

        self.state.enter(Phase::Saved);
        info!(draft = %self.draft_id, id = %saved.id, "assessment saved");
        self.audit(AuditAction::SaveAssessment)
            .with_details(serde_json::json!({ "record_id": saved.id }))
            .emit();

        Ok(&*self.saved.insert(saved))
    }

    /// Discard everything and start a new, empty draft.
    pub fn reset(&mut self) {
        if self.state.phase != Phase::Saved {
            self.audit(AuditAction::DiscardDraft).emit();
        }
        self.draft_id = Uuid::new_v4();
        self.draft = AssessmentDraft::new();
        self.state = WizardState::default();
        self.result = None;
        self.alert = None;
        self.generation = 0;
        self.saved = None;
    }

    fn discard_result(&mut self) {
        if self.result.take().is_some() {
            info!(draft = %self.draft_id, "stale result discarded");
        }
        self.alert = None;
    }

    fn ensure_collecting(&self, action: &'static str) -> Result<(), WizardError> {
        match self.state.phase {
            Phase::Collecting(_) => Ok(()),
            Phase::Saved => Err(WizardError::Frozen),
            phase => Err(WizardError::NotAllowed { action, phase }),
        }
    }

    fn ensure_summary(&self, action: &'static str) -> Result<(), WizardError> {
        match self.state.phase {
            Phase::Summary => Ok(()),
            Phase::Saved => Err(WizardError::Frozen),
            phase => Err(WizardError::NotAllowed { action, phase }),
        }
    }

    fn audit(&self, action: AuditAction) -> AuditEvent {
        let actor = self
            .identity
            .as_ref()
            .and_then(|i| i.current_clinician())
            .map(|c| c.email);
        AuditEvent::new(
            action,
            RESOURCE_TYPE,
            self.draft_id.to_string(),
            actor.as_deref(),
        )
    }
}
