use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ppri_core::error::CoreError;
use ppri_core::models::clinician::Clinician;
use ppri_core::models::record::{AssessmentRecord, SavedRecord};
use ppri_core::models::result::{ClinicianRisk, Prediction, RiskLevel};
use ppri_wizard::collaborator::{
    AssessmentStore, BoxFuture, CollaboratorError, PredictionRequest, Predictor, StaticIdentity,
};
use ppri_wizard::error::WizardError;
use ppri_wizard::memory::MemoryStore;
use ppri_wizard::predictor::ScaledEpdsPredictor;
use ppri_wizard::state::Phase;
use ppri_wizard::step::Step;
use ppri_wizard::Questionnaire;

/// Fails the first `failures` saves, then delegates to a memory store.
struct FlakyStore {
    failures: AtomicUsize,
    inner: MemoryStore,
}

impl FlakyStore {
    fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            inner: MemoryStore::new(),
        }
    }
}

impl AssessmentStore for FlakyStore {
    fn save(&self, record: AssessmentRecord) -> BoxFuture<'_, Result<SavedRecord, CollaboratorError>> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Box::pin(async {
                Err(CollaboratorError::Status {
                    service: "assessments".to_string(),
                    code: 503,
                })
            });
        }
        self.inner.save(record)
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<SavedRecord>, CollaboratorError>> {
        self.inner.list()
    }

    fn delete(&self, id: uuid::Uuid) -> BoxFuture<'_, Result<SavedRecord, CollaboratorError>> {
        self.inner.delete(id)
    }

    fn clear(&self) -> BoxFuture<'_, Result<usize, CollaboratorError>> {
        self.inner.clear()
    }
}

struct DownPredictor;

impl Predictor for DownPredictor {
    fn predict(
        &self,
        _request: PredictionRequest,
    ) -> BoxFuture<'_, Result<Prediction, CollaboratorError>> {
        Box::pin(async { Err(CollaboratorError::Prediction("connection refused".to_string())) })
    }
}

/// Never answers the first `stalls` requests, then scores like the
/// reference predictor.
struct StallingPredictor {
    stalls: AtomicUsize,
}

impl Predictor for StallingPredictor {
    fn predict(
        &self,
        request: PredictionRequest,
    ) -> BoxFuture<'_, Result<Prediction, CollaboratorError>> {
        let remaining = self.stalls.load(Ordering::SeqCst);
        if remaining > 0 {
            self.stalls.store(remaining - 1, Ordering::SeqCst);
            return Box::pin(std::future::pending());
        }
        ScaledEpdsPredictor.predict(request)
    }
}

fn questionnaire() -> (Questionnaire, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Questionnaire::new(store.clone()), store)
}

fn advance_to_epds(q: &mut Questionnaire) {
    q.set_patient_name("Asha Rao").unwrap();
    q.set_field("age", 29u32).unwrap();
    for _ in 0..5 {
        q.go_next().unwrap();
    }
    assert_eq!(q.phase(), Phase::Collecting(Step::Epds));
}

fn answer_epds(q: &mut Questionnaire, values: [u8; 10]) {
    for (index, value) in values.into_iter().enumerate() {
        q.set_epds(index, value).unwrap();
    }
}

async fn advance_to_summary(q: &mut Questionnaire, values: [u8; 10]) {
    advance_to_epds(q);
    answer_epds(q, values);
    q.generate().await.unwrap();
    q.proceed_to_summary().unwrap();
}

#[test]
fn starts_on_first_step() {
    let (q, _) = questionnaire();
    assert_eq!(q.phase(), Phase::Collecting(Step::Demographics));
    assert_eq!(q.state().current_step_index(), 0);
    assert!(q.state().is_visited(Step::Demographics));
    assert!(q.result().is_none());
}

#[test]
fn next_requires_patient_name() {
    let (mut q, _) = questionnaire();
    let err = q.go_next().unwrap_err();
    match err {
        WizardError::Validation(v) => assert_eq!(v.missing, vec!["patient_name"]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(q.phase(), Phase::Collecting(Step::Demographics));
}

#[test]
fn next_walks_through_questionnaire_steps() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    assert_eq!(q.state().current_step_index(), 5);
    for step in &Step::ALL[..=5] {
        assert!(q.state().is_visited(*step));
    }
    assert!(!q.state().is_visited(Step::Result));
}

#[test]
fn next_from_epds_never_reaches_result() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
    q.clear_epds(3).unwrap();

    let err = q.go_next().unwrap_err();
    assert!(matches!(&err, WizardError::Validation(v) if v.missing == vec!["epds_4"]));

    q.set_epds(3, 0).unwrap();
    assert!(matches!(q.go_next(), Err(WizardError::GenerateRequired)));
    assert_eq!(q.phase(), Phase::Collecting(Step::Epds));
}

#[tokio::test]
async fn epds_fields_set_by_name_fill_the_epds_slots() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [1, 1, 1, 1, 1, 1, 1, 1, 1, 0]);
    q.clear_field("epds_10").unwrap();
    assert_eq!(q.draft().epds.get(9), None);

    q.set_field("epds_10", 3u32).unwrap();
    assert_eq!(q.draft().epds.get(9), Some(3));
    assert!(!q.draft().demographics.contains_key("epds_10"));
    assert_eq!(q.draft().answer_map()["epds_10"], 3);

    q.set_field("epds_1", "2").unwrap();
    assert_eq!(q.draft().epds.get(0), Some(2));

    let result = *q.generate().await.unwrap();
    assert_eq!(result.total_score, 13);
}

#[test]
fn epds_fields_reject_invalid_ratings() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    assert!(matches!(
        q.set_field("epds_10", 4u32),
        Err(WizardError::Core(CoreError::EpdsValueOutOfRange { item: 10, value: 4 }))
    ));
    assert!(matches!(
        q.set_field("epds_2", 1.5),
        Err(WizardError::Core(CoreError::EpdsValueInvalid { item: 2, .. }))
    ));
    assert!(matches!(
        q.set_field("epds_3", "sometimes"),
        Err(WizardError::Core(CoreError::EpdsValueInvalid { item: 3, .. }))
    ));
    assert_eq!(q.draft().epds.unanswered().len(), 10);
    assert!(!q.draft().demographics.keys().any(|k| k.starts_with("epds_")));
}

#[tokio::test]
async fn generate_with_unset_answer_leaves_state_unchanged() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [1; 10]);
    q.clear_epds(9).unwrap();
    let before = q.state().clone();

    let err = q.generate().await.unwrap_err();
    match err {
        WizardError::Validation(v) => {
            assert!(v.names("epds_10"));
            assert_eq!(v.missing.len(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(q.state(), &before);
    assert!(q.result().is_none());
    assert_eq!(q.generation(), 0);
}

#[tokio::test]
async fn generate_is_only_allowed_on_epds_step() {
    let (mut q, _) = questionnaire();
    let err = q.generate().await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::NotAllowed {
            phase: Phase::Collecting(Step::Demographics),
            ..
        }
    ));
}

#[tokio::test]
async fn generate_scores_maximum_answers() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [3; 10]);

    let result = *q.generate().await.unwrap();
    assert_eq!(result.total_score, 30);
    assert_eq!(result.risk_level, RiskLevel::High);
    assert!(result.safety_flag);
    assert_eq!(q.phase(), Phase::ResultReady);
    assert_eq!(q.state().current_step(), Step::Result);
    assert!(q.alert_to_show().is_some());
}

#[tokio::test]
async fn generate_scores_low_risk_without_alert() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [1, 1, 1, 1, 1, 1, 1, 1, 1, 0]);

    let result = *q.generate().await.unwrap();
    assert_eq!(result.total_score, 9);
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert!(!result.safety_flag);
    assert!(q.safety_alert().is_none());
}

#[tokio::test]
async fn answers_cannot_change_while_result_is_shown() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [0; 10]);
    q.generate().await.unwrap();

    assert!(matches!(
        q.set_epds(0, 3),
        Err(WizardError::NotAllowed {
            phase: Phase::ResultReady,
            ..
        })
    ));
}

#[tokio::test]
async fn back_from_result_discards_it_and_regenerate_recomputes() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [0; 10]);
    assert_eq!(q.generate().await.unwrap().total_score, 0);

    assert_eq!(q.go_back().unwrap(), Phase::Collecting(Step::Epds));
    assert!(q.result().is_none());

    q.set_epds(0, 3).unwrap();
    let result = *q.generate().await.unwrap();
    assert_eq!(result.total_score, 3);
    assert_eq!(q.generation(), 2);
}

#[tokio::test]
async fn back_from_summary_discards_result() {
    let (mut q, _) = questionnaire();
    advance_to_summary(&mut q, [2; 10]).await;
    assert_eq!(q.phase(), Phase::Summary);

    q.go_back().unwrap();
    assert_eq!(q.phase(), Phase::Collecting(Step::Epds));
    assert!(q.result().is_none());
    assert!(q.safety_alert().is_none());
}

#[tokio::test]
async fn next_from_result_enters_summary() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [0; 10]);
    q.generate().await.unwrap();
    assert_eq!(q.go_next().unwrap(), Phase::Summary);
    assert!(matches!(
        q.proceed_to_summary(),
        Err(WizardError::NotAllowed {
            phase: Phase::Summary,
            ..
        })
    ));
}

#[test]
fn jump_to_respects_visited_steps() {
    let (mut q, _) = questionnaire();
    assert!(matches!(
        q.jump_to(3),
        Err(WizardError::StepNotReachable(Step::SocialSupport))
    ));
    assert!(matches!(q.jump_to(1), Err(WizardError::Validation(_))));

    q.set_patient_name("Asha Rao").unwrap();
    assert_eq!(q.jump_to(1).unwrap(), Phase::Collecting(Step::ObstetricMedical));
    assert_eq!(q.jump_to(2).unwrap(), Phase::Collecting(Step::MentalWellbeing));
    assert_eq!(q.jump_to(0).unwrap(), Phase::Collecting(Step::Demographics));
    assert_eq!(q.jump_to(2).unwrap(), Phase::Collecting(Step::MentalWellbeing));

    assert!(matches!(q.jump_to(6), Err(WizardError::GenerateRequired)));
    assert!(matches!(
        q.jump_to(7),
        Err(WizardError::StepNotReachable(Step::ClinicianSummary))
    ));
    assert!(matches!(q.jump_to(8), Err(WizardError::UnknownStep(8))));
}

#[tokio::test]
async fn jump_back_from_result_discards_it() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [1; 10]);
    q.generate().await.unwrap();

    assert_eq!(q.jump_to(2).unwrap(), Phase::Collecting(Step::MentalWellbeing));
    assert!(q.result().is_none());
    assert!(matches!(q.jump_to(7), Err(WizardError::StepNotReachable(_))));
}

#[tokio::test]
async fn clinician_summary_only_editable_in_summary() {
    let (mut q, _) = questionnaire();
    assert!(matches!(
        q.set_plan("Routine follow-up"),
        Err(WizardError::NotAllowed { .. })
    ));
    advance_to_summary(&mut q, [0; 10]).await;
    q.set_clinician_risk(ClinicianRisk::Low).unwrap();
    q.set_plan("Routine follow-up").unwrap();
    assert_eq!(q.draft().clinician_override.plan, "Routine follow-up");
}

#[tokio::test]
async fn plan_must_be_an_offered_option() {
    let (mut q, _) = questionnaire();
    advance_to_summary(&mut q, [0; 10]).await;

    assert!(matches!(
        q.set_plan("See again sometime"),
        Err(WizardError::UnknownPlan(plan)) if plan == "See again sometime"
    ));
    assert_eq!(q.draft().clinician_override.plan, "");

    q.set_plan(" Early follow-up ").unwrap();
    assert_eq!(q.draft().clinician_override.plan, "Early follow-up");
    q.set_plan("").unwrap();
    assert_eq!(q.draft().clinician_override.plan, "");
}

#[tokio::test]
async fn save_without_plan_names_plan() {
    let (mut q, store) = questionnaire();
    advance_to_summary(&mut q, [1, 1, 1, 1, 1, 1, 1, 1, 1, 0]).await;
    q.set_clinician_risk(ClinicianRisk::Medium).unwrap();

    let err = q.save().await.unwrap_err();
    match err {
        WizardError::Validation(v) => assert_eq!(v.missing, vec!["plan"]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(q.phase(), Phase::Summary);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_persists_record_and_freezes_draft() {
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(StaticIdentity(Clinician {
        email: "dr.smith@clinic.test".to_string(),
        display_name: "Dr Smith".to_string(),
    }));
    let mut q = Questionnaire::new(store.clone()).with_identity(identity);
    advance_to_summary(&mut q, [2, 2, 2, 2, 2, 1, 1, 1, 0, 0]).await;
    q.set_clinician_risk(ClinicianRisk::High).unwrap();
    q.set_plan("Refer to mental health specialist").unwrap();
    q.set_notes("Discussed with partner").unwrap();

    let saved = q.save().await.unwrap().clone();
    assert_eq!(q.phase(), Phase::Saved);
    assert!(q.is_frozen());
    assert_eq!(saved.record.patient_name, "Asha Rao");
    assert_eq!(saved.record.epds_total, 13);
    assert_eq!(saved.record.risk_level, RiskLevel::High);
    assert!(saved.record.safety_flag);
    assert_eq!(saved.record.score, 13.0);
    assert_eq!(saved.record.clinician_risk, ClinicianRisk::High);
    assert_eq!(saved.record.clinician.as_deref(), Some("dr.smith@clinic.test"));
    assert_eq!(saved.record.raw_data["age"], 29.0);
    assert_eq!(saved.record.raw_data["epds_1"], 2);

    let stored = store.list().await.unwrap();
    assert_eq!(stored, vec![saved]);

    assert!(matches!(q.set_notes("late edit"), Err(WizardError::Frozen)));
    assert!(matches!(q.go_back(), Err(WizardError::Frozen)));
    assert!(matches!(q.save().await, Err(WizardError::Frozen)));
}

#[tokio::test]
async fn failed_save_keeps_summary_and_can_be_retried() {
    let store = Arc::new(FlakyStore::failing(1));
    let mut q = Questionnaire::new(store.clone());
    advance_to_summary(&mut q, [0; 10]).await;
    q.set_clinician_risk(ClinicianRisk::Low).unwrap();
    q.set_plan("Routine follow-up").unwrap();

    let err = q.save().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        WizardError::Collaborator(CollaboratorError::Status { code: 503, .. })
    ));
    assert_eq!(q.phase(), Phase::Summary);
    assert!(q.saved_record().is_none());
    assert_eq!(q.draft().clinician_override.plan, "Routine follow-up");

    q.save().await.unwrap();
    assert_eq!(q.phase(), Phase::Saved);
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn predictor_decides_tier_but_not_safety_flag() {
    let (store, predictor) = (Arc::new(MemoryStore::new()), Arc::new(ScaledEpdsPredictor));
    let mut q = Questionnaire::new(store).with_predictor(predictor);
    advance_to_epds(&mut q);
    answer_epds(&mut q, [0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);

    let result = *q.generate().await.unwrap();
    assert_eq!(result.total_score, 1);
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert!(result.safety_flag);
    let prediction = result.prediction.unwrap();
    assert!((prediction.score - 100.0 / 30.0).abs() < 1e-9);
    assert_eq!(result.reported_score(), prediction.score);
}

#[tokio::test]
async fn predicted_tier_replaces_local_tier() {
    let mut q = Questionnaire::new(Arc::new(MemoryStore::new()))
        .with_predictor(Arc::new(ScaledEpdsPredictor));
    advance_to_epds(&mut q);
    // EPDS 13 is High locally but only 43/100 for the model.
    answer_epds(&mut q, [2, 2, 2, 2, 2, 1, 1, 1, 0, 0]);

    let result = *q.generate().await.unwrap();
    assert_eq!(result.total_score, 13);
    assert_eq!(result.risk_level, RiskLevel::Moderate);
    assert!(result.safety_flag);
    assert!(q.alert_to_show().is_some());

    q.go_back().unwrap();
    answer_epds(&mut q, [3, 3, 3, 3, 3, 3, 2, 0, 0, 0]);
    let result = *q.generate().await.unwrap();
    assert_eq!(result.total_score, 20);
    assert_eq!(result.risk_level, RiskLevel::High);
}

#[tokio::test]
async fn prediction_failure_returns_to_epds_step() {
    let mut q = Questionnaire::new(Arc::new(MemoryStore::new()))
        .with_predictor(Arc::new(DownPredictor));
    advance_to_epds(&mut q);
    answer_epds(&mut q, [1; 10]);

    let err = q.generate().await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(q.phase(), Phase::Collecting(Step::Epds));
    assert!(q.result().is_none());
    assert_eq!(q.generation(), 0);
}

#[tokio::test]
async fn acknowledged_alert_returns_after_regeneration() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [0, 0, 0, 0, 0, 0, 0, 0, 0, 2]);
    q.generate().await.unwrap();

    let alert = q.alert_to_show().unwrap();
    assert!(alert.has_self_harm_risk());
    assert!(q.acknowledge_alert());
    assert!(q.alert_to_show().is_none());
    assert!(!q.acknowledge_alert());

    q.go_back().unwrap();
    q.set_epds(0, 1).unwrap();
    q.generate().await.unwrap();
    let alert = q.alert_to_show().unwrap();
    assert_eq!(alert.generation, 2);
}

#[tokio::test]
async fn alert_stays_hidden_when_regenerated_result_is_safe() {
    let (mut q, _) = questionnaire();
    advance_to_epds(&mut q);
    answer_epds(&mut q, [3; 10]);
    q.generate().await.unwrap();
    assert!(q.alert_to_show().is_some());

    q.go_back().unwrap();
    answer_epds(&mut q, [0; 10]);
    q.generate().await.unwrap();
    assert!(q.safety_alert().is_none());
}

#[tokio::test]
async fn reset_starts_a_fresh_draft() {
    let (mut q, _) = questionnaire();
    let first = q.draft_id();
    advance_to_summary(&mut q, [1; 10]).await;

    q.reset();
    assert_ne!(q.draft_id(), first);
    assert_eq!(q.phase(), Phase::Collecting(Step::Demographics));
    assert!(q.draft().patient_name.is_empty());
    assert!(!q.draft().epds.is_complete());
    assert!(q.result().is_none());
    assert_eq!(q.generation(), 0);
}

#[test]
fn patient_name_can_be_set_as_a_field() {
    let (mut q, _) = questionnaire();
    q.set_field("patient_name", "Meera").unwrap();
    assert_eq!(q.draft().patient_name, "Meera");
    q.clear_field("patient_name").unwrap();
    assert!(q.missing_fields(Step::Demographics).contains(&"patient_name".to_string()));
}

#[test]
fn epds_values_are_range_checked_on_entry() {
    let (mut q, _) = questionnaire();
    assert!(matches!(q.set_epds(0, 5), Err(WizardError::Core(_))));
    assert!(matches!(q.set_epds(10, 1), Err(WizardError::Core(_))));
}

#[tokio::test]
async fn cancelled_generate_leaves_result_pending() {
    let predictor = Arc::new(StallingPredictor {
        stalls: AtomicUsize::new(2),
    });
    let mut q = Questionnaire::new(Arc::new(MemoryStore::new())).with_predictor(predictor);
    advance_to_epds(&mut q);
    answer_epds(&mut q, [3; 10]);

    let timed_out = tokio::time::timeout(Duration::from_millis(20), q.generate()).await;
    assert!(timed_out.is_err());
    assert_eq!(q.phase(), Phase::ResultPending);
    assert_eq!(q.state().current_step(), Step::Epds);
    assert!(q.result().is_none());
    assert!(matches!(
        q.set_epds(0, 0),
        Err(WizardError::NotAllowed {
            phase: Phase::ResultPending,
            ..
        })
    ));

    assert_eq!(q.go_back().unwrap(), Phase::Collecting(Step::Epds));

    let timed_out = tokio::time::timeout(Duration::from_millis(20), q.generate()).await;
    assert!(timed_out.is_err());
    assert_eq!(q.phase(), Phase::ResultPending);

    let result = *q.generate().await.unwrap();
    assert_eq!(result.total_score, 30);
    assert_eq!(q.phase(), Phase::ResultReady);
    assert_eq!(q.generation(), 1);
}
