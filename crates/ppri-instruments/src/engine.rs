//! EPDS risk scoring.
//!
//! `score` is a pure function of the ten item responses: identical input
//! always yields an identical [`AssessmentResult`].

use ppri_core::models::epds::SELF_HARM_ITEM;
use ppri_core::models::result::{AssessmentResult, Prediction, RiskLevel};

use crate::error::InstrumentError;
use crate::instruments::epds::{Epds, HIGH_RISK_THRESHOLD};
use crate::Instrument;

/// Score a complete EPDS response set.
///
/// Fails with [`InstrumentError::WrongItemCount`] unless exactly ten
/// responses are given, and with [`InstrumentError::ItemOutOfRange`] for any
/// value outside 0–3.
pub fn score(answers: &[u8]) -> Result<AssessmentResult, InstrumentError> {
    let total_score = Epds.total(answers)?;
    let self_harm = answers[SELF_HARM_ITEM] > 0;

    Ok(AssessmentResult {
        total_score,
        risk_level: classify(total_score),
        safety_flag: self_harm || total_score >= HIGH_RISK_THRESHOLD,
        prediction: None,
    })
}

/// Three-tier classification of an EPDS total, read from the EPDS bands.
/// Totals past the top band are High.
pub fn classify(total_score: u8) -> RiskLevel {
    Epds.band_for(total_score)
        .and_then(|band| RiskLevel::from_label(&band.label))
        .unwrap_or(RiskLevel::High)
}

/// Attach an external model's prediction. The model decides the risk tier;
/// the locally computed safety flag is kept as is.
pub fn apply_prediction(result: AssessmentResult, prediction: Prediction) -> AssessmentResult {
    AssessmentResult {
        risk_level: prediction.risk_level,
        prediction: Some(prediction),
        ..result
    }
}
