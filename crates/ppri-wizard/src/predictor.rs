use ppri_core::models::epds::{EPDS_ITEM_COUNT, item_field};
use ppri_core::models::result::{Prediction, RiskLevel};

use crate::collaborator::{BoxFuture, CollaboratorError, PredictionRequest, Predictor};

/// Rule-based stand-in for the model service: rescales the EPDS total to
/// 0–100 and bands it at 33 and 66.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaledEpdsPredictor;

impl ScaledEpdsPredictor {
    pub const MODERATE_FROM: f64 = 33.0;
    pub const HIGH_FROM: f64 = 66.0;

    /// Missing or null items count as zero; anything else must be a number.
    fn epds_total(request: &PredictionRequest) -> Result<f64, CollaboratorError> {
        let mut total = 0.0;
        for index in 0..EPDS_ITEM_COUNT {
            let field = item_field(index);
            match request.get(&field) {
                None | Some(serde_json::Value::Null) => {}
                Some(value) => {
                    total += value.as_f64().ok_or_else(|| {
                        CollaboratorError::Prediction(format!("{field} is not numeric: {value}"))
                    })?;
                }
            }
        }
        Ok(total)
    }

    pub fn classify(score: f64) -> RiskLevel {
        if score < Self::MODERATE_FROM {
            RiskLevel::Low
        } else if score < Self::HIGH_FROM {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }
}

impl Predictor for ScaledEpdsPredictor {
    fn predict(
        &self,
        request: PredictionRequest,
    ) -> BoxFuture<'_, Result<Prediction, CollaboratorError>> {
        Box::pin(async move {
            let total = Self::epds_total(&request)?;
            let score = (total / 30.0 * 100.0).clamp(0.0, 100.0);
            Ok(Prediction {
                score,
                risk_level: Self::classify(score),
            })
        })
    }
}
