//! Critical-risk alert shown once per generated result.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use ppri_core::models::epds::{EPDS_ITEM_COUNT, SELF_HARM_ITEM};
use ppri_core::models::result::AssessmentResult;

use crate::instruments::epds::HIGH_RISK_THRESHOLD;

/// A crisis line listed on the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrisisContact {
    pub name: &'static str,
    pub phone: &'static str,
}

pub const CRISIS_CONTACTS: [CrisisContact; 3] = [
    CrisisContact {
        name: "AASRA",
        phone: "9820466726",
    },
    CrisisContact {
        name: "Vandrevala",
        phone: "1860-2662-345",
    },
    CrisisContact {
        name: "Emergency",
        phone: "112",
    },
];

/// Why the alert fired. Both reasons can be present at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum AlertReason {
    /// EPDS item 10 answered above zero.
    SelfHarm { item_value: u8 },
    /// EPDS total at or above the clinical threshold.
    ScoreAtThreshold { total: u8 },
}

impl AlertReason {
    pub fn message(&self) -> String {
        match self {
            AlertReason::SelfHarm { .. } => {
                "Self-harm risk detected - immediate attention required".to_string()
            }
            AlertReason::ScoreAtThreshold { total } => {
                format!("EPDS score {total}/30 is above the clinical threshold")
            }
        }
    }
}

/// The alert for one result generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SafetyAlert {
    /// Result generation this alert belongs to.
    pub generation: u64,
    pub reasons: Vec<AlertReason>,
    acknowledged: bool,
}

impl SafetyAlert {
    /// Decide whether a freshly generated result needs an alert.
    ///
    /// Returns `None` when the result carries no safety flag. The self-harm
    /// item is read from `answers` when present, independent of the total.
    pub fn evaluate(
        answers: &[u8; EPDS_ITEM_COUNT],
        result: &AssessmentResult,
        generation: u64,
    ) -> Option<Self> {
        if !result.safety_flag {
            return None;
        }

        let mut reasons = Vec::new();
        let item_value = answers[SELF_HARM_ITEM];
        if item_value > 0 {
            reasons.push(AlertReason::SelfHarm { item_value });
        }
        if result.total_score >= HIGH_RISK_THRESHOLD {
            reasons.push(AlertReason::ScoreAtThreshold {
                total: result.total_score,
            });
        }

        Some(Self {
            generation,
            reasons,
            acknowledged: false,
        })
    }

    pub fn should_show(&self) -> bool {
        !self.acknowledged
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// One-way: an acknowledged alert never shows again for its generation.
    pub fn acknowledge(&mut self) {
        self.acknowledged = true;
    }

    pub fn has_self_harm_risk(&self) -> bool {
        self.reasons
            .iter()
            .any(|r| matches!(r, AlertReason::SelfHarm { .. }))
    }
}
