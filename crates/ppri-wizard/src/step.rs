use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Sections of the screening form, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Step {
    Demographics,
    ObstetricMedical,
    MentalWellbeing,
    SocialSupport,
    LifeStressors,
    Epds,
    Result,
    ClinicianSummary,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::Demographics,
        Step::ObstetricMedical,
        Step::MentalWellbeing,
        Step::SocialSupport,
        Step::LifeStressors,
        Step::Epds,
        Step::Result,
        Step::ClinicianSummary,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Step> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Demographics => "Demographics",
            Step::ObstetricMedical => "Obstetric & Medical",
            Step::MentalWellbeing => "Mental Well-being",
            Step::SocialSupport => "Social Support",
            Step::LifeStressors => "Life Stressors",
            Step::Epds => "EPDS Assessment",
            Step::Result => "Result",
            Step::ClinicianSummary => "Clinician Summary",
        }
    }

    /// Steps where questionnaire answers are entered.
    pub fn is_questionnaire(self) -> bool {
        self <= Step::Epds
    }

    /// Form fields presented on this step.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Step::Demographics => &[
                "patient_name",
                "age",
                "education_level",
                "employment_status",
            ],
            Step::ObstetricMedical => &[
                "delivery_type",
                "delivery_complications",
                "past_obstetric",
                "medical_conditions",
            ],
            Step::MentalWellbeing => &[
                "sleep_quality",
                "anxiety_level",
                "stress_level",
                "fatigue_level",
                "pain_level",
                "appetite",
                "energy_level",
                "history_depression",
                "history_anxiety",
                "previous_treatment",
            ],
            Step::SocialSupport => &[
                "family_support",
                "partner_support",
                "living_situation",
                "social_network",
                "additional_support",
            ],
            Step::LifeStressors => &[
                "major_life_events",
                "financial_stress",
                "employment_status_current",
                "relationship_stress",
                "caregiving_responsibilities",
            ],
            Step::Epds => &[
                "epds_1", "epds_2", "epds_3", "epds_4", "epds_5", "epds_6", "epds_7", "epds_8",
                "epds_9", "epds_10",
            ],
            Step::Result => &[],
            Step::ClinicianSummary => &["clinician_risk", "plan", "notes"],
        }
    }

    /// Fields that must be answered before leaving this step forward.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Step::Demographics => &["patient_name"],
            Step::Epds => self.fields(),
            Step::ClinicianSummary => &["clinician_risk", "plan"],
            _ => &[],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
