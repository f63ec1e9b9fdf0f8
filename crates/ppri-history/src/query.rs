use std::fmt;
use std::str::FromStr;

use ppri_core::models::record::SavedRecord;
use ppri_core::models::result::ClinicianRisk;

use crate::error::HistoryError;

/// Restricts records to one risk band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RiskFilter {
    #[default]
    All,
    /// Matches when either the automated tier or the clinician's judgment
    /// falls in this band.
    Band(ClinicianRisk),
}

impl RiskFilter {
    pub fn matches(&self, saved: &SavedRecord) -> bool {
        match self {
            RiskFilter::All => true,
            RiskFilter::Band(band) => {
                saved.record.clinician_risk == *band
                    || saved.record.risk_level == band.as_risk_level()
            }
        }
    }
}

impl FromStr for RiskFilter {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(RiskFilter::All),
            "low" => Ok(RiskFilter::Band(ClinicianRisk::Low)),
            "medium" | "moderate" => Ok(RiskFilter::Band(ClinicianRisk::Medium)),
            "high" => Ok(RiskFilter::Band(ClinicianRisk::High)),
            _ => Err(HistoryError::UnknownRiskFilter(s.to_string())),
        }
    }
}

impl fmt::Display for RiskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskFilter::All => f.write_str("all"),
            RiskFilter::Band(band) => f.write_str(band.label()),
        }
    }
}

/// Search and filter criteria for the history table.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// Case-insensitive substring over patient name, plan and notes.
    pub search: Option<String>,
    pub risk: RiskFilter,
}

impl HistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = (!text.trim().is_empty()).then_some(text);
        self
    }

    pub fn risk(mut self, risk: RiskFilter) -> Self {
        self.risk = risk;
        self
    }

    pub fn matches(&self, saved: &SavedRecord) -> bool {
        if !self.risk.matches(saved) {
            return false;
        }
        let Some(needle) = &self.search else {
            return true;
        };
        let needle = needle.trim().to_lowercase();
        let record = &saved.record;
        [&record.patient_name, &record.plan, &record.notes]
            .iter()
            .any(|haystack| haystack.to_lowercase().contains(&needle))
    }

    /// Matching records, newest first.
    pub fn apply<'a>(&self, records: &'a [SavedRecord]) -> Vec<&'a SavedRecord> {
        let mut matched: Vec<&SavedRecord> = records.iter().filter(|r| self.matches(r)).collect();
        matched.sort_by(|a, b| b.record.timestamp.cmp(&a.record.timestamp));
        matched
    }
}
