use serde::Serialize;

use ppri_core::models::record::SavedRecord;
use ppri_core::models::result::RiskLevel;

/// Summary cards for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub safety_flagged: usize,
    /// Records whose reported score came from a predictive model.
    pub model_scored: usize,
    /// `None` when there are no records.
    pub mean_epds_total: Option<f64>,
    /// Mean model score over `model_scored` records only; model scores and
    /// EPDS totals are on different scales.
    pub mean_model_score: Option<f64>,
}

impl HistoryStats {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SavedRecord>,
    {
        let mut stats = HistoryStats::default();
        let mut epds_sum = 0.0;
        let mut model_sum = 0.0;

        for saved in records {
            let record = &saved.record;
            stats.total += 1;
            match record.risk_level {
                RiskLevel::Low => stats.low += 1,
                RiskLevel::Moderate => stats.moderate += 1,
                RiskLevel::High => stats.high += 1,
            }
            if record.safety_flag {
                stats.safety_flagged += 1;
            }
            epds_sum += f64::from(record.epds_total);
            if record.predicted {
                stats.model_scored += 1;
                model_sum += record.score;
            }
        }

        if stats.total > 0 {
            stats.mean_epds_total = Some(epds_sum / stats.total as f64);
        }
        if stats.model_scored > 0 {
            stats.mean_model_score = Some(model_sum / stats.model_scored as f64);
        }
        stats
    }
}
