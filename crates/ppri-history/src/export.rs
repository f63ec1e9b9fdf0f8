use std::io::Write;

use serde::Serialize;

use ppri_core::models::record::SavedRecord;

use crate::error::HistoryError;

const HEADER: [&str; 11] = [
    "id",
    "timestamp",
    "patient_name",
    "risk_level",
    "score",
    "epds_total",
    "safety_flag",
    "clinician_risk",
    "plan",
    "notes",
    "clinician",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    id: String,
    timestamp: String,
    patient_name: &'a str,
    risk_level: &'static str,
    score: f64,
    epds_total: u8,
    safety_flag: bool,
    clinician_risk: &'static str,
    plan: &'a str,
    notes: &'a str,
    clinician: &'a str,
}

impl<'a> From<&'a SavedRecord> for CsvRow<'a> {
    fn from(saved: &'a SavedRecord) -> Self {
        let record = &saved.record;
        Self {
            id: saved.id.to_string(),
            timestamp: record.timestamp.to_string(),
            patient_name: &record.patient_name,
            risk_level: record.risk_level.label(),
            score: record.score,
            epds_total: record.epds_total,
            safety_flag: record.safety_flag,
            clinician_risk: record.clinician_risk.label(),
            plan: &record.plan,
            notes: &record.notes,
            clinician: record.clinician.as_deref().unwrap_or_default(),
        }
    }
}

/// Write the header row, then one row per record. Returns the row count.
pub fn write_csv<'a, W, I>(writer: W, records: I) -> Result<usize, HistoryError>
where
    W: Write,
    I: IntoIterator<Item = &'a SavedRecord>,
{
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(HEADER)?;
    let mut count = 0;
    for saved in records {
        csv.serialize(CsvRow::from(saved))?;
        count += 1;
    }
    csv.flush()?;
    tracing::debug!(rows = count, "history exported");
    Ok(count)
}

pub fn to_csv_string<'a, I>(records: I) -> Result<String, HistoryError>
where
    I: IntoIterator<Item = &'a SavedRecord>,
{
    let mut buf = Vec::new();
    write_csv(&mut buf, records)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
