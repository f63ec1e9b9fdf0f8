use std::path::Path;
use std::sync::Arc;

use eyre::WrapErr;
use uuid::Uuid;

use ppri_core::models::clinician::Clinician;
use ppri_core::models::record::SavedRecord;
use ppri_history::query::{HistoryQuery, RiskFilter};
use ppri_history::stats::HistoryStats;
use ppri_instruments::safety::{CRISIS_CONTACTS, SafetyAlert};
use ppri_wizard::collaborator::AssessmentStore;
use ppri_wizard::memory::MemoryStore;

use crate::cli::{Cli, Command, ConfigCommand, HistoryCommand, ScreenArgs};
use crate::config::{self, PpriConfig};
use crate::screening::{self, ScreeningInput, ScreeningOutcome};

pub async fn run(cli: Cli) -> eyre::Result<()> {
    let config_path = config::resolve_path(cli.config.as_deref())?;
    match cli.command {
        Command::Screen(args) => {
            let config = config::load_or_default(&config_path)?;
            screen(&config, &args).await
        }
        Command::History(command) => history(command).await,
        Command::Config(ConfigCommand::Show) => {
            let config = config::load_or_default(&config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Config(ConfigCommand::Init {
            email,
            name,
            scoring,
            force,
        }) => {
            if config_path.exists() && !force {
                return Err(eyre::eyre!(
                    "config already exists at {} (use --force to replace it)",
                    config_path.display()
                ));
            }
            let clinician = email.map(|email| Clinician {
                display_name: name.unwrap_or_else(|| email.clone()),
                email,
            });
            let config = PpriConfig {
                clinician,
                scoring: scoring.into(),
                ..PpriConfig::default()
            };
            config::save_config(&config_path, &config)?;
            println!("wrote {}", config_path.display());
            Ok(())
        }
    }
}

async fn screen(config: &PpriConfig, args: &ScreenArgs) -> eyre::Result<()> {
    let mut config = config.clone();
    if let Some(scoring) = args.scoring {
        config.scoring = scoring.into();
    }

    let input = ScreeningInput::load(&args.answers)?;
    let existing = match &args.history {
        Some(path) if path.exists() => ppri_history::load_records(path)?,
        _ => Vec::new(),
    };
    let store = Arc::new(MemoryStore::with_records(existing));
    let mut questionnaire = screening::build_questionnaire(&config, store.clone());

    let outcome = screening::run(&mut questionnaire, &input)
        .await
        .wrap_err_with(|| format!("screening {} failed", args.answers.display()))?;
    report(&outcome);

    let json = serde_json::to_string_pretty(&outcome.saved)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), "saved record written");
        }
        None => println!("{json}"),
    }

    if let Some(path) = &args.history {
        let records = store.list().await?;
        ppri_history::save_records(path, &records)?;
        tracing::info!(path = %path.display(), records = records.len(), "history updated");
    }
    Ok(())
}

/// Human-readable result on stderr, so stdout stays machine-readable.
fn report(outcome: &ScreeningOutcome) {
    let result = &outcome.result;
    eprintln!(
        "EPDS total {}/30 · {} · reported score {:.1}",
        result.total_score,
        result.risk_level,
        result.reported_score()
    );
    if let Some(alert) = &outcome.alert {
        print_alert(alert);
    }
}

fn print_alert(alert: &SafetyAlert) {
    eprintln!("!! CRITICAL RISK ALERT");
    for reason in &alert.reasons {
        eprintln!("   {}", reason.message());
    }
    eprintln!("   Contact a psychiatrist or crisis line immediately:");
    for contact in &CRISIS_CONTACTS {
        eprintln!("   - {}: {}", contact.name, contact.phone);
    }
}

/// Remove one record from a history file.
pub async fn delete_record(path: &Path, id: Uuid) -> eyre::Result<SavedRecord> {
    let store = MemoryStore::with_records(ppri_history::load_records(path)?);
    let removed = store.delete(id).await?;
    ppri_history::save_records(path, &store.list().await?)?;
    tracing::info!(path = %path.display(), %id, "record deleted");
    Ok(removed)
}

/// Remove every record from a history file. Returns how many were removed.
pub async fn clear_history(path: &Path) -> eyre::Result<usize> {
    let store = MemoryStore::with_records(ppri_history::load_records(path)?);
    let removed = store.clear().await?;
    ppri_history::save_records(path, &store.list().await?)?;
    tracing::info!(path = %path.display(), removed, "history cleared");
    Ok(removed)
}

fn require_confirmation(yes: bool, action: &str) -> eyre::Result<()> {
    if yes {
        Ok(())
    } else {
        Err(eyre::eyre!("{action} cannot be undone; pass --yes to confirm"))
    }
}

async fn history(command: HistoryCommand) -> eyre::Result<()> {
    match command {
        HistoryCommand::List { file, search, risk } => {
            let records = ppri_history::load_records(&file)?;
            let risk: RiskFilter = risk.parse()?;
            let mut query = HistoryQuery::new().risk(risk);
            if let Some(search) = search {
                query = query.search(search);
            }
            let matched = query.apply(&records);
            for saved in &matched {
                let record = &saved.record;
                println!(
                    "{}  {}  {:<24} {:<14} {:>5.1}  clinician: {:<6} {}",
                    saved.id,
                    record.timestamp.strftime("%Y-%m-%d %H:%M"),
                    record.patient_name,
                    record.risk_level.label(),
                    record.score,
                    record.clinician_risk.label(),
                    if record.safety_flag { "⚠ safety" } else { "" },
                );
            }
            eprintln!("{} of {} records", matched.len(), records.len());
            Ok(())
        }
        HistoryCommand::Stats { file } => {
            let records = ppri_history::load_records(&file)?;
            let stats = HistoryStats::from_records(&records);
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        HistoryCommand::Delete { file, id, yes } => {
            require_confirmation(yes, "deleting an assessment")?;
            let removed = delete_record(&file, id).await?;
            eprintln!(
                "deleted assessment for {} ({})",
                removed.record.patient_name, removed.id
            );
            Ok(())
        }
        HistoryCommand::Clear { file, yes } => {
            require_confirmation(yes, "clearing the history")?;
            let removed = clear_history(&file).await?;
            eprintln!("removed {removed} records from {}", file.display());
            Ok(())
        }
        HistoryCommand::Export { file, csv } => {
            let records = ppri_history::load_records(&file)?;
            let out = std::fs::File::create(&csv)
                .wrap_err_with(|| format!("failed to create {}", csv.display()))?;
            let rows = ppri_history::export::write_csv(out, &records)?;
            eprintln!("exported {rows} records to {}", csv.display());
            Ok(())
        }
    }
}
