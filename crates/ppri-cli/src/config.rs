use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ppri_core::models::clinician::Clinician;

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpriConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    /// Attribution for saved records.
    #[serde(default)]
    pub clinician: Option<Clinician>,
    /// Added in v1.
    pub scoring: ScoringMode,
    pub created_at: jiff::Timestamp,
}

impl Default for PpriConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            clinician: None,
            scoring: ScoringMode::Local,
            created_at: jiff::Timestamp::now(),
        }
    }
}

/// How the risk tier is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// EPDS sum thresholds only.
    #[default]
    Local,
    /// Tier from the rescaled-EPDS model; the safety flag stays local.
    ScaledEpds,
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("ppri").join("config.json"))
}

/// `explicit` if given, else the per-user default.
pub fn resolve_path(explicit: Option<&Path>) -> eyre::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

pub fn load_config(path: &Path) -> eyre::Result<PpriConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Migrate the raw JSON before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = match json.get("config_version") {
        None | Some(serde_json::Value::Null) => 0,
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| eyre::eyre!("config_version {value} is not a valid version number"))?,
    };

    let migrated = migrate(json, on_disk_version)?;
    let config: PpriConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Missing file means defaults; anything else unreadable is an error.
pub fn load_or_default(path: &Path) -> eyre::Result<PpriConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(PpriConfig::default());
    }
    load_config(path)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
/// Each migration is a pure transform on the raw JSON value.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update ppri."
        ));
    }

    // v0 → v1: add scoring mode
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        obj.entry("scoring")
            .or_insert(serde_json::Value::String("local".to_string()));
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added scoring)");
    }

    Ok(json)
}

pub fn save_config(path: &Path, config: &PpriConfig) -> eyre::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;
    let json = serde_json::to_string_pretty(&stamped)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
