use std::{fs, io::ErrorKind, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::{Difficulty, ExerciseId};

use crate::protocol_client::{DEFAULT_EXERCISE_ID, DEFAULT_EXERCISE_KIND};

pub const DEFAULT_SETTINGS_FILE: &str = "tutor.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub service_url: Option<String>,
    pub exercise_kind: String,
    pub exercise_id: ExerciseId,
    pub difficulty: Difficulty,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: None,
            exercise_kind: DEFAULT_EXERCISE_KIND.into(),
            exercise_id: DEFAULT_EXERCISE_ID,
            difficulty: Difficulty::default(),
            request_timeout_secs: Some(30),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    service_url: Option<String>,
    exercise_kind: Option<String>,
    exercise_id: Option<i64>,
    difficulty: Option<u8>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the TOML file at `path` (if present), then environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()));
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.service_url {
        settings.service_url = Some(v);
    }
    if let Some(v) = file_cfg.exercise_kind {
        settings.exercise_kind = v;
    }
    if let Some(v) = file_cfg.exercise_id {
        settings.exercise_id = ExerciseId(v);
    }
    if let Some(v) = file_cfg.difficulty {
        settings.difficulty = Difficulty(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = (v > 0).then_some(v);
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("TUTOR_SERVICE_URL") {
        settings.service_url = Some(v);
    }
    if let Some(v) = var("APP__SERVICE_URL") {
        settings.service_url = Some(v);
    }

    if let Some(v) = var("APP__EXERCISE_KIND") {
        settings.exercise_kind = v;
    }

    if let Some(v) = var("APP__EXERCISE_ID") {
        if let Ok(parsed) = v.parse::<i64>() {
            settings.exercise_id = ExerciseId(parsed);
        }
    }

    if let Some(v) = var("TUTOR_DIFFICULTY") {
        if let Ok(parsed) = v.parse::<u8>() {
            settings.difficulty = Difficulty(parsed);
        }
    }
    if let Some(v) = var("APP__DIFFICULTY") {
        if let Ok(parsed) = v.parse::<u8>() {
            settings.difficulty = Difficulty(parsed);
        }
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = (parsed > 0).then_some(parsed);
        }
    }
}
