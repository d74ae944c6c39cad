use headsup_engine::engine::DEFAULT_OPPONENT_NAME;
use headsup_engine::player::STARTING_STACK;
use headsup_engine::rules::{TableConfig, BIG_BLIND, SMALL_BLIND};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_ENV: &str = "HEADSUP_CONFIG";
pub const SEED_ENV: &str = "HEADSUP_SEED";
pub const STARTING_STACK_ENV: &str = "HEADSUP_STARTING_STACK";
pub const SMALL_BLIND_ENV: &str = "HEADSUP_SMALL_BLIND";
pub const BIG_BLIND_ENV: &str = "HEADSUP_BIG_BLIND";
pub const OPPONENT_NAME_ENV: &str = "HEADSUP_OPPONENT_NAME";

/// Table settings resolved once per session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSettings {
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    /// Fixed seed for dealing and opponent decisions; random when absent
    pub seed: Option<u64>,
    pub opponent_name: String,
    /// Idle time after which a session is dropped
    pub session_timeout_minutes: u64,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            starting_stack: STARTING_STACK,
            small_blind: SMALL_BLIND,
            big_blind: BIG_BLIND,
            seed: None,
            opponent_name: DEFAULT_OPPONENT_NAME.to_string(),
            session_timeout_minutes: 30,
        }
    }
}

impl TableSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.starting_stack == 0 {
            return Err(SettingsError::InvalidValue(
                "starting_stack must be greater than 0".to_string(),
            ));
        }
        if self.small_blind == 0 {
            return Err(SettingsError::InvalidValue(
                "small_blind must be greater than 0".to_string(),
            ));
        }
        if self.small_blind > self.big_blind {
            return Err(SettingsError::InvalidValue(
                "small_blind cannot exceed big_blind".to_string(),
            ));
        }
        if self.big_blind > self.starting_stack {
            return Err(SettingsError::InvalidValue(
                "big_blind cannot exceed starting_stack".to_string(),
            ));
        }
        if self.opponent_name.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "opponent_name cannot be empty".to_string(),
            ));
        }
        if self.session_timeout_minutes == 0 {
            return Err(SettingsError::InvalidValue(
                "session_timeout_minutes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn table_config(&self) -> TableConfig {
        TableConfig {
            starting_stack: self.starting_stack,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

/// Where each resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingsSources {
    pub starting_stack: ValueSource,
    pub small_blind: ValueSource,
    pub big_blind: ValueSource,
    pub seed: ValueSource,
    pub opponent_name: ValueSource,
    pub session_timeout_minutes: ValueSource,
}

impl Default for SettingsSources {
    fn default() -> Self {
        Self {
            starting_stack: ValueSource::Default,
            small_blind: ValueSource::Default,
            big_blind: ValueSource::Default,
            seed: ValueSource::Default,
            opponent_name: ValueSource::Default,
            session_timeout_minutes: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsResolved {
    pub settings: TableSettings,
    pub sources: SettingsSources,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

impl crate::errors::IntoErrorResponse for SettingsError {
    fn error_code(&self) -> &'static str {
        match self {
            SettingsError::Io(_) => "settings_io_error",
            SettingsError::Parse(_) => "settings_parse_error",
            SettingsError::InvalidValue(_) => "invalid_settings",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        match self {
            SettingsError::Io(_) => crate::errors::ErrorSeverity::Server,
            _ => crate::errors::ErrorSeverity::Client,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    #[serde(default)]
    starting_stack: Option<u32>,
    #[serde(default)]
    small_blind: Option<u32>,
    #[serde(default)]
    big_blind: Option<u32>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    opponent_name: Option<String>,
    #[serde(default)]
    session_timeout_minutes: Option<u64>,
}

/// Resolves settings from the process environment: defaults, then the TOML
/// file named by `HEADSUP_CONFIG`, then the individual `HEADSUP_*` variables.
pub fn load_with_sources() -> Result<SettingsResolved, SettingsError> {
    resolve(|key| std::env::var(key).ok())
}

/// Same layering as [`load_with_sources`] with an explicit variable lookup.
pub fn resolve<F>(lookup: F) -> Result<SettingsResolved, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = TableSettings::default();
    let mut sources = SettingsSources::default();
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(path) = var(CONFIG_ENV) {
        let file = read_file(Path::new(&path))?;
        apply_file(&mut settings, &mut sources, file);
    }

    if let Some(seed) = var(SEED_ENV) {
        settings.seed = Some(parse_number(SEED_ENV, &seed)?);
        sources.seed = ValueSource::Env;
    }
    if let Some(stack) = var(STARTING_STACK_ENV) {
        settings.starting_stack = parse_number(STARTING_STACK_ENV, &stack)?;
        sources.starting_stack = ValueSource::Env;
    }
    if let Some(sb) = var(SMALL_BLIND_ENV) {
        settings.small_blind = parse_number(SMALL_BLIND_ENV, &sb)?;
        sources.small_blind = ValueSource::Env;
    }
    if let Some(bb) = var(BIG_BLIND_ENV) {
        settings.big_blind = parse_number(BIG_BLIND_ENV, &bb)?;
        sources.big_blind = ValueSource::Env;
    }
    if let Some(name) = var(OPPONENT_NAME_ENV) {
        settings.opponent_name = name.trim().to_string();
        sources.opponent_name = ValueSource::Env;
    }

    settings.validate()?;
    tracing::debug!(?sources, "table settings resolved");
    Ok(SettingsResolved { settings, sources })
}

/// Parses a TOML settings document on top of the defaults.
pub fn from_toml_str(raw: &str) -> Result<TableSettings, SettingsError> {
    let file: FileSettings = toml::from_str(raw)?;
    let mut settings = TableSettings::default();
    apply_file(&mut settings, &mut SettingsSources::default(), file);
    settings.validate()?;
    Ok(settings)
}

fn read_file(path: &Path) -> Result<FileSettings, SettingsError> {
    let raw = fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

fn apply_file(settings: &mut TableSettings, sources: &mut SettingsSources, file: FileSettings) {
    if let Some(v) = file.starting_stack {
        settings.starting_stack = v;
        sources.starting_stack = ValueSource::File;
    }
    if let Some(v) = file.small_blind {
        settings.small_blind = v;
        sources.small_blind = ValueSource::File;
    }
    if let Some(v) = file.big_blind {
        settings.big_blind = v;
        sources.big_blind = ValueSource::File;
    }
    if let Some(v) = file.seed {
        settings.seed = Some(v);
        sources.seed = ValueSource::File;
    }
    if let Some(v) = file.opponent_name {
        settings.opponent_name = v;
        sources.opponent_name = ValueSource::File;
    }
    if let Some(v) = file.session_timeout_minutes {
        settings.session_timeout_minutes = v;
        sources.session_timeout_minutes = ValueSource::File;
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, SettingsError> {
    raw.trim()
        .parse()
        .map_err(|_| SettingsError::InvalidValue(format!("{key} is not a valid number: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = TableSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.table_config(), TableConfig::default());
    }

    #[test]
    fn validates_blind_structure() {
        let settings = TableSettings {
            small_blind: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = TableSettings {
            small_blind: 30,
            big_blind: 20,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = TableSettings {
            starting_stack: 10,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = TableSettings {
            small_blind: 20,
            big_blind: 20,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validates_name_and_timeout() {
        let settings = TableSettings {
            opponent_name: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidValue(_))
        ));

        let settings = TableSettings {
            session_timeout_minutes: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn env_values_override_defaults() {
        let resolved = resolve(env(&[
            (SEED_ENV, "42"),
            (STARTING_STACK_ENV, "500"),
            (OPPONENT_NAME_ENV, "Robot"),
        ]))
        .expect("resolve");

        assert_eq!(resolved.settings.seed, Some(42));
        assert_eq!(resolved.settings.starting_stack, 500);
        assert_eq!(resolved.settings.opponent_name, "Robot");
        assert_eq!(resolved.sources.seed, ValueSource::Env);
        assert_eq!(resolved.sources.small_blind, ValueSource::Default);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let resolved = resolve(env(&[(SEED_ENV, ""), (BIG_BLIND_ENV, " ")])).expect("resolve");
        assert_eq!(resolved.settings, TableSettings::default());
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = resolve(env(&[(SMALL_BLIND_ENV, "ten")])).expect_err("invalid");
        assert!(err.to_string().contains(SMALL_BLIND_ENV));
    }

    #[test]
    fn toml_documents_fill_in_missing_fields_with_defaults() {
        let settings =
            from_toml_str("starting_stack = 2000\nopponent_name = \"Dealer\"\n").expect("parse");
        assert_eq!(settings.starting_stack, 2000);
        assert_eq!(settings.opponent_name, "Dealer");
        assert_eq!(settings.big_blind, BIG_BLIND);

        assert!(matches!(
            from_toml_str("starting_stack = \"lots\""),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            from_toml_str("ante = 5"),
            Err(SettingsError::Parse(_))
        ));
    }
}
