// File: src/config.rs
use crate::core::catalog::Catalog;
use crate::core::diet::DietRules;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ATTEMPT_BUDGET: usize = 1000;
pub const DEFAULT_WEEK_LENGTH: usize = 7;

const ENV_DATA_DIR: &str = "SHACK_MENU_DATA_DIR";
const ENV_ATTEMPT_BUDGET: &str = "SHACK_MENU_ATTEMPT_BUDGET";
const ENV_SEED: &str = "SHACK_MENU_SEED";

/// Engine configuration. Every field has a default, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding the ledger and log files.
    pub data_dir: PathBuf,
    pub ledger_file: String,
    pub log_file: String,
    /// JSON catalog; the built-in shack catalog is used when unset.
    pub catalog_file: Option<PathBuf>,
    pub diet_rules: DietRules,
    pub attempt_budget: usize,
    /// Fixed sampler seed for reproducible runs.
    pub seed: Option<u64>,
    pub week_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            ledger_file: "used_combinations.bin".to_string(),
            log_file: "daily_log.jsonl".to_string(),
            catalog_file: None,
            diet_rules: DietRules::default(),
            attempt_budget: DEFAULT_ATTEMPT_BUDGET,
            seed: None,
            week_length: DEFAULT_WEEK_LENGTH,
        }
    }
}

impl EngineConfig {
    /// Reads `path` when given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                })?
            }
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.diet_rules.validate()?;
        Ok(config)
    }

    /// `lookup` stands in for the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(ENV_ATTEMPT_BUDGET) {
            self.attempt_budget = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or(ConfigError::Env {
                    var: ENV_ATTEMPT_BUDGET,
                    value,
                })?;
        }
        if let Some(value) = lookup(ENV_SEED) {
            self.seed = Some(value.trim().parse::<u64>().map_err(|_| ConfigError::Env {
                var: ENV_SEED,
                value: value.clone(),
            })?);
        }
        Ok(())
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_file)
    }

    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog_file {
            Some(path) => Catalog::from_json_file(path),
            None => Ok(Catalog::default_shack()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DietProfile, DietTag};

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.attempt_budget, 1000);
        assert_eq!(config.week_length, 7);
        assert_eq!(config.ledger_path(), PathBuf::from("data/used_combinations.bin"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(&path, r#"{"attempt_budget": 50, "seed": 9}"#).unwrap();

        let mut config: EngineConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        config.apply_overrides(|_| None).unwrap();
        assert_eq!(config.attempt_budget, 50);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.log_file, "daily_log.jsonl");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = EngineConfig::default();
        config
            .apply_overrides(|var| match var {
                "SHACK_MENU_DATA_DIR" => Some("/tmp/shack".into()),
                "SHACK_MENU_ATTEMPT_BUDGET" => Some("25".into()),
                "SHACK_MENU_SEED" => Some("123".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/shack"));
        assert_eq!(config.attempt_budget, 25);
        assert_eq!(config.seed, Some(123));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut config = EngineConfig::default();
        let result = config.apply_overrides(|var| {
            (var == "SHACK_MENU_ATTEMPT_BUDGET").then(|| "0".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Env { .. })));
    }

    #[test]
    fn test_partial_diet_rules_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(&path, r#"{"diet_rules": {"accepted": {"Jain": ["Jain"]}}}"#).unwrap();

        let result = EngineConfig::load(Some(&path));
        assert!(matches!(
            result,
            Err(ConfigError::MissingDietRule(DietProfile::Swaminarayan))
        ));
    }

    #[test]
    fn test_diet_rules_from_file() {
        let json = r#"{"diet_rules": {"accepted": {"Jain": ["Jain"], "Swaminarayan": ["Swaminarayan"]}}}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        let tags = config.diet_rules.accepted_tags(DietProfile::Swaminarayan).unwrap();
        assert!(tags.contains(&DietTag::Swaminarayan));
        assert!(!tags.contains(&DietTag::Jain));
    }
}
