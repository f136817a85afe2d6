use crate::date_format::{DatePatternOptions, DEFAULT_INPUT_SEPARATORS};
use crate::normalize::{
    CenturyRule, NormalizeOptions, DEFAULT_CENTURY_PREFIX, DEFAULT_OUTPUT_SEPARATOR,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub century_prefix: String,
    /// When set, two-digit years are split at this threshold instead of
    /// using `century_prefix`.
    pub century_rollover: Option<u32>,
    pub input_separators: String,
    pub output_separator: String,
    pub strict_commas: bool,
    pub allow_multiple: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            century_prefix: DEFAULT_CENTURY_PREFIX.to_string(),
            century_rollover: None,
            input_separators: DEFAULT_INPUT_SEPARATORS.to_string(),
            output_separator: DEFAULT_OUTPUT_SEPARATOR.to_string(),
            strict_commas: false,
            allow_multiple: false,
        }
    }
}

impl AppConfig {
    pub fn century_rule(&self) -> CenturyRule {
        match self.century_rollover {
            Some(threshold) => CenturyRule::Rollover(threshold),
            None => CenturyRule::Prefix(self.century_prefix.clone()),
        }
    }

    pub fn date_pattern_options(&self) -> DatePatternOptions {
        DatePatternOptions {
            separators: self.input_separators.clone(),
            strict_commas: self.strict_commas,
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            century: self.century_rule(),
            output_separator: self.output_separator.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "redate", "redate")
        .context("could not determine the OS configuration directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    load_config_from(&paths.config_path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read config file: {}", path.display()))?;

    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("could not parse config file: {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let paths = app_paths()?;
    save_config_to(config, &paths.config_path)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| {
            format!("could not create config directory: {}", dir.display())
        })?;
    }
    let body = toml::to_string_pretty(config).context("could not serialize config")?;
    fs::write(path, body)
        .with_context(|| format!("could not write config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().expect("tempdir");
        let config = load_config_from(&temp.path().join("config.toml")).expect("load");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.century_rule(), CenturyRule::Prefix("20".to_string()));
    }

    #[test]
    fn saved_config_loads_back() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("config.toml");
        let config = AppConfig {
            century_rollover: Some(30),
            output_separator: "_".to_string(),
            ..AppConfig::default()
        };

        save_config_to(&config, &path).expect("save");
        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded, config);
        assert_eq!(loaded.century_rule(), CenturyRule::Rollover(30));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "century_prefix = \"19\"\nstrict_commas = true\n").expect("write");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.century_prefix, "19");
        assert!(config.strict_commas);
        assert_eq!(config.input_separators, DEFAULT_INPUT_SEPARATORS);
        assert_eq!(config.date_pattern_options().separators, "_.- ");
        assert_eq!(config.normalize_options().output_separator, "-");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "strict_commas = \"maybe\"").expect("write");
        assert!(load_config_from(&path).is_err());
    }
}
