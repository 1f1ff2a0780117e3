//! Handles settings for the application. Configuration is written in
//! `config/faraid.toml` and can be overridden with `FARAID_*` environment
//! variables, then with command line flags.
use clap::ValueEnum;
use engine::Currency;
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_CONFIG_PATH: &str = "config/faraid.toml";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level for the `faraid` and `engine` targets.
    pub level: String,
    /// Currency used when a case file does not name one.
    pub currency: Currency,
    pub format: Format,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            currency: Currency::Eur,
            format: Format::Table,
        }
    }
}

impl Settings {
    /// Loads settings from `path` (optional file) and the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("FARAID"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::load(Some("does/not/exist.toml")).unwrap();
        assert_eq!(settings.currency, Currency::Eur);
        assert_eq!(settings.format, Format::Table);
    }

    #[test]
    fn file_values_override_defaults() {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(
                "level = \"debug\"\ncurrency = \"KWD\"\nformat = \"csv\"",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.currency, Currency::Kwd);
        assert_eq!(settings.format, Format::Csv);
    }
}
