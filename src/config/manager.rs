use super::{
    copier::CopierConfig,
    data::DataConfig,
    indicators::IndicatorConfig,
    output::OutputConfig,
    traits::ConfigSection,
};
use crate::error::TechSignalError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment overrides look like `TECHSIGNAL__DATA__TICKER=NVDA`.
pub const ENV_PREFIX: &str = "TECHSIGNAL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub indicators: IndicatorConfig,
    pub output: OutputConfig,
    pub copier: CopierConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), TechSignalError> {
        self.data.validate()?;
        self.indicators.validate()?;
        self.output.validate()?;
        self.copier.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: AppConfig,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Load a TOML file, layering `TECHSIGNAL__<SECTION>__<KEY>` environment variables on top.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), TechSignalError> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(Self::environment())
            .build()
            .map_err(|e| TechSignalError::Configuration(format!("Failed to read config {}: {}", path.display(), e)))?;

        self.apply(settings)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(())
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn load_from_env(&mut self) -> Result<(), TechSignalError> {
        let settings = config::Config::builder()
            .add_source(Self::environment())
            .build()
            .map_err(|e| TechSignalError::Configuration(format!("Failed to read environment: {}", e)))?;

        self.apply(settings)
    }

    pub fn load_from_str(&mut self, contents: &str) -> Result<(), TechSignalError> {
        let config: AppConfig = toml::from_str(contents)
            .map_err(|e| TechSignalError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TechSignalError> {
        let toml_str = toml::to_string_pretty(&self.config)
            .map_err(|e| TechSignalError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| TechSignalError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.clone()
    }

    pub fn update<F>(&mut self, f: F) -> Result<(), TechSignalError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.config.clone();
        f(&mut candidate);
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn apply(&mut self, settings: config::Config) -> Result<(), TechSignalError> {
        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| TechSignalError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        self.config = config;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
