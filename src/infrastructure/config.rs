use std::path::PathBuf;

use color_eyre::eyre::Result;
use config::ConfigError;
use serde::Deserialize;

use crate::utils;

const CONFIG: &str = include_str!("../../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub _data_dir: PathBuf,
    #[serde(default)]
    pub _config_dir: PathBuf,
}

/// Library configuration, layered: embedded json5 defaults, then an
/// optional user config file from the platform config dir. Unlike a full
/// application config nothing here is mandatory; a missing file just means
/// defaults.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    /// Scans per history page; the size family mutations repopulate page 1
    /// in.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    10
}

impl Default for Config {
    fn default() -> Self {
        json5::from_str(CONFIG).unwrap_or(Self {
            config: AppConfig::default(),
            page_size: default_page_size(),
        })
    }
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        let data_dir = utils::get_data_dir();
        let config_dir = utils::get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("_data_dir", data_dir.to_str().unwrap_or_default())?
            .set_default("_config_dir", config_dir.to_str().unwrap_or_default())?
            .set_default("page_size", default_page_size())?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
        ];
        for (file, format) in &config_files {
            builder = builder.add_source(
                config::File::from(config_dir.join(file))
                    .format(*format)
                    .required(false),
            );
        }

        let cfg: Self = builder.build()?.try_deserialize()?;

        if cfg.page_size < 1 {
            return Err(ConfigError::Message(String::from(
                "page_size must be at least 1",
            )));
        }

        Ok(cfg)
    }
}
