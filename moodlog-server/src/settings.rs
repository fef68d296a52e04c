use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File as ConfigFile, FileFormat};
use eyre::{eyre, Context, Result};
use fs_err::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;

const EXAMPLE_CONFIG: &str = include_str!("../server.toml");

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub storage_path: String,
}

impl Settings {
    fn config_dir() -> PathBuf {
        std::env::var("MOODLOG_CONFIG_DIR")
            .map_or_else(|_| moodlog_common::utils::config_dir(), PathBuf::from)
    }

    pub fn build_default() -> Result<ConfigBuilder<DefaultState>> {
        let config_dir = Self::config_dir();
        let db_path = config_dir.join("server.db");
        let storage_path = config_dir.join("storage");

        Ok(Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8090)?
            .set_default("db_path", db_path.to_str())?
            .set_default("storage_path", storage_path.to_str())?
            .add_source(
                Environment::with_prefix("moodlog")
                    .prefix_separator("_")
                    .separator("__"),
            ))
    }

    pub fn new() -> Result<Self> {
        let config_file = Self::config_dir().join("server.toml");
        let mut config_builder = Self::build_default()?;

        if config_file.exists() {
            let path = config_file
                .to_str()
                .ok_or_else(|| eyre!("Config path is not valid utf-8"))?;
            config_builder = config_builder.add_source(ConfigFile::new(path, FileFormat::Toml));
        } else {
            if let Some(parent) = config_file.parent() {
                create_dir_all(parent)?;
            }
            let mut file = File::create(&config_file).wrap_err("Failed to create config file")?;
            file.write_all(EXAMPLE_CONFIG.as_bytes())
                .wrap_err("Failed to write default config file")?;
        };

        let settings = config_builder
            .build()?
            .try_deserialize()
            .map_err(|e| eyre!("Failed to deserialize config {}", e))?;

        Ok(settings)
    }
}
