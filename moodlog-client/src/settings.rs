use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File as ConfigFile, FileFormat};
use eyre::{eyre, Context, Result};
use fs_err::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;

const EXAMPLE_CONFIG: &str = include_str!("../config.toml");

pub const DEFAULT_WEATHER_API: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct WeatherSettings {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub api_url: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    pub db_path: String,
    pub session_path: String,
    pub server_address: String,
    pub offline: bool,
    pub vapid_public_key: String,
    pub weather: WeatherSettings,
}

impl Settings {
    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        let data_dir = moodlog_common::utils::data_dir();
        let db_path = data_dir.join("moodlog.db");
        let session_path = data_dir.join("session");

        Ok(Config::builder()
            .set_default("db_path", db_path.to_str())?
            .set_default("session_path", session_path.to_str())?
            .set_default("server_address", "http://127.0.0.1:8090")?
            .set_default("offline", false)?
            .set_default("vapid_public_key", "")?
            .set_default("weather.api_url", DEFAULT_WEATHER_API)?
            .add_source(
                Environment::with_prefix("moodlog")
                    .prefix_separator("_")
                    .separator("__"),
            ))
    }

    /// Finish a builder into settings with the paths expanded.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let mut settings: Settings = builder
            .build()?
            .try_deserialize()
            .map_err(|e| eyre!("Failed to deserialize {}", e))?;

        settings.db_path = expand_shell(&settings.db_path)?;
        settings.session_path = expand_shell(&settings.session_path)?;
        settings.server_address = settings.server_address.trim_end_matches('/').to_string();

        Ok(settings)
    }

    pub fn new() -> Result<Self> {
        let config_dir = std::env::var("MOODLOG_CONFIG_DIR")
            .map_or_else(|_| moodlog_common::utils::config_dir(), PathBuf::from);
        let data_dir = moodlog_common::utils::data_dir();

        create_dir_all(&config_dir)
            .wrap_err_with(|| format!("Failed to create dir {config_dir:?}"))?;
        create_dir_all(&data_dir).wrap_err_with(|| format!("Failed to create dir {data_dir:?}"))?;

        let config_file = config_dir.join("config.toml");

        let mut config_builder = Self::builder()?;
        config_builder = if config_file.exists() {
            let path = config_file
                .to_str()
                .ok_or_else(|| eyre!("Config path is not valid utf-8"))?;
            config_builder.add_source(ConfigFile::new(path, FileFormat::Toml))
        } else {
            let mut file = File::create(&config_file).wrap_err("Failed to create config file")?;
            file.write_all(EXAMPLE_CONFIG.as_bytes())
                .wrap_err("Failed to write default config file")?;
            config_builder
        };

        Self::from_builder(config_builder)
    }
}

fn expand_shell(value: &str) -> Result<String> {
    Ok(shellexpand::full(value)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_applied_on_top_of_defaults() {
        let builder = Settings::builder()
            .unwrap()
            .set_override("server_address", "http://localhost:9000/")
            .unwrap()
            .set_override("offline", true)
            .unwrap();
        let settings = Settings::from_builder(builder).unwrap();

        assert_eq!(settings.server_address, "http://localhost:9000");
        assert!(settings.offline);
        assert_eq!(settings.weather.api_url, DEFAULT_WEATHER_API);
        assert!(settings.weather.latitude.is_none());
    }
}
