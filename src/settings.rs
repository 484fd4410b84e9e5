use config::{Config, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: SecretString,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
}

/// Loads settings from built-in defaults, then `configuration/base.yaml` if it
/// exists, then `TRIVIA_*` environment variables (`TRIVIA_APPLICATION__PORT=8080`).
pub fn get_settings() -> Result<Settings, ConfigError> {
    dotenv::dotenv().ok();
    build_settings(
        Environment::with_prefix("TRIVIA")
            .prefix_separator("_")
            .separator("__"),
    )
}

fn build_settings(env: Environment) -> Result<Settings, ConfigError> {
    Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 5000_i64)?
        .set_default("database.url", "sqlite://trivia.db")?
        .set_default("database.max_connections", 5_i64)?
        .add_source(File::with_name("configuration/base").required(false))
        .add_source(env)
        .build()?
        .try_deserialize()
}
