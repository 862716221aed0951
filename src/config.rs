use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub questions_per_page: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub path: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    // env variables always arrive as strings
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl DatabaseSettings {
    pub fn url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    /// Defaults, then `config/settings.toml` if present, then `TRIVIA__*` env variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_builder(
            Self::builder()?
                .add_source(File::with_name("config/settings").required(false))
                .add_source(Environment::with_prefix("TRIVIA").separator("__")),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        if settings.questions_per_page == 0 {
            return Err(ConfigError::Message(
                "questions_per_page must be at least 1".to_owned(),
            ));
        }
        Ok(settings)
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("database.path", "trivia.db")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("questions_per_page", 10)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_sources() {
        let settings = Settings::from_builder(Settings::builder().unwrap()).unwrap();
        assert_eq!(settings.questions_per_page, 10);
        assert_eq!(settings.server.address(), "0.0.0.0:8080");
        assert_eq!(settings.database.url(), "sqlite:trivia.db?mode=rwc");
    }

    #[test]
    fn string_numbers_are_accepted() {
        let builder = Settings::builder()
            .unwrap()
            .set_override("server.port", "9000")
            .unwrap()
            .set_override("questions_per_page", "25")
            .unwrap();
        let settings = Settings::from_builder(builder).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.questions_per_page, 25);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let builder = Settings::builder()
            .unwrap()
            .set_override("questions_per_page", 0)
            .unwrap();
        let err = Settings::from_builder(builder).unwrap_err();
        assert!(matches!(err, ConfigError::Message(_)));
    }
}
