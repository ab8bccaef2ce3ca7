use std::{env, fs, path::Path};

use config::{ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::cfg;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AppSettings {
    #[serde(default)]
    pub server: cfg::ServerSettings,

    #[serde(default)]
    pub database: cfg::DatabaseSettings,

    #[serde(default)]
    pub jwt: cfg::JwtSettings,

    #[serde(default)]
    pub board: cfg::BoardSettings,
}

impl AppSettings {
    /// Builds the settings from defaults, config files and `APP_` environment variables
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let app_run_env = Self::get_app_run_env();
        let config_path = Self::get_config_path();
        let env_config_path = config_path.join(format!("configs.{app_run_env}.toml"));
        let env_config_exists = env_config_path.exists();

        // Defaults go in as the lowest TOML layer so partial files only override what they name
        let defaults = to_toml(&Self::default())?;
        let mut builder = config::Config::builder().add_source(File::from_str(&defaults, FileFormat::Toml));

        for path in [
            config_path.join("configs.default.toml"),
            env_config_path.clone(),
            config_path.join("configs.local.toml"),
        ] {
            builder = builder.add_source(File::from(path).required(false));
        }

        // APP_SERVER__PORT, APP_DATABASE__URL, APP_BOARD__DUPLICATE_VOTE_POLICY, ...
        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins"),
        );

        let settings = builder.build()?.try_deserialize::<Self>()?;

        if app_run_env == "production" && !env_config_exists {
            fs::write(&env_config_path, to_toml(&settings)?)
                .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;
            println!("Created default config file at {}", env_config_path.to_string_lossy());
        }

        Ok(settings)
    }

    #[must_use]
    pub fn get_server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn get_app_run_env() -> String {
        env::var("APP_RUN_ENV").unwrap_or_else(|_| "production".to_string())
    }

    #[must_use]
    pub fn get_config_path() -> &'static Path {
        Path::new(".")
    }

    #[must_use]
    pub fn get_config_full_path() -> String {
        let config_path = Self::get_config_path();
        config_path
            .canonicalize()
            .ok()
            .unwrap_or_else(|| config_path.to_path_buf())
            .to_string_lossy()
            .to_string()
    }
}

fn to_toml(settings: &AppSettings) -> Result<String, ConfigError> {
    toml::to_string(settings).map_err(|e| ConfigError::Message(format!("Failed to serialize settings: {e}")))
}
