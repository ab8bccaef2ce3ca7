use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub max_connections: u32,

    #[serde(default = "default_run_migrations_on_startup")]
    pub run_migrations_on_startup: bool,
}

const fn default_run_migrations_on_startup() -> bool {
    true
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite:feedboard.sqlite".to_string(),
            max_connections: 5,
            run_migrations_on_startup: default_run_migrations_on_startup(),
        }
    }
}
