//! shop-cli settings.
//!
//! Layered with the `config` crate, later sources overriding earlier ones:
//!
//! ```text
//! built-in defaults
//!      ▼
//! masterclass.toml (optional, or --config <path>)
//!      ▼
//! MASTERCLASS_* environment variables (e.g. MASTERCLASS_DATABASE_PATH)
//! ```

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use masterclass_core::validation::validate_email;
use masterclass_db::seed::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "MASTERCLASS";

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "masterclass.toml";

/// shop-cli configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// SQLite file path, or `:memory:`
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// Admin account created on an empty users table
    pub admin_email: String,

    /// Password for that admin account
    #[serde(skip_serializing)]
    pub admin_password: String,

    /// Prefix for display prices
    pub currency_symbol: String,

    /// Run `ensure_seed_data` before every command
    pub seed_on_start: bool,
}

impl ShopConfig {
    /// Loads configuration from defaults, the config file and the environment.
    ///
    /// A missing default file is fine; a missing explicit `path` is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Self::defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    /// Builder pre-filled with the built-in defaults.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("database_path", "./masterclass.db")?
            .set_default("max_connections", 5)?
            .set_default("admin_email", DEFAULT_ADMIN_EMAIL)?
            .set_default("admin_password", DEFAULT_ADMIN_PASSWORD)?
            .set_default("currency_symbol", "€")?
            .set_default("seed_on_start", true)?)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let shop: ShopConfig = config.try_deserialize()?;
        shop.validate()?;
        Ok(shop)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "max_connections".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        validate_email(&self.admin_email)
            .map_err(|e| ConfigError::InvalidValue("admin_email".to_string(), e.to_string()))?;

        if self.admin_password.is_empty() {
            return Err(ConfigError::MissingRequired("admin_password".to_string()));
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn load_toml(toml: &str) -> Result<ShopConfig, ConfigError> {
        let config = ShopConfig::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        ShopConfig::from_config(config)
    }

    #[test]
    fn test_defaults() {
        let config = load_toml("").unwrap();
        assert_eq!(config.database_path, "./masterclass.db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.admin_email, "admin@coders.ninja");
        assert_eq!(config.currency_symbol, "€");
        assert!(config.seed_on_start);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = load_toml(
            r#"
            database_path = ":memory:"
            currency_symbol = "$"
            seed_on_start = false
            "#,
        )
        .unwrap();
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.currency_symbol, "$");
        assert!(!config.seed_on_start);
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            load_toml("max_connections = 0"),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            load_toml("admin_email = \"nobody\""),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            load_toml("max_connections = \"lots\""),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_password_not_serialized() {
        let config = load_toml("").unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("admin_password").is_none());
    }
}
