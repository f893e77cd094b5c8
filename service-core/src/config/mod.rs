use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Deployment environment. Controls whether missing configuration values
/// fall back to dev defaults or fail the load.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Test,
    Prod,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: Environment,
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> Environment {
    Environment::Dev
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn is_prod(&self) -> bool {
        self.environment == Environment::Prod
    }
}

/// Read an environment variable, falling back to `default` outside prod.
///
/// In prod every variable is required; missing values are a load error
/// rather than a silently wrong default.
pub fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match std::env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_env_prefers_set_variable() {
        std::env::set_var("SERVICE_CORE_TEST_VAR", "from-env");
        let value = get_env("SERVICE_CORE_TEST_VAR", Some("fallback"), false).unwrap();
        assert_eq!(value, "from-env");
        std::env::remove_var("SERVICE_CORE_TEST_VAR");
    }

    #[test]
    fn get_env_uses_default_outside_prod() {
        std::env::remove_var("SERVICE_CORE_UNSET_VAR");
        let value = get_env("SERVICE_CORE_UNSET_VAR", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn get_env_rejects_missing_value_in_prod() {
        std::env::remove_var("SERVICE_CORE_UNSET_VAR");
        let result = get_env("SERVICE_CORE_UNSET_VAR", Some("fallback"), true);
        assert!(result.is_err());
    }
}
