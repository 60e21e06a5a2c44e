use std::env;

use dotenv::dotenv;

use crate::config::{BrokerConfig, ConfigError, DEFAULT_PORT};

const HOST: &str = "BROKER_HOST";
const PORT: &str = "BROKER_PORT";
const USERNAME: &str = "BROKER_USERNAME";
const PASSWORD: &str = "BROKER_PASSWORD";
const VHOST: &str = "BROKER_VHOST";
const EXCHANGE: &str = "BROKER_EXCHANGE";
const ROUTING_KEY: &str = "BROKER_ROUTING_KEY";
const TAG: &str = "BROKER_TAG";

fn default_username() -> String {
    "guest".to_string()
}

fn default_password() -> String {
    "guest".to_string()
}

fn default_vhost() -> String {
    "/".to_string()
}

impl BrokerConfig {
    /// Reads the `BROKER_*` environment variables, loading a `.env` file first if present.
    ///
    /// Only `BROKER_HOST` is required. Exchange name and tag stay empty when unset
    /// and are defaulted by [`BrokerConfig::normalized`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST).ok_or(ConfigError::MissingEnv { var: HOST })?;
        let port = match lookup(PORT) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidEnv {
                    var: PORT,
                    value,
                    source,
                })?,
            None => DEFAULT_PORT,
        };

        Ok(BrokerConfig {
            host,
            port,
            username: lookup(USERNAME).unwrap_or_else(default_username),
            password: lookup(PASSWORD).unwrap_or_else(default_password),
            vhost: lookup(VHOST).unwrap_or_else(default_vhost),
            exchange_name: lookup(EXCHANGE).unwrap_or_default(),
            routing_key: lookup(ROUTING_KEY).unwrap_or_default(),
            tag: lookup(TAG).unwrap_or_default(),
        })
    }
}
