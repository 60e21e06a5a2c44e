// src/config.rs
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_EXCHANGE_NAME: &str = "BrokerMessageBus";
pub const DEFAULT_TAG: &str = "BrokerMessageBusProducer";
pub const DEFAULT_PORT: u16 = 5672;

/// AMQP short strings (exchange names, routing keys, tags) are length-prefixed by a single byte.
const SHORT_STRING_MAX: usize = 255;

const CONFIG_FILE_NAME: &str = "broker.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration field `{0}` must not be empty")]
    MissingField(&'static str),

    #[error("configuration field `port` must be between 1 and 65535")]
    InvalidPort,

    #[error("configuration field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("configuration field `{field}` is {len} bytes long, the limit is 255")]
    TooLong { field: &'static str, len: usize },

    #[error("environment variable {var} is not set")]
    MissingEnv { var: &'static str },

    #[error("environment variable {var} has invalid value {value:?}: {source}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("could not find broker.json in the working directory, config/ or the home directory")]
    NotFound,

    #[error("failed to read config file at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file contains invalid JSON or wrong field types: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Connection and publishing parameters for a [`Broker`](crate::Broker).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    // RabbitMQ connection
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub vhost: String,

    // Publishing
    pub exchange_name: String,
    pub routing_key: String,
    /// Client tag, used as the connection name and the `app_id` of published messages.
    pub tag: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            vhost: String::new(),
            exchange_name: String::new(),
            routing_key: String::new(),
            tag: String::new(),
        }
    }
}

impl fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("vhost", &self.vhost)
            .field("exchange_name", &self.exchange_name)
            .field("routing_key", &self.routing_key)
            .field("tag", &self.tag)
            .finish()
    }
}

impl BrokerConfig {
    /// Returns a copy with the exchange name and tag defaulted when left empty.
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        if config.exchange_name.is_empty() {
            config.exchange_name = DEFAULT_EXCHANGE_NAME.to_string();
        }
        if config.tag.is_empty() {
            config.tag = DEFAULT_TAG.to_string();
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingField("host"));
        }
        if self.host.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidField {
                field: "host",
                reason: "contains whitespace".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.username.is_empty() {
            return Err(ConfigError::MissingField("username"));
        }

        for (field, value) in [
            ("vhost", &self.vhost),
            ("exchange_name", &self.exchange_name),
            ("routing_key", &self.routing_key),
            ("tag", &self.tag),
        ] {
            if value.len() > SHORT_STRING_MAX {
                return Err(ConfigError::TooLong {
                    field,
                    len: value.len(),
                });
            }
        }

        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "Loaded broker configuration file");
        Ok(config)
    }

    /// Loads the first config file found by [`find_config_file`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file(&find_config_file()?)
    }
}

pub fn find_config_file() -> Result<PathBuf, ConfigError> {
    find_config_file_in(Path::new("."), home::home_dir())
}

/// Looks for the config file in `base`, then `base/config`, then `home_dir`.
fn find_config_file_in(base: &Path, home_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let locations = [
        ("Current directory", base.join(CONFIG_FILE_NAME)),
        ("Config directory", base.join("config").join(CONFIG_FILE_NAME)),
    ];

    for (location_name, path) in locations {
        if path.exists() {
            debug!("Found config file in {}: {}", location_name, path.display());
            return Ok(path);
        }
    }

    if let Some(home_dir) = home_dir {
        let home_config = home_dir.join(format!(".{CONFIG_FILE_NAME}"));
        if home_config.exists() {
            debug!("Found config file in home directory: {}", home_config.display());
            return Ok(home_config);
        }
    }

    Err(ConfigError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BrokerConfig {
        BrokerConfig {
            host: "localhost".to_string(),
            port: 5672,
            username: "guest".to_string(),
            password: "guest".to_string(),
            vhost: "/".to_string(),
            ..BrokerConfig::default()
        }
    }

    #[test]
    fn test_normalized_fills_defaults() {
        let config = valid_config();
        let normalized = config.normalized();

        assert_eq!(normalized.exchange_name, DEFAULT_EXCHANGE_NAME);
        assert_eq!(normalized.tag, DEFAULT_TAG);
        // input left as it was
        assert!(config.exchange_name.is_empty());
        assert!(config.tag.is_empty());
    }

    #[test]
    fn test_normalized_keeps_explicit_values() {
        let config = BrokerConfig {
            exchange_name: "orders".to_string(),
            tag: "order-service".to_string(),
            routing_key: "orders.created".to_string(),
            ..valid_config()
        };

        assert_eq!(config.normalized(), config);
    }

    #[test]
    fn test_validate_accepts_normalized_config() {
        assert!(valid_config().normalized().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let empty_host = BrokerConfig {
            host: " ".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            empty_host.validate(),
            Err(ConfigError::MissingField("host"))
        ));

        let spaced_host = BrokerConfig {
            host: "rabbit mq".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            spaced_host.validate(),
            Err(ConfigError::InvalidField { field: "host", .. })
        ));

        let zero_port = BrokerConfig {
            port: 0,
            ..valid_config()
        };
        assert!(matches!(zero_port.validate(), Err(ConfigError::InvalidPort)));

        let no_user = BrokerConfig {
            username: String::new(),
            ..valid_config()
        };
        assert!(matches!(
            no_user.validate(),
            Err(ConfigError::MissingField("username"))
        ));

        let long_key = BrokerConfig {
            routing_key: "k".repeat(256),
            ..valid_config()
        };
        assert!(matches!(
            long_key.validate(),
            Err(ConfigError::TooLong {
                field: "routing_key",
                len: 256
            })
        ));
    }

    #[test]
    fn test_config_from_json_uses_field_defaults() {
        let config: BrokerConfig =
            serde_json::from_str(r#"{ "host": "rabbit", "username": "svc" }"#).unwrap();

        assert_eq!(config.host, "rabbit");
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.exchange_name.is_empty());
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = BrokerConfig::from_file(Path::new("does/not/exist/broker.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_debug_hides_password() {
        let config = BrokerConfig {
            password: "hunter2".to_string(),
            ..valid_config()
        };
        let printed = format!("{:?}", config);

        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_default_port_matches_other_sources() {
        assert_eq!(BrokerConfig::default().port, DEFAULT_PORT);

        let config = BrokerConfig {
            host: "localhost".to_string(),
            username: "guest".to_string(),
            ..BrokerConfig::default()
        };
        assert!(config.normalized().validate().is_ok());
    }

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("broker-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_from_file_loads_written_config() {
        let dir = scratch_dir();
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{
                "host": "rabbit.internal",
                "port": 5673,
                "username": "svc",
                "password": "secret",
                "vhost": "events",
                "exchange_name": "orders",
                "routing_key": "orders.created"
            }"#,
        )
        .unwrap();

        let config = BrokerConfig::from_file(&path).unwrap();

        assert_eq!(config.host, "rabbit.internal");
        assert_eq!(config.port, 5673);
        assert_eq!(config.username, "svc");
        assert_eq!(config.password, "secret");
        assert_eq!(config.vhost, "events");
        assert_eq!(config.exchange_name, "orders");
        assert_eq!(config.routing_key, "orders.created");
        assert!(config.tag.is_empty());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_from_file_rejects_invalid_json() {
        let dir = scratch_dir();
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{ "host": "rabbit", "port": "amqp" }"#).unwrap();

        let err = BrokerConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_find_config_file_search_order() {
        let base = scratch_dir();
        let home = scratch_dir();

        assert!(matches!(
            find_config_file_in(&base, Some(home.clone())),
            Err(ConfigError::NotFound)
        ));

        let home_config = home.join(".broker.json");
        fs::write(&home_config, "{}").unwrap();
        assert_eq!(find_config_file_in(&base, Some(home.clone())).unwrap(), home_config);

        let nested = base.join("config").join(CONFIG_FILE_NAME);
        fs::create_dir_all(base.join("config")).unwrap();
        fs::write(&nested, "{}").unwrap();
        assert_eq!(find_config_file_in(&base, Some(home.clone())).unwrap(), nested);

        let top = base.join(CONFIG_FILE_NAME);
        fs::write(&top, "{}").unwrap();
        assert_eq!(find_config_file_in(&base, Some(home.clone())).unwrap(), top);

        fs::remove_dir_all(base).unwrap();
        fs::remove_dir_all(home).unwrap();
    }
}
