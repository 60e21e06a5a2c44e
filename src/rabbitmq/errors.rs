// src/rabbitmq/errors.rs

use lapin::Error as LapinError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum BrokerError {
    /// Publish was called before a successful connect.
    #[error("MessageBus not initialized")]
    NotInitialized,

    /// Close was called without an open producer.
    #[error("Broker is not open, you cannot close it")]
    NotOpen,

    #[error("Broker is already connected, close it before connecting again")]
    AlreadyConnected,

    #[error("Invalid broker configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read message input: {0}")]
    Input(#[from] std::io::Error),

    /// Errors from the AMQP client, passed through unchanged.
    #[error(transparent)]
    Client(#[from] LapinError),
}

// Custom Result type for broker operations
pub type Result<T> = std::result::Result<T, BrokerError>;
