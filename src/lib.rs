//! Publisher-side facade over a RabbitMQ connection.
//!
//! A [`Broker`] owns a [`BrokerConfig`], opens a producer on [`Broker::connect`],
//! publishes typed byte payloads to a single exchange and shuts the producer down on
//! [`Broker::close`].

pub mod broker;
pub mod config;
mod env;
pub mod feed;
pub mod message;
pub mod rabbitmq;
pub mod signal;

pub use broker::Broker;
pub use config::{BrokerConfig, ConfigError};
pub use message::Publishing;
pub use rabbitmq::{BrokerError, Result};
