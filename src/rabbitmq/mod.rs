// src/rabbitmq/mod.rs
// RabbitMQ client contract and its lapin implementation

pub mod amqp_client;
pub mod connection;
pub mod errors;

pub use amqp_client::{AmqpClient, Exchange, Producer, PublishingOptions, Queue};
pub use connection::{RabbitMq, RabbitMqProducer};
pub use errors::{BrokerError, Result};
