// src/rabbitmq/amqp_client.rs

use async_trait::async_trait;
use lapin::{Error as LapinError, ExchangeKind};

use crate::message::Publishing;

/// Exchange to declare before publishing.
#[derive(Clone, Debug)]
pub struct Exchange {
    pub name: String,
    pub kind: ExchangeKind,
    pub durable: bool,
    pub auto_delete: bool,
    pub internal: bool,
}

impl Exchange {
    /// A non-durable direct exchange with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ExchangeKind::Direct,
            durable: false,
            auto_delete: false,
            internal: false,
        }
    }
}

/// Queue to declare and bind to the exchange. An empty name means no queue is set up.
#[derive(Clone, Debug, Default)]
pub struct Queue {
    pub name: String,
    pub durable: bool,
    pub auto_delete: bool,
    pub exclusive: bool,
}

impl Queue {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct PublishingOptions {
    /// Client tag attached to the connection and to every message.
    pub tag: String,
    pub routing_key: String,
    pub mandatory: bool,
    pub immediate: bool,
}

/// The part of an AMQP client the broker relies on.
#[async_trait]
pub trait AmqpClient: Send + Sync {
    type Producer: Producer;

    /// Declares `exchange` (and `queue`, unless empty) and returns a producer bound to it.
    async fn new_producer(
        &self,
        exchange: Exchange,
        queue: Queue,
        options: PublishingOptions,
    ) -> Result<Self::Producer, LapinError>;
}

/// A connected publishing handle.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn publish(&self, message: Publishing) -> Result<(), LapinError>;

    async fn shutdown(&self) -> Result<(), LapinError>;
}
