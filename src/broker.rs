use tracing::{debug, info, warn};

use crate::config::BrokerConfig;
use crate::message::Publishing;
use crate::rabbitmq::{
    AmqpClient, BrokerError, Exchange, Producer, PublishingOptions, Queue, RabbitMq, Result,
};

/// Publisher facade over an [`AmqpClient`].
///
/// Starts unconnected. [`connect`](Broker::connect) installs a producer, [`close`](Broker::close)
/// shuts it down and drops it again. [`publish`](Broker::publish) only works in between.
pub struct Broker<C: AmqpClient = RabbitMq> {
    client: C,
    config: BrokerConfig,
    producer: Option<C::Producer>,
}

impl Broker<RabbitMq> {
    /// Builds a broker backed by lapin. No connection is opened yet.
    pub fn new(config: &BrokerConfig) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;
        let client = RabbitMq::new(&config);
        Ok(Self::from_parts(config, client))
    }
}

impl<C: AmqpClient> Broker<C> {
    /// Builds a broker on top of an existing client. The config is normalized and
    /// validated the same way as in [`Broker::new`].
    pub fn with_client(config: &BrokerConfig, client: C) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;
        Ok(Self::from_parts(config, client))
    }

    fn from_parts(config: BrokerConfig, client: C) -> Self {
        debug!(
            exchange = %config.exchange_name,
            routing_key = %config.routing_key,
            tag = %config.tag,
            "Creating broker"
        );
        Self {
            client,
            config,
            producer: None,
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.producer.is_some()
    }

    pub async fn connect(&mut self) -> Result<()> {
        if self.producer.is_some() {
            return Err(BrokerError::AlreadyConnected);
        }

        let exchange = Exchange::named(self.config.exchange_name.clone());
        let options = PublishingOptions {
            tag: self.config.tag.clone(),
            routing_key: self.config.routing_key.clone(),
            mandatory: false,
            immediate: false,
        };

        let producer = self
            .client
            .new_producer(exchange, Queue::default(), options)
            .await
            .map_err(|e| {
                warn!(exchange = %self.config.exchange_name, "Broker connect failed: {}", e);
                e
            })?;

        self.producer = Some(producer);
        info!(
            exchange = %self.config.exchange_name,
            tag = %self.config.tag,
            "Broker connected"
        );
        Ok(())
    }

    pub async fn publish(&self, message_type: &str, body: impl Into<Vec<u8>>) -> Result<()> {
        let producer = self.producer.as_ref().ok_or(BrokerError::NotInitialized)?;
        producer
            .publish(Publishing::new(message_type, body))
            .await?;
        Ok(())
    }

    /// Shuts the producer down. The handle is dropped even when shutdown fails, so a
    /// later publish reports [`BrokerError::NotInitialized`].
    pub async fn close(&mut self) -> Result<()> {
        let producer = self.producer.take().ok_or(BrokerError::NotOpen)?;
        producer.shutdown().await?;
        info!(tag = %self.config.tag, "Broker closed");
        Ok(())
    }
}
