use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions},
    types::FieldTable,
    uri::{AMQPAuthority, AMQPScheme, AMQPUri, AMQPUserInfo},
    Channel, Connection, ConnectionProperties, Error as LapinError,
};
use tracing::{debug, info};

use super::amqp_client::{AmqpClient, Exchange, Producer, PublishingOptions, Queue};
use crate::config::BrokerConfig;
use crate::message::Publishing;

const REPLY_SUCCESS: u16 = 200;

/// lapin-backed [`AmqpClient`]. Holds connection parameters only; every producer
/// gets its own connection and channel.
#[derive(Clone, Debug)]
pub struct RabbitMq {
    uri: AMQPUri,
    connection_name: String,
}

impl RabbitMq {
    pub fn new(config: &BrokerConfig) -> Self {
        Self {
            uri: amqp_uri(config),
            connection_name: config.tag.clone(),
        }
    }

    fn connection_properties(&self) -> ConnectionProperties {
        ConnectionProperties::default().with_connection_name(self.connection_name.clone().into())
    }
}

pub(crate) fn amqp_uri(config: &BrokerConfig) -> AMQPUri {
    let vhost = if config.vhost.is_empty() {
        "/".to_string()
    } else {
        config.vhost.clone()
    };

    AMQPUri {
        scheme: AMQPScheme::AMQP,
        authority: AMQPAuthority {
            userinfo: AMQPUserInfo {
                username: config.username.clone(),
                password: config.password.clone(),
            },
            host: config.host.clone(),
            port: config.port,
        },
        vhost,
        ..AMQPUri::default()
    }
}

#[async_trait]
impl AmqpClient for RabbitMq {
    type Producer = RabbitMqProducer;

    async fn new_producer(
        &self,
        exchange: Exchange,
        queue: Queue,
        options: PublishingOptions,
    ) -> Result<RabbitMqProducer, LapinError> {
        info!(
            host = %self.uri.authority.host,
            port = self.uri.authority.port,
            vhost = %self.uri.vhost,
            tag = %options.tag,
            "Connecting to RabbitMQ"
        );
        let connection = Connection::connect_uri(self.uri.clone(), self.connection_properties()).await?;
        let channel = connection.create_channel().await?;

        channel
            .exchange_declare(
                &exchange.name,
                exchange.kind.clone(),
                ExchangeDeclareOptions {
                    durable: exchange.durable,
                    auto_delete: exchange.auto_delete,
                    internal: exchange.internal,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        debug!(exchange = %exchange.name, "Exchange declared");

        if !queue.is_empty() {
            channel
                .queue_declare(
                    &queue.name,
                    QueueDeclareOptions {
                        durable: queue.durable,
                        auto_delete: queue.auto_delete,
                        exclusive: queue.exclusive,
                        ..QueueDeclareOptions::default()
                    },
                    FieldTable::default(),
                )
                .await?;
            channel
                .queue_bind(
                    &queue.name,
                    &exchange.name,
                    &options.routing_key,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await?;
            debug!(queue = %queue.name, exchange = %exchange.name, "Queue declared and bound");
        }

        Ok(RabbitMqProducer {
            connection,
            channel,
            exchange: exchange.name,
            options,
        })
    }
}

pub struct RabbitMqProducer {
    connection: Connection,
    channel: Channel,
    exchange: String,
    options: PublishingOptions,
}

#[async_trait]
impl Producer for RabbitMqProducer {
    async fn publish(&self, message: Publishing) -> Result<(), LapinError> {
        let properties = message.properties(&self.options.tag);

        // No confirm_select on this channel, so the returned confirmation is not awaited.
        self.channel
            .basic_publish(
                &self.exchange,
                &self.options.routing_key,
                BasicPublishOptions {
                    mandatory: self.options.mandatory,
                    immediate: self.options.immediate,
                },
                &message.body,
                properties,
            )
            .await?;

        debug!(
            exchange = %self.exchange,
            routing_key = %self.options.routing_key,
            kind = %message.kind,
            bytes = message.body.len(),
            "Message published"
        );
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), LapinError> {
        info!(tag = %self.options.tag, "Closing RabbitMQ producer gracefully");
        if self.channel.status().connected() {
            self.channel.close(REPLY_SUCCESS, "Producer shutdown").await?;
        }
        self.connection.close(REPLY_SUCCESS, "Producer shutdown").await
    }
}
