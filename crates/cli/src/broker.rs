use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    options::{BasicAckOptions, BasicConsumeOptions, QueueBindOptions, QueueDeclareOptions},
    types::FieldTable,
    Channel, Connection, ConnectionProperties,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use common::BrokerConfig;

use crate::error::MonitorError;
use crate::session::DeliverySink;

const CONSUMER_TAG: &str = "rabbit-monitor";
const REPLY_SUCCESS: u16 = 200;

/// Opens broker connections scoped to a single vhost.
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    /// Connect to `vhost` and open one channel on it.
    async fn connect(&self, vhost: &str) -> Result<Box<dyn BrokerLink>, MonitorError>;
}

/// An open connection plus channel on one vhost.
#[async_trait]
pub trait BrokerLink: Send {
    /// Declare a server-named, exclusive, auto-delete queue and return its name.
    async fn declare_monitor_queue(&mut self) -> Result<String, MonitorError>;
    async fn bind(&mut self, queue: &str, exchange: &str, pattern: &str) -> Result<(), MonitorError>;
    /// Start consuming with manual acks. Each delivery is handed to `sink` and then acked;
    /// the end of the stream is reported through `sink.lost`.
    async fn consume(&mut self, queue: &str, sink: DeliverySink) -> Result<JoinHandle<()>, MonitorError>;
    async fn close_channel(&mut self) -> Result<(), MonitorError>;
    async fn close_connection(&mut self) -> Result<(), MonitorError>;
}

pub struct AmqpConnector {
    cfg: BrokerConfig,
}

impl AmqpConnector {
    pub fn new(cfg: BrokerConfig) -> Self {
        Self { cfg }
    }
}

#[async_trait]
impl BrokerConnector for AmqpConnector {
    async fn connect(&self, vhost: &str) -> Result<Box<dyn BrokerLink>, MonitorError> {
        let uri = self.cfg.amqp_uri(vhost);
        let connection = Connection::connect(&uri, ConnectionProperties::default()).await?;
        let channel = match connection.create_channel().await {
            Ok(ch) => ch,
            Err(e) => {
                let _ = connection.close(REPLY_SUCCESS, "channel failed").await;
                return Err(e.into());
            }
        };
        info!(vhost, host = %self.cfg.host, port = self.cfg.amqp_port, "amqp connected");
        Ok(Box::new(AmqpLink { connection, channel }))
    }
}

struct AmqpLink {
    connection: Connection,
    channel: Channel,
}

#[async_trait]
impl BrokerLink for AmqpLink {
    async fn declare_monitor_queue(&mut self) -> Result<String, MonitorError> {
        let opts = QueueDeclareOptions {
            exclusive: true,
            auto_delete: true,
            ..QueueDeclareOptions::default()
        };
        let queue = self
            .channel
            .queue_declare("", opts, FieldTable::default())
            .await?;
        Ok(queue.name().as_str().to_string())
    }

    async fn bind(&mut self, queue: &str, exchange: &str, pattern: &str) -> Result<(), MonitorError> {
        self.channel
            .queue_bind(queue, exchange, pattern, QueueBindOptions::default(), FieldTable::default())
            .await?;
        Ok(())
    }

    async fn consume(&mut self, queue: &str, sink: DeliverySink) -> Result<JoinHandle<()>, MonitorError> {
        let mut consumer = self
            .channel
            .basic_consume(queue, CONSUMER_TAG, BasicConsumeOptions::default(), FieldTable::default())
            .await?;
        Ok(tokio::spawn(async move {
            while let Some(item) = consumer.next().await {
                match item {
                    Ok(delivery) => {
                        let accepted = sink.deliver(
                            delivery.exchange.as_str(),
                            delivery.routing_key.as_str(),
                            &delivery.data,
                        );
                        if !accepted {
                            debug!("delivery sink closed; consumer exiting");
                            return;
                        }
                        if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                            sink.lost(format!("ack failed: {e}"));
                            return;
                        }
                    }
                    Err(e) => {
                        sink.lost(e.to_string());
                        return;
                    }
                }
            }
            sink.lost("consumer stream ended".into());
        }))
    }

    async fn close_channel(&mut self) -> Result<(), MonitorError> {
        self.channel.close(REPLY_SUCCESS, "monitor stopped").await?;
        Ok(())
    }

    async fn close_connection(&mut self) -> Result<(), MonitorError> {
        self.connection.close(REPLY_SUCCESS, "monitor stopped").await?;
        Ok(())
    }
}
