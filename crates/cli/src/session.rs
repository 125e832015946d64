//! Monitoring session lifecycle.
//!
//! At most one vhost is monitored at a time. `start` always runs a full `stop` first, so a
//! previous subscription is torn down before any side effect of the new one begins.
//! Deliveries and subscription loss are reported on an mpsc channel tagged with the id of
//! the session that produced them; the event loop drops anything from a stale session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use common::{MessageBuffer, MessageRecord, MONITOR_EXCHANGE, MONITOR_PATTERN};

use crate::broker::{BrokerConnector, BrokerLink};
use crate::error::MonitorError;

#[derive(Debug)]
pub enum SessionEvent {
    Delivery { session_id: u64, record: MessageRecord },
    Lost { session_id: u64, vhost: String, reason: String },
}

/// Handed to the broker consumer; turns raw deliveries into records for the event loop.
#[derive(Clone)]
pub struct DeliverySink {
    session_id: u64,
    vhost: String,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl DeliverySink {
    /// Returns false once nobody is listening any more.
    pub fn deliver(&self, exchange: &str, routing_key: &str, body: &[u8]) -> bool {
        let record = MessageRecord::from_delivery(&self.vhost, exchange, routing_key, body);
        self.tx
            .send(SessionEvent::Delivery { session_id: self.session_id, record })
            .is_ok()
    }

    pub fn lost(&self, reason: String) {
        let _ = self.tx.send(SessionEvent::Lost {
            session_id: self.session_id,
            vhost: self.vhost.clone(),
            reason,
        });
    }
}

pub struct Subscription {
    id: u64,
    vhost: String,
    link: Box<dyn BrokerLink>,
    consumer: JoinHandle<()>,
}

pub enum SessionState {
    Idle,
    Active(Subscription),
}

pub struct SessionController {
    connector: Arc<dyn BrokerConnector>,
    events: mpsc::UnboundedSender<SessionEvent>,
    state: SessionState,
    next_id: u64,
    /// Bound on subscribing and on closing, so a silent broker cannot stall the caller.
    op_timeout: Duration,
}

impl SessionController {
    pub fn new(
        connector: Arc<dyn BrokerConnector>,
        events: mpsc::UnboundedSender<SessionEvent>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            connector,
            events,
            state: SessionState::Idle,
            next_id: 1,
            op_timeout,
        }
    }

    /// Set iff a live subscription exists.
    pub fn monitored_vhost(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active(sub) => Some(&sub.vhost),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    /// Whether events tagged `session_id` belong to the live subscription.
    pub fn accepts(&self, session_id: u64) -> bool {
        matches!(&self.state, SessionState::Active(sub) if sub.id == session_id)
    }

    pub async fn start(&mut self, vhost: &str, buffer: &mut MessageBuffer) -> Result<(), MonitorError> {
        self.stop(buffer).await;

        let id = self.next_id;
        self.next_id += 1;
        info!(vhost, session = id, "starting monitor session");

        let subscribed = match tokio::time::timeout(self.op_timeout, self.subscribe(id, vhost)).await {
            Ok(res) => res,
            Err(_) => Err(MonitorError::Timeout { op: "subscribe", after: self.op_timeout }),
        };
        match subscribed {
            Ok(sub) => {
                self.state = SessionState::Active(sub);
                buffer.clear();
                info!(vhost, session = id, "monitor session active");
                Ok(())
            }
            Err(e) => {
                warn!(vhost, error = %e, "could not start monitor session");
                Err(e)
            }
        }
    }

    async fn subscribe(&self, id: u64, vhost: &str) -> Result<Subscription, MonitorError> {
        let mut link = self.connector.connect(vhost).await?;
        let sink = DeliverySink {
            session_id: id,
            vhost: vhost.to_string(),
            tx: self.events.clone(),
        };
        match Self::tap(link.as_mut(), sink).await {
            Ok(consumer) => Ok(Subscription {
                id,
                vhost: vhost.to_string(),
                link,
                consumer,
            }),
            Err(e) => {
                close_quietly(link.as_mut()).await;
                Err(e)
            }
        }
    }

    async fn tap(link: &mut dyn BrokerLink, sink: DeliverySink) -> Result<JoinHandle<()>, MonitorError> {
        let queue = link.declare_monitor_queue().await?;
        link.bind(&queue, MONITOR_EXCHANGE, MONITOR_PATTERN).await?;
        debug!(%queue, exchange = MONITOR_EXCHANGE, "monitor queue bound");
        link.consume(&queue, sink).await
    }

    /// Idempotent. Close errors are swallowed; the remote side may already be gone.
    pub async fn stop(&mut self, buffer: &mut MessageBuffer) {
        if let SessionState::Active(mut sub) = std::mem::replace(&mut self.state, SessionState::Idle) {
            sub.consumer.abort();
            if tokio::time::timeout(self.op_timeout, close_quietly(sub.link.as_mut()))
                .await
                .is_err()
            {
                warn!(vhost = %sub.vhost, "broker did not answer close; connection abandoned");
            }
            info!(vhost = %sub.vhost, session = sub.id, "monitor session stopped");
        }
        buffer.clear();
    }

    /// Tear down after the broker dropped the subscription. Returns false for stale ids.
    pub async fn handle_lost(&mut self, session_id: u64, reason: &str, buffer: &mut MessageBuffer) -> bool {
        if !self.accepts(session_id) {
            debug!(session = session_id, reason, "ignoring loss of stale session");
            return false;
        }
        warn!(vhost = ?self.monitored_vhost(), reason, "monitor subscription lost");
        self.stop(buffer).await;
        true
    }
}

async fn close_quietly(link: &mut dyn BrokerLink) {
    if let Err(e) = link.close_channel().await {
        debug!(error = %e, "channel close failed");
    }
    if let Err(e) = link.close_connection().await {
        debug!(error = %e, "connection close failed");
    }
}
