//! In-memory stand-ins for the management API and the broker.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use common::{ConnectionInfo, Overview, QueueInfo, VHostInfo};

use crate::broker::{BrokerConnector, BrokerLink};
use crate::error::MonitorError;
use crate::management::ManagementApi;
use crate::session::DeliverySink;

#[derive(Default)]
struct BrokerLog {
    calls: Vec<String>,
    failing: HashSet<&'static str>,
    hanging: HashSet<&'static str>,
    sink: Option<DeliverySink>,
    queues: usize,
}

/// Records every broker operation as a string like `"bind amq.gen-1 amq.topic #"`.
#[derive(Clone, Default)]
pub struct FakeBroker {
    log: Arc<Mutex<BrokerLog>>,
}

impl FakeBroker {
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.log.lock().unwrap().calls.clear();
    }

    /// Make the named operation (`connect`, `declare`, `bind`, ...) fail from now on.
    pub fn fail_on(&self, op: &'static str) {
        self.log.lock().unwrap().failing.insert(op);
    }

    /// Make the named operation never complete, like a broker that stopped answering.
    pub fn hang_on(&self, op: &'static str) {
        self.log.lock().unwrap().hanging.insert(op);
    }

    async fn stall_if_hanging(&self, op: &'static str) {
        let hangs = self.log.lock().unwrap().hanging.contains(op);
        if hangs {
            std::future::pending::<()>().await;
        }
    }

    /// Sink of the most recent `consume` call.
    pub fn sink(&self) -> Option<DeliverySink> {
        self.log.lock().unwrap().sink.clone()
    }

    fn record(&self, op: &'static str, call: String) -> Result<(), MonitorError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push(call);
        if log.failing.contains(op) {
            return Err(MonitorError::Broker(format!("{op} refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl BrokerConnector for FakeBroker {
    async fn connect(&self, vhost: &str) -> Result<Box<dyn BrokerLink>, MonitorError> {
        self.stall_if_hanging("connect").await;
        self.record("connect", format!("connect {vhost}"))?;
        Ok(Box::new(FakeLink {
            broker: self.clone(),
            vhost: vhost.to_string(),
        }))
    }
}

struct FakeLink {
    broker: FakeBroker,
    vhost: String,
}

#[async_trait]
impl BrokerLink for FakeLink {
    async fn declare_monitor_queue(&mut self) -> Result<String, MonitorError> {
        self.broker.record("declare", "declare".into())?;
        let mut log = self.broker.log.lock().unwrap();
        log.queues += 1;
        Ok(format!("amq.gen-{}", log.queues))
    }

    async fn bind(&mut self, queue: &str, exchange: &str, pattern: &str) -> Result<(), MonitorError> {
        self.broker
            .record("bind", format!("bind {queue} {exchange} {pattern}"))
    }

    async fn consume(&mut self, queue: &str, sink: DeliverySink) -> Result<JoinHandle<()>, MonitorError> {
        self.broker.record("consume", format!("consume {queue}"))?;
        self.broker.log.lock().unwrap().sink = Some(sink);
        Ok(tokio::spawn(std::future::pending::<()>()))
    }

    async fn close_channel(&mut self) -> Result<(), MonitorError> {
        self.broker.stall_if_hanging("close_channel").await;
        self.broker
            .record("close_channel", format!("close_channel {}", self.vhost))
    }

    async fn close_connection(&mut self) -> Result<(), MonitorError> {
        self.broker.stall_if_hanging("close_connection").await;
        self.broker
            .record("close_connection", format!("close_connection {}", self.vhost))
    }
}

/// Serves fixed topology; individual endpoints can be switched to fail.
#[derive(Default)]
pub struct FakeManagement {
    pub connections: Mutex<Vec<ConnectionInfo>>,
    pub queues: Mutex<Vec<QueueInfo>>,
    pub vhosts: Mutex<Vec<VHostInfo>>,
    pub failing: Mutex<HashSet<&'static str>>,
    pub polls: AtomicUsize,
    pub latency: Mutex<Duration>,
}

impl FakeManagement {
    pub fn with_vhosts(names: &[&str]) -> Self {
        let fake = Self::default();
        *fake.vhosts.lock().unwrap() = names
            .iter()
            .map(|n| VHostInfo { name: n.to_string() })
            .collect();
        fake
    }

    pub fn fail(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    /// Delay every `connections` answer, like a request waiting out its timeout.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    fn check(&self, endpoint: &'static str) -> Result<(), MonitorError> {
        if self.failing.lock().unwrap().contains(endpoint) {
            return Err(MonitorError::Status {
                endpoint: format!("http://fake/api/{endpoint}"),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ManagementApi for FakeManagement {
    async fn overview(&self) -> Result<Overview, MonitorError> {
        self.check("overview")?;
        Ok(Overview::default())
    }

    async fn connections(&self) -> Result<Vec<ConnectionInfo>, MonitorError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.check("connections")?;
        Ok(self.connections.lock().unwrap().clone())
    }

    async fn queues(&self) -> Result<Vec<QueueInfo>, MonitorError> {
        self.check("queues")?;
        Ok(self.queues.lock().unwrap().clone())
    }

    async fn vhosts(&self) -> Result<Vec<VHostInfo>, MonitorError> {
        self.check("vhosts")?;
        Ok(self.vhosts.lock().unwrap().clone())
    }
}
