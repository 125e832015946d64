use serde::{Deserialize, Serialize};

pub mod buffer;
pub mod config;
pub mod message;

pub use buffer::{MessageBuffer, Statistics};
pub use config::{BrokerConfig, DisplayConfig, MonitorConfig};
pub use message::{MessageRecord, Payload};

/// Exchange every intercepted message is tapped from.
pub const MONITOR_EXCHANGE: &str = "amq.topic";
/// Topic pattern matching every routing key.
pub const MONITOR_PATTERN: &str = "#";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub vhost: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub peer_host: Option<String>,
    #[serde(default)]
    pub peer_port: Option<u16>,
    #[serde(default)]
    pub state: Option<String>,
}

impl ConnectionInfo {
    pub fn is_running(&self) -> bool {
        self.state.as_deref() == Some("running")
    }

    pub fn peer(&self) -> String {
        format!(
            "{}:{}",
            self.peer_host.as_deref().unwrap_or("?"),
            self.peer_port.map(|p| p.to_string()).unwrap_or_else(|| "?".into())
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub name: String,
    #[serde(default)]
    pub vhost: String,
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub consumers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VHostInfo {
    pub name: String,
}

/// Subset of `/api/overview` used for the startup connectivity check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Overview {
    #[serde(default)]
    pub rabbitmq_version: Option<String>,
    #[serde(default)]
    pub management_version: Option<String>,
    #[serde(default)]
    pub cluster_name: Option<String>,
}

/// Last known broker topology. Each list is replaced wholesale, never merged.
#[derive(Debug, Clone, Default)]
pub struct TopologySnapshot {
    pub connections: Vec<ConnectionInfo>,
    pub queues: Vec<QueueInfo>,
    pub vhosts: Vec<VHostInfo>,
}

impl TopologySnapshot {
    pub fn queue_count(&self, vhost: &str) -> usize {
        self.queues.iter().filter(|q| q.vhost == vhost).count()
    }
}
