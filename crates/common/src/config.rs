use std::time::Duration;

use anyhow::Context;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters `encodeURIComponent` leaves untouched.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub broker: BrokerConfig,
    pub display: DisplayConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String,
    pub http_port: u16,
    pub amqp_port: u16,
    pub admin_user: String,
    pub admin_password: String,
    /// Upper bound for connecting to, and closing, the monitored vhost.
    pub connect_timeout_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            http_port: 15672,
            amqp_port: 5672,
            admin_user: "guest".into(),
            admin_password: "guest".into(),
            connect_timeout_ms: 5000,
        }
    }
}

impl std::fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("host", &self.host)
            .field("http_port", &self.http_port)
            .field("amqp_port", &self.amqp_port)
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"<redacted>")
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

impl BrokerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    pub fn management_base_url(&self) -> String {
        format!("http://{}:{}/api", self.host, self.http_port)
    }

    /// AMQP URI scoped to `vhost`; credentials and vhost are escaped as URI components.
    pub fn amqp_uri(&self, vhost: &str) -> String {
        format!(
            "amqp://{}:{}@{}:{}/{}",
            utf8_percent_encode(&self.admin_user, URI_COMPONENT),
            utf8_percent_encode(&self.admin_password, URI_COMPONENT),
            self.host,
            self.amqp_port,
            utf8_percent_encode(vhost, URI_COMPONENT),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_messages: usize,
    pub refresh_interval_ms: u64,
    /// Pause after a session starts before the dashboard resumes.
    pub settle_ms: u64,
    pub show_connections: bool,
    pub show_messages: bool,
    pub show_queues: bool,
    pub show_statistics: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_messages: 50,
            refresh_interval_ms: 2000,
            settle_ms: 1000,
            show_connections: true,
            show_messages: true,
            show_queues: true,
            show_statistics: true,
        }
    }
}

impl DisplayConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl MonitorConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: Self = toml::from_str(s).context("parse monitor config")?;
        cfg.normalize();
        Ok(cfg)
    }

    /// Overlay environment-style keys read through `lookup`.
    ///
    /// Numeric keys that are missing, unparseable or zero keep the current value.
    /// Display toggles are on unless the value is exactly `false`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let number = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|n| *n > 0)
        };
        let toggle = |key: &str, current: bool| match lookup(key) {
            Some(v) => v != "false",
            None => current,
        };

        if let Some(v) = text("RABBITMQ_HOST") {
            self.broker.host = v;
        }
        if let Some(v) = number("RABBITMQ_HTTP_PORT").and_then(|n| u16::try_from(n).ok()) {
            self.broker.http_port = v;
        }
        if let Some(v) = number("RABBITMQ_AMQP_PORT").and_then(|n| u16::try_from(n).ok()) {
            self.broker.amqp_port = v;
        }
        if let Some(v) = text("RABBITMQ_ADMIN_USER") {
            self.broker.admin_user = v;
        }
        if let Some(v) = text("RABBITMQ_ADMIN_PASSWORD") {
            self.broker.admin_password = v;
        }
        if let Some(v) = number("MAX_MESSAGES_DISPLAY") {
            self.display.max_messages = v as usize;
        }
        if let Some(v) = number("REFRESH_INTERVAL") {
            self.display.refresh_interval_ms = v;
        }
        self.display.show_connections = toggle("SHOW_CONNECTIONS", self.display.show_connections);
        self.display.show_messages = toggle("SHOW_MESSAGES", self.display.show_messages);
        self.display.show_queues = toggle("SHOW_QUEUES", self.display.show_queues);
        self.display.show_statistics = toggle("SHOW_STATISTICS", self.display.show_statistics);
        self.normalize();
    }

    pub fn normalize(&mut self) {
        self.display.max_messages = self.display.max_messages.max(1);
        self.display.refresh_interval_ms = self.display.refresh_interval_ms.max(1);
    }
}
