use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use common::{BrokerConfig, ConnectionInfo, Overview, QueueInfo, VHostInfo};

use crate::error::MonitorError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only view of the broker's management API.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn overview(&self) -> Result<Overview, MonitorError>;
    async fn connections(&self) -> Result<Vec<ConnectionInfo>, MonitorError>;
    async fn queues(&self) -> Result<Vec<QueueInfo>, MonitorError>;
    async fn vhosts(&self) -> Result<Vec<VHostInfo>, MonitorError>;
}

pub struct HttpManagement {
    client: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
}

impl HttpManagement {
    pub fn new(cfg: &BrokerConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.management_base_url(),
            user: cfg.admin_user.clone(),
            password: cfg.admin_password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, MonitorError> {
        let endpoint = format!("{}/{}", self.base_url, path);
        debug!(%endpoint, "management GET");
        let resp = self
            .client
            .get(&endpoint)
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await
            .map_err(|source| MonitorError::Http { endpoint: endpoint.clone(), source })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MonitorError::Status { endpoint, status });
        }
        let body = resp
            .bytes()
            .await
            .map_err(|source| MonitorError::Http { endpoint: endpoint.clone(), source })?;
        serde_json::from_slice(&body).map_err(|source| MonitorError::Decode { endpoint, source })
    }
}

#[async_trait]
impl ManagementApi for HttpManagement {
    async fn overview(&self) -> Result<Overview, MonitorError> {
        self.get_json("overview").await
    }

    async fn connections(&self) -> Result<Vec<ConnectionInfo>, MonitorError> {
        self.get_json("connections").await
    }

    async fn queues(&self) -> Result<Vec<QueueInfo>, MonitorError> {
        self.get_json("queues").await
    }

    async fn vhosts(&self) -> Result<Vec<VHostInfo>, MonitorError> {
        self.get_json("vhosts").await
    }
}
