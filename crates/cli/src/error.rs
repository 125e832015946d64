use std::time::Duration;

use thiserror::Error;

/// Failures of the management API and broker capabilities.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error("unexpected payload from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("broker did not finish {op} within {after:?}")]
    Timeout { op: &'static str, after: Duration },
    #[error("broker: {0}")]
    Broker(String),
}

impl From<lapin::Error> for MonitorError {
    fn from(e: lapin::Error) -> Self {
        Self::Broker(e.to_string())
    }
}
