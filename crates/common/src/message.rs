use base64::Engine;
use chrono::{DateTime, Local};

/// Decoded body of an intercepted message.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
    /// Standard base64 of bodies that were not valid UTF-8 or not valid JSON.
    Base64(String),
}

impl Payload {
    /// Never fails: anything that cannot be shown as text or JSON is kept as base64.
    pub fn decode(body: &[u8]) -> Self {
        let Ok(text) = std::str::from_utf8(body) else {
            return Self::binary(body);
        };
        let trimmed = text.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            match serde_json::from_str(text) {
                Ok(value) => Self::Json(value),
                Err(_) => Self::binary(body),
            }
        } else {
            Self::Text(text.to_string())
        }
    }

    fn binary(body: &[u8]) -> Self {
        Self::Base64(base64::engine::general_purpose::STANDARD.encode(body))
    }

    /// Raw bytes for a base64 payload.
    pub fn decoded_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Base64(b64) => base64::engine::general_purpose::STANDARD.decode(b64).ok(),
            _ => None,
        }
    }

    /// Single-line rendering for table cells.
    pub fn preview(&self) -> String {
        match self {
            Self::Json(v) => v.to_string(),
            Self::Text(t) => t.replace(['\n', '\r'], " "),
            Self::Base64(b) => format!("base64:{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub received_at: DateTime<Local>,
    pub vhost: String,
    pub exchange: String,
    pub routing_key: String,
    pub size_bytes: u64,
    pub payload: Payload,
}

impl MessageRecord {
    pub fn from_delivery(vhost: &str, exchange: &str, routing_key: &str, body: &[u8]) -> Self {
        Self {
            received_at: Local::now(),
            vhost: vhost.to_string(),
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            size_bytes: body.len() as u64,
            payload: Payload::decode(body),
        }
    }

    /// Exchange name as shown to the operator; the nameless default exchange gets its AMQP alias.
    pub fn exchange_label(&self) -> &str {
        if self.exchange.is_empty() {
            "amq.default"
        } else {
            &self.exchange
        }
    }
}
