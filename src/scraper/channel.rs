//! Realtime fallback channel (CrowdMonitor WebSocket)
//!
//! Used only when the page markup carries no guest count. One connection
//! per attempt: connect, subscribe, read until a frame holds the facility's
//! record, close.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, http::HeaderValue, Message},
    MaybeTlsStream, WebSocketStream,
};

use crate::{config::ChannelConfig, error::ChannelError, models::Reading};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Source of live readings used when extraction from markup fails
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LiveSource: Send + Sync {
    /// Read the current count for `uid`, or for the first record when no
    /// facility identifier is known.
    async fn fetch_live(&self, uid: Option<String>) -> Result<Reading, ChannelError>;
}

/// WebSocket client for the realtime endpoint
#[derive(Debug, Clone)]
pub struct ChannelClient {
    ws_url: String,
    user_agent: String,
    subscribe_message: String,
    timeout: Duration,
    max_messages: u32,
}

impl ChannelClient {
    pub fn new(config: &ChannelConfig, user_agent: &str) -> Self {
        Self {
            ws_url: config.ws_url.clone(),
            user_agent: user_agent.to_string(),
            subscribe_message: config.subscribe_message.clone(),
            timeout: config.timeout(),
            max_messages: config.max_messages.max(1),
        }
    }

    async fn connect(&self) -> Result<WsStream, ChannelError> {
        let mut request = self
            .ws_url
            .as_str()
            .into_client_request()
            .map_err(|e| ChannelError::ConnectFailed(e.to_string()))?;
        let user_agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|e| ChannelError::ConnectFailed(format!("Invalid User-Agent: {}", e)))?;
        request.headers_mut().insert("User-Agent", user_agent);

        let (ws, _) = tokio::time::timeout(self.timeout, connect_async(request))
            .await
            .map_err(|_| ChannelError::Timeout(self.timeout))?
            .map_err(|e| ChannelError::ConnectFailed(e.to_string()))?;
        Ok(ws)
    }

    async fn read_reading(&self, ws: &mut WsStream, uid: Option<&str>) -> Result<Reading, ChannelError> {
        ws.send(Message::text(self.subscribe_message.clone()))
            .await
            .map_err(|e| ChannelError::ConnectFailed(e.to_string()))?;

        // One deadline for the whole read; keepalive frames must not extend it
        let deadline = tokio::time::Instant::now() + self.timeout;
        let mut frames = 0;
        while frames < self.max_messages {
            let next = tokio::time::timeout_at(deadline, ws.next())
                .await
                .map_err(|_| ChannelError::Timeout(self.timeout))?;

            let text = match next {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => {
                    return Err(ChannelError::ConnectFailed(
                        "Connection closed before a message arrived".to_string(),
                    ))
                }
                Some(Ok(Message::Binary(_))) => {
                    frames += 1;
                    tracing::debug!("Skipping binary channel frame {}", frames);
                    continue;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(ChannelError::ConnectFailed(e.to_string())),
            };
            frames += 1;

            if let Some(reading) = parse_message(text.as_str(), uid)? {
                return Ok(reading);
            }
            tracing::debug!("Channel frame {} held no record for {:?}", frames, uid);
        }

        Err(ChannelError::MalformedMessage(format!(
            "No record with currentfill in {} message(s)",
            frames
        )))
    }
}

#[async_trait]
impl LiveSource for ChannelClient {
    async fn fetch_live(&self, uid: Option<String>) -> Result<Reading, ChannelError> {
        tracing::debug!("Connecting to realtime channel {}", self.ws_url);
        let mut ws = self.connect().await?;

        let result = self.read_reading(&mut ws, uid.as_deref()).await;

        if let Err(e) = ws.close(None).await {
            tracing::debug!("Channel close failed: {}", e);
        }
        result
    }
}

/// Parse one channel frame. `Ok(None)` means the frame is valid JSON but
/// carries no usable record.
pub fn parse_message(raw: &str, uid: Option<&str>) -> Result<Option<Reading>, ChannelError> {
    let payload: Value =
        serde_json::from_str(raw).map_err(|e| ChannelError::MalformedMessage(e.to_string()))?;

    let record = match &payload {
        Value::Array(items) => items.iter().find(|item| match uid {
            Some(uid) => item.get("uid").and_then(Value::as_str) == Some(uid),
            None => item.get("currentfill").is_some(),
        }),
        Value::Object(_) => match uid {
            Some(uid) if payload.get("uid").and_then(Value::as_str).is_some_and(|u| u != uid) => None,
            _ => Some(&payload),
        },
        _ => None,
    };

    let Some(record) = record else {
        return Ok(None);
    };

    let Some(current) = record.get("currentfill") else {
        return Ok(None);
    };
    let count = numeric_field(current).ok_or_else(|| {
        ChannelError::MalformedMessage(format!("Unusable currentfill value: {}", current))
    })?;
    let capacity = record.get("maxspace").and_then(numeric_field);

    Ok(Some(Reading { count, capacity }))
}

/// Accepts `17`, `17.0`, `"17"` and `"17.0"`
fn numeric_field(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if number.is_finite() && number >= 0.0 && number <= u32::MAX as f64 {
        Some(number.trunc() as u32)
    } else {
        None
    }
}
