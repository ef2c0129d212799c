// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP delivery backend.
//!
//! Posts each message as JSON to the configured endpoint. Any transport
//! error or non-success status counts as one failed attempt; the error
//! text carried back is what listeners and the error log will see.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use courier_config::model::EndpointConfig;
use courier_core::{CourierError, Dispatcher, QueuedMessage};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wire payload for one delivery. Internal bookkeeping fields
/// (status, retry count, lock) stay out of the request body.
#[derive(Debug, Serialize)]
struct OutboundPayload<'a> {
    id: &'a str,
    content: &'a str,
    conversation_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    assistant_id: Option<&'a str>,
    timestamp: DateTime<Utc>,
}

impl<'a> OutboundPayload<'a> {
    fn from_message(message: &'a QueuedMessage) -> Self {
        Self {
            id: &message.id,
            content: &message.content,
            conversation_id: &message.conversation_id,
            assistant_id: message.assistant_id.as_deref(),
            timestamp: message.timestamp,
        }
    }
}

/// Error shape some endpoints return; its `error` field is preferred
/// over a generic status line when present.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug)]
pub struct HttpDispatcher {
    client: reqwest::Client,
    url: String,
}

impl HttpDispatcher {
    /// Builds a dispatcher from endpoint configuration. Fails when no
    /// URL is configured or the bearer token is not a valid header value.
    pub fn from_config(endpoint: &EndpointConfig) -> Result<Self, CourierError> {
        let url = endpoint.url.clone().ok_or_else(|| {
            CourierError::Config(
                "endpoint.url is not set; add it to courier.toml or set COURIER_ENDPOINT_URL"
                    .to_string(),
            )
        })?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &endpoint.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                CourierError::Config(
                    "endpoint.bearer_token is not a valid header value".to_string(),
                )
            })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|err| CourierError::Internal(format!("failed to create HTTP client: {err}")))?;

        Ok(Self { client, url })
    }

    #[cfg(test)]
    fn with_base_url(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn send(&self, message: &QueuedMessage) -> Result<(), CourierError> {
        let payload = OutboundPayload::from_message(message);
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| CourierError::Dispatch {
                message: format!("request failed: {err}"),
                source: Some(Box::new(err)),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(id = %message.id, status = %status, "endpoint accepted message");
            return Ok(());
        }

        // Prefer the endpoint's own error text when it sends one.
        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.error)
            .unwrap_or_else(|| format!("endpoint returned status {status}"));
        Err(CourierError::dispatch(reason))
    }
}
