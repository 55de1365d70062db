//! Subscription relay: hands a push subscription descriptor to the backend.
//!
//! One `POST` of the descriptor JSON to the subscribe endpoint. A non-2xx
//! status is a failure; the platform subscription is left as it is either way.

use async_trait::async_trait;
use reqwest::{Client, header};

use crate::fetch::{FetchConfig, build_http};
use aquajal_core::http::resolve;
use aquajal_core::{AppConfig, Error, PushSubscription, Relay, RelayAck};

/// Relay posting descriptors to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct SubscriptionRelay {
    http: Client,
    endpoint: url::Url,
}

impl SubscriptionRelay {
    /// Create a relay posting to `endpoint`.
    pub fn new(endpoint: url::Url, config: &FetchConfig) -> Result<Self, Error> {
        let http = build_http(config)?;
        Ok(Self { http, endpoint })
    }

    /// Create a relay for `subscribe_path` on the configured origin.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = url::Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let endpoint = resolve(&origin, &config.subscribe_path).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Self::new(endpoint, &FetchConfig::from(config))
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

#[async_trait]
impl Relay for SubscriptionRelay {
    async fn relay(&self, subscription: &PushSubscription) -> Result<Option<RelayAck>, Error> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(subscription)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(endpoint = %self.endpoint, "error sending subscription to backend: {e}");
                Error::RelayFailed(format!("network error: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "failed to send subscription to backend, server responded with an error"
            );
            return Err(Error::HttpStatus { status: status.as_u16(), url: self.endpoint.to_string() });
        }

        let body = response.bytes().await.unwrap_or_default();
        let ack = serde_json::from_slice::<RelayAck>(&body).ok();

        tracing::info!(
            status = status.as_u16(),
            message = ack.as_ref().and_then(|a| a.message.as_deref()).unwrap_or(""),
            "successfully sent subscription to backend"
        );

        Ok(ack)
    }
}
