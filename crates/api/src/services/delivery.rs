//! Delivery channel implementations for SOS dispatch.
//!
//! The dispatcher in `domain::services::dispatch` is channel-agnostic;
//! these are the production implementations behind its `DeliveryChannel`
//! trait.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use domain::services::dispatch::{DeliveryChannel, DeliveryError};

/// Channel that logs messages instead of sending them. Development
/// default.
#[derive(Debug, Clone, Default)]
pub struct ConsoleDeliveryChannel;

#[async_trait]
impl DeliveryChannel for ConsoleDeliveryChannel {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<(), DeliveryError> {
        info!(to = %phone, message = %message, "SOS SMS (console channel)");
        Ok(())
    }

    async fn send_email(&self, email: &str, message: &str) -> Result<(), DeliveryError> {
        info!(to = %email, message = %message, "SOS email (console channel)");
        Ok(())
    }
}

/// Outbound message body posted to a gateway endpoint.
#[derive(Debug, Serialize)]
struct GatewayMessage<'a> {
    to: &'a str,
    message: &'a str,
}

/// Channel that posts messages to configured SMS/email webhook gateways.
pub struct GatewayDeliveryChannel {
    client: Client,
    sms_url: String,
    email_url: String,
}

impl GatewayDeliveryChannel {
    /// The HTTP timeout doubles the dispatcher's per-contact timeout so
    /// the dispatcher's bound is the one that fires.
    pub fn new(sms_url: String, email_url: String, per_contact_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(per_contact_timeout * 2)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            sms_url,
            email_url,
        }
    }

    async fn post(&self, url: &str, to: &str, message: &str) -> Result<(), DeliveryError> {
        if url.is_empty() {
            return Err(DeliveryError("no gateway endpoint configured".to_string()));
        }

        let response = self
            .client
            .post(url)
            .json(&GatewayMessage { to, message })
            .send()
            .await
            .map_err(|e| DeliveryError(format!("gateway request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DeliveryError(format!(
                "gateway returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl DeliveryChannel for GatewayDeliveryChannel {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<(), DeliveryError> {
        self.post(&self.sms_url, phone, message).await
    }

    async fn send_email(&self, email: &str, message: &str) -> Result<(), DeliveryError> {
        self.post(&self.email_url, email, message).await
    }
}
