//! A [`PaymentGateway`] backed by Razorpay's Orders API.
//!
//! Only order creation goes over the network. Signatures are checked locally with the shared secrets, see
//! [`crate::helpers::signature`].
use std::time::Duration;

use kpg_common::{MinorUnits, Secret};
use log::*;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::traits::{GatewayError, GatewayOrder, PaymentGateway};

pub const DEFAULT_GATEWAY_URL: &str = "https://api.razorpay.com";
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct RazorpayConfig {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: Secret<String>,
    /// Upper bound for a single request, including connecting.
    pub timeout: Duration,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            key_id: String::default(),
            key_secret: Secret::default(),
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RazorpayGateway {
    client: Client,
    config: RazorpayConfig,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::RequestFailed(format!("Could not build HTTP client. {e}")))?;
        if config.key_id.is_empty() || config.key_secret.is_empty() {
            warn!("💳️ Gateway credentials are incomplete. Order creation requests will be rejected.");
        }
        Ok(Self { client, config })
    }

    fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.config.base_url.trim_end_matches('/'))
    }
}

impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount: MinorUnits,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let body = json!({
            "amount": amount.value(),
            "currency": currency,
            "receipt": receipt,
            "payment_capture": 1,
        });
        debug!("💳️ Creating gateway order for {amount} {currency} ({receipt})");
        let response = self
            .client
            .post(self.orders_url())
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("💳️ Gateway order request timed out after {:?}", self.config.timeout);
                    GatewayError::Timeout
                } else {
                    warn!("💳️ Gateway order request failed. {e}");
                    GatewayError::RequestFailed(e.to_string())
                }
            })?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|r| format!("{}: {}", r.error.code, r.error.description))
                .unwrap_or(text);
            warn!("💳️ Gateway rejected order creation with status {status}. {message}");
            return Err(GatewayError::Rejected { status: status.as_u16(), message });
        }
        let order = response.json::<GatewayOrder>().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::InvalidResponse(e.to_string())
            }
        })?;
        info!("💳️ Gateway order {} created for {amount} {currency}", order.id);
        Ok(order)
    }
}
