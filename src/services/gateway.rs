use crate::config::GatewaySettings;
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gateway rejected order creation: {status} {body}")]
    Rejected { status: u16, body: String },
    #[error("Gateway configuration error: {0}")]
    Config(String),
}

/// A pending order as acknowledged by the payment gateway.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_id: String,
    pub amount: Decimal,
    pub currency: String,
}

/// Capability for opening payment intents with the external gateway.
/// Injected into the order-creation handler so tests can substitute a fake.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount: Decimal,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError>;

    /// Public key id the client needs to open the checkout widget.
    fn key_id(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

/// Razorpay REST client. Orders are created with amounts in minor units
/// (paise) over basic-auth'd HTTPS.
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    api_base: String,
}

impl RazorpayClient {
    pub fn new(settings: &GatewaySettings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http,
            key_id: settings.key_id.clone(),
            key_secret: settings.key_secret.clone(),
            api_base: settings.api_base.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(
        &self,
        amount: Decimal,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let minor_units = (amount * Decimal::ONE_HUNDRED)
            .trunc()
            .to_i64()
            .ok_or_else(|| GatewayError::Config(format!("amount {amount} out of range")))?;

        let body = CreateOrderBody {
            amount: minor_units,
            currency,
            receipt,
        };

        let response = self
            .http
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("Order creation rejected by gateway: {} {}", status, body);
            return Err(GatewayError::Rejected { status, body });
        }

        let order: OrderResponse = response.json().await?;
        info!("Gateway order {} opened for {} {}", order.id, amount, currency);

        Ok(GatewayOrder {
            order_id: order.id,
            amount: Decimal::from(order.amount) / Decimal::ONE_HUNDRED,
            currency: order.currency,
        })
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}
