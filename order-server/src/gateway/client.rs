//! Gateway REST client (no SDK dependency)
//!
//! The gateway exposes an OAuth token endpoint plus checkout, status and
//! refund endpoints. Amounts travel in minor currency units.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
use shared::order::GatewayState;

use super::{CheckoutSession, GatewayError, GatewayResult, PaymentGateway};
use crate::core::config::Config;

pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    client_version: String,
}

impl RestGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.gateway_base_url.trim_end_matches('/').to_string(),
            client_id: config.gateway_client_id.clone(),
            client_secret: config.gateway_client_secret.clone(),
            client_version: config.gateway_client_version.clone(),
        }
    }

    /// Fetch a short-lived access token for the merchant credentials
    async fn authorize(&self) -> GatewayResult<String> {
        let resp: Value = self
            .http
            .post(format!("{}/v1/oauth/token", self.base_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("client_version", self.client_version.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?
            .json()
            .await?;

        resp["access_token"]
            .as_str()
            .map(String::from)
            .ok_or(GatewayError::MalformedResponse("access_token"))
    }

    fn minor_units(amount: Decimal) -> GatewayResult<u64> {
        (amount * Decimal::from(100))
            .round()
            .to_u64()
            .ok_or(GatewayError::MalformedResponse("amount"))
    }

    async fn post_json(&self, path: &str, token: &str, body: Value) -> GatewayResult<Value> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("O-Bearer {token}"))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let body: Value = resp.json().await?;
        if !status.is_success() {
            return Err(GatewayError::Api(format!("{status}: {body}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl PaymentGateway for RestGateway {
    async fn initiate(
        &self,
        merchant_order_id: &str,
        amount: Decimal,
        redirect_url: &str,
    ) -> GatewayResult<CheckoutSession> {
        let token = self.authorize().await?;
        let body = json!({
            "merchantOrderId": merchant_order_id,
            "amount": Self::minor_units(amount)?,
            "paymentFlow": {
                "type": "PG_CHECKOUT",
                "merchantUrls": { "redirectUrl": redirect_url }
            }
        });

        let resp = self.post_json("/checkout/v2/pay", &token, body).await?;
        let gateway_order_id = resp["orderId"]
            .as_str()
            .map(String::from)
            .ok_or(GatewayError::MalformedResponse("orderId"))?;
        let checkout_url = resp["redirectUrl"].as_str().map(String::from);

        Ok(CheckoutSession {
            gateway_order_id,
            checkout_url,
        })
    }

    async fn verify(&self, merchant_order_id: &str) -> GatewayResult<GatewayState> {
        let token = self.authorize().await?;
        let resp = self
            .http
            .get(format!(
                "{}/checkout/v2/order/{}/status",
                self.base_url, merchant_order_id
            ))
            .header("Authorization", format!("O-Bearer {token}"))
            .send()
            .await?;

        let status = resp.status();
        let body: Value = resp.json().await?;
        if !status.is_success() {
            return Err(GatewayError::Api(format!("{status}: {body}")));
        }

        let state = body["state"]
            .as_str()
            .ok_or(GatewayError::MalformedResponse("state"))?;
        Ok(GatewayState::parse(state))
    }

    async fn refund(
        &self,
        merchant_order_id: &str,
        refund_id: &str,
        amount: Decimal,
    ) -> GatewayResult<String> {
        let token = self.authorize().await?;
        let body = json!({
            "merchantRefundId": refund_id,
            "originalMerchantOrderId": merchant_order_id,
            "amount": Self::minor_units(amount)?,
        });

        let resp = self.post_json("/payments/v2/refund", &token, body).await?;
        resp["refundId"]
            .as_str()
            .map(String::from)
            .ok_or(GatewayError::MalformedResponse("refundId"))
    }
}
