//! Minimal PayPal Checkout client.
//!
//! Two calls: a client-credentials token, then order creation under
//! `/v2/checkout/orders`. The order answer is returned as raw JSON so
//! the REST layer can pass it through to the browser SDK untouched.

use reqwest::Method;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use apikit::TracedClient;

use crate::config::PayPalConfig;
use crate::domain::model::OrderRequest;

#[derive(Debug, Error)]
pub enum PayPalError {
    #[error("token request failed: {0}")]
    Token(String),

    /// The gateway refused the order; carries its response body.
    #[error("{0}")]
    Order(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct PayPalClient {
    http: TracedClient,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl PayPalClient {
    pub fn new(cfg: &PayPalConfig) -> anyhow::Result<Self> {
        let inner = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            http: TracedClient::new(inner),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
        })
    }

    /// Fetch an OAuth token. Without configured credentials a mock
    /// token is returned instead, which stub gateways accept in local
    /// setups.
    async fn access_token(&self) -> Result<String, PayPalError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            debug!("paypal credentials not configured, using mock token");
            return Ok("mock_access_token".to_string());
        }

        let url = format!("{}/v1/oauth2/token", self.base_url);
        let req = self
            .http
            .request(Method::POST, &url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .build()?;
        let resp = self.http.execute(req).await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(PayPalError::Token(body));
        }
        let value: Value = serde_json::from_str(&body)
            .map_err(|_| PayPalError::Token("token response was not JSON".to_string()))?;
        value
            .get("access_token")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| PayPalError::Token("token response carried no access_token".to_string()))
    }

    /// Create a CAPTURE order and return the gateway's JSON answer as
    /// is. Amounts go out with exactly two decimals.
    #[instrument(name = "paypal.create_order", skip(self, order))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<Value, PayPalError> {
        let token = self.access_token().await?;
        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": order.currency,
                    "value": format!("{:.2}", order.amount.round_dp(2)),
                },
                "description": order.description,
            }],
            "application_context": {
                "return_url": order.return_url,
                "cancel_url": order.cancel_url,
            }
        });

        let url = format!("{}/v2/checkout/orders", self.base_url);
        let req = self
            .http
            .request(Method::POST, &url)
            .bearer_auth(token)
            .json(&body)
            .build()?;
        let resp = self.http.execute(req).await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(PayPalError::Order(text));
        }
        serde_json::from_str(&text)
            .map_err(|_| PayPalError::Order("order response was not JSON".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn amounts_always_carry_two_decimals() {
        for (raw, wire) in [("20.5", "20.50"), ("20", "20.00"), ("19.999", "20.00")] {
            let amount: Decimal = raw.parse().unwrap();
            assert_eq!(format!("{:.2}", amount.round_dp(2)), wire);
        }
    }
}
