use crate::config::RazorpayConfig;
use crate::error::{AppError, AppResult};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize)]
pub struct CreateOrderParams {
    /// Smallest currency unit (paise).
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: OrderNotes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    pub donation_id: String,
    pub donor_name: String,
    pub donation_type: String,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Clone)]
pub struct RazorpayService {
    client: Client,
    config: RazorpayConfig,
}

impl RazorpayService {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    pub async fn create_order(&self, params: &CreateOrderParams) -> AppResult<RazorpayOrder> {
        let url = format!("{}/orders", self.config.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(params)
            .send()
            .await?;

        if response.status().is_success() {
            let order: RazorpayOrder = response.json().await?;
            log::info!(
                "Razorpay order {} created for receipt {}",
                order.id,
                params.receipt
            );
            Ok(order)
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Razorpay order creation failed: {status}, Error: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "order creation failed with status {status}"
            )))
        }
    }

    /// Checkout callback signature over `order_id|payment_id`.
    pub fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> bool {
        verify_hmac_sha256(
            &self.config.key_secret,
            format!("{order_id}|{payment_id}").as_bytes(),
            signature,
        )
    }

    /// Webhook signature over the raw request body.
    pub fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool {
        verify_hmac_sha256(&self.config.webhook_secret, body, signature)
    }
}

pub fn sign_hmac_sha256(secret: &str, message: &[u8]) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::InternalError(format!("HMAC key error: {e}")))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison against a hex-encoded HMAC-SHA256.
pub fn verify_hmac_sha256(secret: &str, message: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(&signature).is_ok()
}
